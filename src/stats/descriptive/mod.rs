// NaN-aware axis reductions

use ndarray::{Array, ArrayBase, ArrayView1, Axis, Data, RemoveAxis};
use num_traits::Float;

/// Convert a cell count into the float type
#[inline]
pub(crate) fn count_as<F: Float>(n: usize) -> F {
    F::from(n).unwrap_or_else(F::nan)
}

#[inline]
fn lane_count<F: Float>(lane: &ArrayView1<F>) -> usize {
    lane.iter().filter(|x| !x.is_nan()).count()
}

#[inline]
fn lane_nansum<F: Float>(lane: &ArrayView1<F>) -> F {
    lane.iter()
        .fold(F::zero(), |acc, &x| if x.is_nan() { acc } else { acc + x })
}

/// Mean of the present cells; NaN when the lane has none
#[inline]
pub(crate) fn lane_nanmean<F: Float>(lane: &ArrayView1<F>) -> F {
    lane_nansum(lane) / count_as(lane_count(lane))
}

/// Variance of the present cells divided by `count - ddof`; NaN when that is not positive
#[inline]
pub(crate) fn lane_nanvar<F: Float>(lane: &ArrayView1<F>, ddof: usize) -> F {
    let n = lane_count(lane);
    if n <= ddof {
        return F::nan();
    }
    let mean = lane_nansum(lane) / count_as(n);
    let ss = lane.iter().fold(F::zero(), |acc, &x| {
        if x.is_nan() {
            acc
        } else {
            let d = x - mean;
            acc + d * d
        }
    });
    ss / count_as(n - ddof)
}

pub(crate) fn nansum_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    data.map_axis(axis, |lane| lane_nansum(&lane))
}

pub(crate) fn nanmean_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    data.map_axis(axis, |lane| lane_nanmean(&lane))
}

pub(crate) fn nanvar_impl<F, S, D>(
    data: &ArrayBase<S, D>,
    axis: Axis,
    ddof: usize,
) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    data.map_axis(axis, |lane| lane_nanvar(&lane, ddof))
}

pub(crate) fn nanmax_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    data.map_axis(axis, |lane| {
        lane.iter().fold(F::neg_infinity(), |acc, &x| {
            if !x.is_nan() && x > acc {
                x
            } else {
                acc
            }
        })
    })
}

pub(crate) fn nanmin_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    data.map_axis(axis, |lane| {
        lane.iter().fold(F::infinity(), |acc, &x| {
            if !x.is_nan() && x < acc {
                x
            } else {
                acc
            }
        })
    })
}

pub(crate) fn nanlast_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    data.map_axis(axis, |lane| {
        lane.iter()
            .rposition(|x| !x.is_nan())
            .map(|i| lane[i])
            .unwrap_or_else(F::nan)
    })
}

// NaN-propagating reductions

pub(crate) fn sum_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    data.map_axis(axis, |lane| lane.iter().fold(F::zero(), |acc, &x| acc + x))
}

pub(crate) fn mean_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    let n: F = count_as(data.len_of(axis));
    data.map_axis(axis, |lane| lane.iter().fold(F::zero(), |acc, &x| acc + x) / n)
}

pub(crate) fn std_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis, ddof: usize) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    let len = data.len_of(axis);
    data.map_axis(axis, |lane| {
        if len <= ddof {
            return F::nan();
        }
        let mean = lane.iter().fold(F::zero(), |acc, &x| acc + x) / count_as(len);
        let ss = lane.iter().fold(F::zero(), |acc, &x| {
            let d = x - mean;
            acc + d * d
        });
        (ss / count_as(len - ddof)).sqrt()
    })
}

pub(crate) fn max_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    data.map_axis(axis, |lane| {
        lane.iter().fold(F::neg_infinity(), |acc, &x| {
            if acc.is_nan() || x.is_nan() {
                F::nan()
            } else if x > acc {
                x
            } else {
                acc
            }
        })
    })
}

pub(crate) fn min_impl<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    data.map_axis(axis, |lane| {
        lane.iter().fold(F::infinity(), |acc, &x| {
            if acc.is_nan() || x.is_nan() {
                F::nan()
            } else if x < acc {
                x
            } else {
                acc
            }
        })
    })
}
