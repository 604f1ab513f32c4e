// Reduction library
//
// Stateless reductions along one axis of a rectangular buffer. Cells holding the
// missing-value marker (NaN) are treated as absent, not as zero, by every `nan*`
// function and by the pairwise statistics. The plain `sum`/`mean`/`std`/`max`/`min`
// reductions propagate NaN and back the non-NaN-aware rolling statistics.

pub mod descriptive;
pub mod regression;

use ndarray::{Array, ArrayBase, Axis, Data, Dimension, RemoveAxis};
use num_traits::Float;

use crate::error::Result;

/// Per-lane slope and intercept of a simple linear regression of y on x
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit<F, D: Dimension> {
    /// Slope, forced to 0 where x has zero variance
    pub slope: Array<F, D>,
    /// Intercept computed from the (possibly forced) slope
    pub intercept: Array<F, D>,
}

/// Sum along `axis`, skipping missing cells
///
/// # Examples
/// ```rust
/// use ndarray::{array, Axis};
/// use panelrs::stats;
///
/// let data = array![[1.0, f64::NAN, 3.0], [f64::NAN, f64::NAN, f64::NAN]];
/// let sums = stats::nansum(&data, Axis(1));
/// assert_eq!(sums.to_vec(), vec![4.0, 0.0]);
/// ```
pub fn nansum<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::nansum_impl(data, axis)
}

/// Mean along `axis` over the present cells; NaN for a fully missing lane
///
/// # Examples
/// ```rust
/// use ndarray::{array, Axis};
/// use panelrs::stats;
///
/// let data = array![[1.0, f64::NAN, 3.0], [f64::NAN, f64::NAN, f64::NAN]];
/// let means = stats::nanmean(&data, Axis(1));
/// assert_eq!(means[0], 2.0);
/// assert!(means[1].is_nan());
/// ```
pub fn nanmean<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::nanmean_impl(data, axis)
}

/// Variance along `axis`, divided by `present_count - ddof`.
///
/// Lanes where `present_count <= ddof` (including fully missing lanes) give NaN.
pub fn nanvar<F, S, D>(data: &ArrayBase<S, D>, axis: Axis, ddof: usize) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::nanvar_impl(data, axis, ddof)
}

/// Square root of [`nanvar`]
pub fn nanstd<F, S, D>(data: &ArrayBase<S, D>, axis: Axis, ddof: usize) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::nanvar_impl(data, axis, ddof).mapv_into(|v| v.sqrt())
}

/// Maximum along `axis` ignoring missing cells; -inf for a fully missing lane
pub fn nanmax<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::nanmax_impl(data, axis)
}

/// Minimum along `axis` ignoring missing cells; +inf for a fully missing lane
pub fn nanmin<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::nanmin_impl(data, axis)
}

/// Rightmost present value along `axis`; NaN for a fully missing lane
///
/// # Examples
/// ```rust
/// use ndarray::{array, Axis};
/// use panelrs::stats;
///
/// let data = array![[1.0, 2.0, f64::NAN], [4.0, f64::NAN, 6.0]];
/// assert_eq!(stats::nanlast(&data, Axis(1)).to_vec(), vec![2.0, 6.0]);
/// ```
pub fn nanlast<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::nanlast_impl(data, axis)
}

/// Sum along `axis`; any missing cell makes the lane NaN
pub fn sum<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::sum_impl(data, axis)
}

/// Sum along `axis` divided by the axis length
pub fn mean<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::mean_impl(data, axis)
}

/// Standard deviation along `axis` with `ddof`; NaN-propagating
pub fn std<F, S, D>(data: &ArrayBase<S, D>, axis: Axis, ddof: usize) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::std_impl(data, axis, ddof)
}

/// Maximum along `axis`; NaN-propagating
pub fn max<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::max_impl(data, axis)
}

/// Minimum along `axis`; NaN-propagating
pub fn min<F, S, D>(data: &ArrayBase<S, D>, axis: Axis) -> Array<F, D::Smaller>
where
    F: Float,
    S: Data<Elem = F>,
    D: RemoveAxis,
{
    descriptive::min_impl(data, axis)
}

/// Pearson correlation of x and y along `axis`
///
/// Only cells where both x and y are present take part. Lanes with zero variance
/// on either side give NaN.
///
/// # Examples
/// ```rust
/// use ndarray::{array, Axis};
/// use panelrs::stats;
///
/// let x = array![[1.0f64, 2.0, 3.0, 4.0, 5.0]];
/// let y = array![[5.0f64, 4.0, 3.0, 2.0, 1.0]];
/// let r = stats::pearsonr(&x, &y, Axis(1)).unwrap();
/// assert!((r[0] + 1.0).abs() < 1e-12);
/// ```
pub fn pearsonr<F, S, S2, D>(
    x: &ArrayBase<S, D>,
    y: &ArrayBase<S2, D>,
    axis: Axis,
) -> Result<Array<F, D::Smaller>>
where
    F: Float,
    S: Data<Elem = F>,
    S2: Data<Elem = F>,
    D: RemoveAxis,
{
    regression::pearsonr_impl(x, y, axis)
}

/// Covariance of x and y along `axis`, divided by `complete_pairs - ddof`
pub fn covariance<F, S, S2, D>(
    x: &ArrayBase<S, D>,
    y: &ArrayBase<S2, D>,
    axis: Axis,
    ddof: usize,
) -> Result<Array<F, D::Smaller>>
where
    F: Float,
    S: Data<Elem = F>,
    S2: Data<Elem = F>,
    D: RemoveAxis,
{
    regression::covariance_impl(x, y, axis, ddof)
}

/// Slope and intercept of y on x along `axis`
///
/// # Examples
/// ```rust
/// use ndarray::{array, Axis};
/// use panelrs::stats;
///
/// let x = array![[1.0f64, 2.0, 3.0]];
/// let y = array![[3.0f64, 5.0, 7.0]];
/// let fit = stats::linear_regression_1d(&x, &y, Axis(1)).unwrap();
/// assert!((fit.slope[0] - 2.0).abs() < 1e-12);
/// assert!((fit.intercept[0] - 1.0).abs() < 1e-12);
/// ```
pub fn linear_regression_1d<F, S, S2, D>(
    x: &ArrayBase<S, D>,
    y: &ArrayBase<S2, D>,
    axis: Axis,
) -> Result<LinearFit<F, D::Smaller>>
where
    F: Float,
    S: Data<Elem = F>,
    S2: Data<Elem = F>,
    D: RemoveAxis,
{
    regression::linear_regression_1d_impl(x, y, axis)
}
