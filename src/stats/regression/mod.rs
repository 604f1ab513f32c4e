// Pairwise statistics along an axis: correlation, covariance and simple regression

use ndarray::{Array, ArrayBase, ArrayView1, Axis, Data, Dimension, RemoveAxis, Zip};
use num_traits::Float;

use crate::error::{Error, Result};
use crate::stats::descriptive::{count_as, lane_nanmean, lane_nanvar};
use crate::stats::LinearFit;

fn check_same_shape<D: Dimension>(op: &str, x: &D, y: &D) -> Result<()> {
    if x != y {
        return Err(Error::InvalidInput(format!(
            "{} requires x and y of the same shape, got {:?} and {:?}",
            op,
            x.slice(),
            y.slice()
        )));
    }
    Ok(())
}

/// Means of x and y over the cells where both are present
fn pairwise_means<F: Float>(x: &ArrayView1<F>, y: &ArrayView1<F>) -> (usize, F, F) {
    let mut n = 0usize;
    let mut sx = F::zero();
    let mut sy = F::zero();
    for (&a, &b) in x.iter().zip(y.iter()) {
        if !a.is_nan() && !b.is_nan() {
            n += 1;
            sx = sx + a;
            sy = sy + b;
        }
    }
    let cnt = count_as::<F>(n);
    (n, sx / cnt, sy / cnt)
}

/// Demeaned cross products (sxy, sxx, syy) over pairwise-complete cells
fn demeaned_products<F: Float>(x: &ArrayView1<F>, y: &ArrayView1<F>, mx: F, my: F) -> (F, F, F) {
    x.iter().zip(y.iter()).fold(
        (F::zero(), F::zero(), F::zero()),
        |(sxy, sxx, syy), (&a, &b)| {
            if a.is_nan() || b.is_nan() {
                (sxy, sxx, syy)
            } else {
                let dx = a - mx;
                let dy = b - my;
                (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
            }
        },
    )
}

pub(crate) fn pearsonr_impl<F, S, S2, D>(
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
    check_same_shape("pearsonr", &x.raw_dim(), &y.raw_dim())?;
    Ok(Zip::from(x.lanes(axis))
        .and(y.lanes(axis))
        .map_collect(|xl, yl| {
            let (n, mx, my) = pairwise_means(&xl, &yl);
            if n == 0 {
                return F::nan();
            }
            let (sxy, sxx, syy) = demeaned_products(&xl, &yl, mx, my);
            let den = (sxx * syy).sqrt();
            if den == F::zero() {
                F::nan()
            } else {
                sxy / den
            }
        }))
}

pub(crate) fn covariance_impl<F, S, S2, D>(
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
    check_same_shape("covariance", &x.raw_dim(), &y.raw_dim())?;
    Ok(Zip::from(x.lanes(axis))
        .and(y.lanes(axis))
        .map_collect(|xl, yl| {
            let (n, mx, my) = pairwise_means(&xl, &yl);
            if n <= ddof {
                return F::nan();
            }
            let (sxy, _, _) = demeaned_products(&xl, &yl, mx, my);
            sxy / count_as(n - ddof)
        }))
}

pub(crate) fn linear_regression_1d_impl<F, S, S2, D>(
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
    check_same_shape("linear_regression_1d", &x.raw_dim(), &y.raw_dim())?;
    let fits = Zip::from(x.lanes(axis))
        .and(y.lanes(axis))
        .map_collect(|xl, yl| {
            let x_bar = lane_nanmean(&xl);
            let y_bar = lane_nanmean(&yl);
            // mean of the demeaned product over cells where both sides exist
            let (sxy, n) = xl.iter().zip(yl.iter()).fold(
                (F::zero(), 0usize),
                |(acc, n), (&a, &b)| {
                    let p = (a - x_bar) * (b - y_bar);
                    if p.is_nan() {
                        (acc, n)
                    } else {
                        (acc + p, n + 1)
                    }
                },
            );
            let e = sxy / count_as(n);
            let x_var = lane_nanvar(&xl, 0);
            let slope = if x_var == F::zero() { F::zero() } else { e / x_var };
            (slope, y_bar - slope * x_bar)
        });
    Ok(LinearFit {
        slope: fits.map(|&(s, _)| s),
        intercept: fits.map(|&(_, i)| i),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pearsonr_rows() {
        let x = array![[1.0, 2.0, 3.0, 4.0, 5.0], [1.0, 2.0, 3.0, 4.0, 5.0]];
        let y = array![[2.0, 4.0, 6.0, 8.0, 10.0], [5.0, 4.0, 3.0, 2.0, 1.0]];
        let r = pearsonr_impl(&x, &y, Axis(1)).unwrap();
        assert!((r[0] - 1.0).abs() < 1e-12);
        assert!((r[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearsonr_constant_is_nan() {
        let x = array![[1.0, 2.0, 3.0]];
        let y = array![[3.0, 3.0, 3.0]];
        assert!(pearsonr_impl(&x, &y, Axis(1)).unwrap()[0].is_nan());
    }

    #[test]
    fn test_covariance_skips_incomplete_pairs() {
        let x = array![[1.0, 2.0, 3.0, f64::NAN, 4.0, 5.0]];
        let y = array![[1.0, 2.0, 3.0, 9.0, 4.0, f64::NAN]];
        let cov = covariance_impl(&x, &y, Axis(1), 1).unwrap();
        // complete pairs are (1,1) (2,2) (3,3) (4,4)
        assert!((cov[0] - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_check() {
        let x = array![[1.0, 2.0]];
        let y = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            covariance_impl(&x, &y, Axis(1), 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_linear_regression_zero_variance() {
        let x = array![[1.0, 2.0, 3.0], [2.0, 2.0, 2.0]];
        let y = array![[3.0, 5.0, 7.0], [1.0, 2.0, 3.0]];
        let fit = linear_regression_1d_impl(&x, &y, Axis(1)).unwrap();
        assert!((fit.slope[0] - 2.0).abs() < 1e-12);
        assert!((fit.intercept[0] - 1.0).abs() < 1e-12);
        assert_eq!(fit.slope[1], 0.0);
        assert!((fit.intercept[1] - 2.0).abs() < 1e-12);
    }
}
