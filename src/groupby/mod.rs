//! Parallel group-by over a key vector
//!
//! [`ParallelGroupBy`] moves per-row values into the rectangular grouped layout
//! (`split`), lets callers run batched reductions along the group axis, and moves
//! per-row results back into original row order (`revert`).

pub mod layout;

use ndarray::{Array, Array1, Array2, Array3, ArrayBase, Data, Dimension, Ix1, Ix2, Zip};
use rayon::prelude::*;

use crate::config::GroupByConfig;
use crate::error::{Error, Result};
use crate::na::Element;

pub use layout::{GroupKey, GroupLayout};

/// Grouped view over a fixed key vector
#[derive(Debug, Clone)]
pub struct ParallelGroupBy {
    layout: GroupLayout,
}

fn missing_marker<T: Element>(operation: &'static str) -> Result<T> {
    T::missing().ok_or(Error::TypeUnsupported {
        dtype: T::DTYPE,
        operation,
    })
}

impl ParallelGroupBy {
    /// Group rows by `keys`
    ///
    /// # Examples
    /// ```rust
    /// use ndarray::array;
    /// use panelrs::ParallelGroupBy;
    ///
    /// let groupby = ParallelGroupBy::new(&[2, 1, 2, 1, 1]);
    /// assert_eq!(groupby.shape(), (2, 3));
    ///
    /// let grouped = groupby.split(&array![10.0f64, 20.0, 30.0, 40.0, 50.0]).unwrap();
    /// assert_eq!(grouped.row(0).to_vec(), vec![20.0, 40.0, 50.0]);
    /// assert!(grouped[[1, 2]].is_nan());
    /// ```
    pub fn new<K: GroupKey>(keys: &[K]) -> Self {
        ParallelGroupBy {
            layout: GroupLayout::new(keys),
        }
    }

    pub fn with_config<K: GroupKey>(keys: &[K], config: &GroupByConfig) -> Self {
        ParallelGroupBy {
            layout: GroupLayout::with_config(keys, config),
        }
    }

    pub fn layout(&self) -> &GroupLayout {
        &self.layout
    }

    /// Number of groups
    pub fn groups(&self) -> usize {
        self.layout.groups()
    }

    /// Width of the grouped rectangle
    pub fn width(&self) -> usize {
        self.layout.width()
    }

    /// Number of original rows
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// `(groups, width)`
    pub fn shape(&self) -> (usize, usize) {
        self.layout.shape()
    }

    pub fn padding_mask(&self) -> &Array2<bool> {
        self.layout.padding_mask()
    }

    pub fn boundaries(&self) -> &[usize] {
        self.layout.boundaries()
    }

    fn check_rows(&self, rows: usize) -> Result<()> {
        if rows != self.layout.len() {
            return Err(Error::LengthMismatch {
                expected: self.layout.len(),
                actual: rows,
            });
        }
        Ok(())
    }

    /// Gather per-row `values` into the `[groups × width]` layout.
    ///
    /// Padded cells hold the missing-value marker, so `values` must be of a
    /// floating type.
    pub fn split<T, S>(&self, values: &ArrayBase<S, Ix1>) -> Result<Array2<T>>
    where
        T: Element,
        S: Data<Elem = T>,
    {
        let missing = missing_marker::<T>("split")?;
        self.check_rows(values.len())?;
        let values = values.view();
        Ok(Zip::from(self.layout.index_matrix()).par_map_collect(|cell| match *cell {
            Some(row) => values[row],
            None => missing,
        }))
    }

    /// Gather per-row windows (`[rows × win]`) into `[groups × width × win]`
    pub fn split_windows<T, S>(&self, values: &ArrayBase<S, Ix2>) -> Result<Array3<T>>
    where
        T: Element,
        S: Data<Elem = T>,
    {
        let missing = missing_marker::<T>("split_windows")?;
        self.check_rows(values.nrows())?;
        let index = self.layout.index_matrix();
        let (groups, width) = self.layout.shape();
        Ok(Array3::from_shape_fn(
            (groups, width, values.ncols()),
            |(g, slot, k)| match index[[g, slot]] {
                Some(row) => values[[row, k]],
                None => missing,
            },
        ))
    }

    /// Scatter a `[groups × width]` buffer back into original row order.
    ///
    /// `label` names the buffer's producer in the error raised on a shape
    /// mismatch. When the leading two dimensions match but trailing ones do not,
    /// the error says the producer likely returned several values and one of them
    /// has to be selected first.
    pub fn revert<T, S, D>(&self, buffer: &ArrayBase<S, D>, label: &str) -> Result<Array1<T>>
    where
        T: Copy + Send + Sync,
        S: Data<Elem = T>,
        D: Dimension,
    {
        let (groups, width) = self.layout.shape();
        if buffer.shape() != [groups, width] {
            return Err(Error::ShapeMismatch {
                label: label.to_string(),
                expected: vec![groups, width],
                actual: buffer.shape().to_vec(),
            });
        }
        let buffer = buffer.view().into_dimensionality::<Ix2>()?;
        let reverted: Vec<T> = self
            .layout
            .inverse_index()
            .par_iter()
            .map(|&pos| buffer[[pos / width, pos % width]])
            .collect();
        Ok(Array1::from_vec(reverted))
    }

    /// A grouped buffer holding `value` in every real cell and `missing_fill`
    /// (the missing-value marker by default) in every padded cell
    pub fn create<T: Element>(&self, value: T, missing_fill: Option<T>) -> Result<Array2<T>> {
        let fill = match missing_fill {
            Some(fill) => fill,
            None => missing_marker::<T>("create")?,
        };
        Ok(self
            .layout
            .padding_mask()
            .mapv(|pad| if pad { fill } else { value }))
    }

    /// Split `values`, run `op` on the grouped buffer and revert its result
    ///
    /// # Examples
    /// ```rust
    /// use ndarray::{array, Axis};
    /// use panelrs::{stats, ParallelGroupBy};
    ///
    /// let groupby = ParallelGroupBy::new(&[0, 0, 1, 1]);
    /// let demeaned = groupby
    ///     .transform(&array![1.0, 3.0, 10.0, 20.0], "demean", |g| {
    ///         let mean = stats::nanmean(&g, Axis(1)).insert_axis(Axis(1));
    ///         &g - &mean
    ///     })
    ///     .unwrap();
    /// assert_eq!(demeaned.to_vec(), vec![-1.0, 1.0, -5.0, 5.0]);
    /// ```
    pub fn transform<T, S, D, F>(
        &self,
        values: &ArrayBase<S, Ix1>,
        label: &str,
        op: F,
    ) -> Result<Array1<T>>
    where
        T: Element,
        S: Data<Elem = T>,
        D: Dimension,
        F: FnOnce(Array2<T>) -> Array<T, D>,
    {
        let grouped = self.split(values)?;
        let result = op(grouped);
        self.revert(&result, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Axis};

    fn sample() -> ParallelGroupBy {
        ParallelGroupBy::new(&[3i64, 1, 3, 2, 1, 3])
    }

    #[test]
    fn test_split_pads_with_nan() {
        let groupby = sample();
        let grouped = groupby
            .split(&array![0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap();
        assert_eq!(grouped.shape(), &[3, 3]);
        assert_eq!(grouped[[0, 0]], 1.0);
        assert_eq!(grouped[[0, 1]], 4.0);
        assert!(grouped[[0, 2]].is_nan());
        assert_eq!(grouped.row(2).to_vec(), vec![0.0, 2.0, 5.0]);
    }

    #[test]
    fn test_split_rejects_integers() {
        let groupby = sample();
        let err = groupby.split(&array![0i64, 1, 2, 3, 4, 5]).unwrap_err();
        assert!(matches!(err, Error::TypeUnsupported { .. }));
    }

    #[test]
    fn test_split_length_mismatch() {
        let groupby = sample();
        let err = groupby.split(&array![0.0, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 6,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_revert_round_trip() {
        let groupby = sample();
        let values = array![0.5, -1.0, 2.25, 3.0, f64::NAN, 5.0];
        let reverted = groupby
            .revert(&groupby.split(&values).unwrap(), "values")
            .unwrap();
        assert_eq!(reverted[0], 0.5);
        assert_eq!(reverted[3], 3.0);
        assert!(reverted[4].is_nan());
        assert_eq!(reverted.len(), 6);
    }

    #[test]
    fn test_revert_shape_errors() {
        let groupby = sample();
        let wide = Array2::<f64>::zeros((3, 4));
        let err = groupby.revert(&wide, "wide").unwrap_err();
        assert!(!err.is_multiple_outputs());

        let multi = Array3::<f64>::zeros((3, 3, 2));
        let err = groupby.revert(&multi, "multi").unwrap_err();
        assert!(err.is_multiple_outputs());
        assert!(err.to_string().contains("multi"));
    }

    #[test]
    fn test_create() {
        let groupby = sample();
        let ones = groupby.create(1.0f32, None).unwrap();
        assert_eq!(ones[[2, 2]], 1.0);
        assert!(ones[[1, 1]].is_nan());

        let counts = groupby.create(1i32, Some(0)).unwrap();
        assert_eq!(counts.sum_axis(Axis(1)).to_vec(), vec![2, 1, 3]);

        assert!(matches!(
            groupby.create(1i32, None),
            Err(Error::TypeUnsupported { .. })
        ));
    }

    #[test]
    fn test_split_windows() {
        let groupby = ParallelGroupBy::new(&[1, 0, 1]);
        let values = array![[1.0f64, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let grouped = groupby.split_windows(&values).unwrap();
        assert_eq!(grouped.shape(), &[2, 2, 2]);
        assert_eq!(grouped[[0, 0, 1]], 4.0);
        assert!(grouped[[0, 1, 0]].is_nan());
        assert_eq!(grouped[[1, 1, 0]], 5.0);
    }
}
