//! Rectangular group layout
//!
//! Rows sharing a key are gathered into one row of a `[groups × width]` index
//! matrix, in their original relative order. Short groups are padded on the
//! right with `None`.

use std::cmp::Ordering;

use ndarray::Array2;
use rayon::prelude::*;

use crate::config::GroupByConfig;

/// A key that rows can be grouped by
pub trait GroupKey: Copy + Send + Sync {
    /// Total order used to sort keys; `Equal` means "same group"
    fn key_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! impl_int_key {
    ($($t:ty),*) => {
        $(
            impl GroupKey for $t {
                #[inline]
                fn key_cmp(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }
            }
        )*
    };
}

macro_rules! impl_float_key {
    ($($t:ty),*) => {
        $(
            impl GroupKey for $t {
                // NaN keys form one trailing group; -0.0 and 0.0 share a group
                #[inline]
                fn key_cmp(&self, other: &Self) -> Ordering {
                    match (self.is_nan(), other.is_nan()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Greater,
                        (false, true) => Ordering::Less,
                        (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
                    }
                }
            }
        )*
    };
}

impl_int_key!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_float_key!(f32, f64);

/// Immutable grouping of N rows into a padded rectangle
#[derive(Debug, Clone)]
pub struct GroupLayout {
    n: usize,
    groups: usize,
    width: usize,
    /// Run boundaries in sorted order: `[0, b1, ..., n]`
    boundaries: Vec<usize>,
    index_matrix: Array2<Option<usize>>,
    padding_mask: Array2<bool>,
    inverse_index: Vec<usize>,
}

impl GroupLayout {
    /// Build the layout with the default configuration
    pub fn new<K: GroupKey>(keys: &[K]) -> Self {
        Self::with_config(keys, &GroupByConfig::default())
    }

    /// Build the layout from a key vector
    ///
    /// Rows are ordered by `(key, original index)` with a stable sort, so equal
    /// keys keep their original relative order.
    pub fn with_config<K: GroupKey>(keys: &[K], config: &GroupByConfig) -> Self {
        let n = keys.len();

        let mut sorted_indices: Vec<usize> = (0..n).collect();
        let by_key = |a: &usize, b: &usize| keys[*a].key_cmp(&keys[*b]);
        if n >= config.parallel_sort_threshold {
            sorted_indices.par_sort_by(by_key);
        } else {
            sorted_indices.sort_by(by_key);
        }

        let mut boundaries = Vec::with_capacity(n.min(1024) + 2);
        boundaries.push(0);
        for i in 1..n {
            let prev = &keys[sorted_indices[i - 1]];
            if keys[sorted_indices[i]].key_cmp(prev) != Ordering::Equal {
                boundaries.push(i);
            }
        }
        boundaries.push(n);

        let groups = boundaries.len() - 1;
        let width = boundaries
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0);

        let mut index_matrix = Array2::<Option<usize>>::from_elem((groups, width), None);
        let mut inverse_index = vec![0usize; n];
        for (g, run) in boundaries.windows(2).enumerate() {
            for (slot, &row) in sorted_indices[run[0]..run[1]].iter().enumerate() {
                index_matrix[[g, slot]] = Some(row);
                inverse_index[row] = g * width + slot;
            }
        }
        let padding_mask = index_matrix.mapv(|cell| cell.is_none());

        log::debug!(
            "built group layout: rows={}, groups={}, width={}",
            n,
            groups,
            width
        );

        GroupLayout {
            n,
            groups,
            width,
            boundaries,
            index_matrix,
            padding_mask,
            inverse_index,
        }
    }

    /// Number of original rows
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Number of distinct groups
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Size of the largest group
    pub fn width(&self) -> usize {
        self.width
    }

    /// `(groups, width)`
    pub fn shape(&self) -> (usize, usize) {
        (self.groups, self.width)
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Original row index held by each cell, `None` for padding
    pub fn index_matrix(&self) -> &Array2<Option<usize>> {
        &self.index_matrix
    }

    /// True where the index matrix is padding
    pub fn padding_mask(&self) -> &Array2<bool> {
        &self.padding_mask
    }

    /// For each original row, its flat row-major position in the rectangle
    pub fn inverse_index(&self) -> &[usize] {
        &self.inverse_index
    }

    /// Size of each group, in group order
    pub fn group_sizes(&self) -> Vec<usize> {
        self.boundaries.windows(2).map(|w| w[1] - w[0]).collect()
    }
}
