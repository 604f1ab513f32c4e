//! Rolling-window engine
//!
//! A [`Rolling`] holds a `[rows × time]` buffer left-padded along the time axis,
//! so that window `[r, t, :]` is the `win` most recent values ending at time `t`.
//! Window tensors are materialized one row chunk at a time; chunk sizes come from
//! a [`ChunkPlan`] and keep the `[chunk_rows × time × win]` buffer under the
//! configured element budget. Chunking never changes results.
//!
//! An optional adjustment buffer rescales every value in a window by
//! `adjustment / last_known_adjustment`, where the last known adjustment is the
//! rightmost present adjustment factor in that window. This makes historical
//! values comparable to the window's most recent observation after a
//! multiplicative event such as a split.

pub mod chunk;

use std::ops::Range;

use ndarray::{
    concatenate, s, Array, Array2, Array3, ArrayBase, ArrayView2, ArrayView3, Axis, Data, Ix2,
    RemoveAxis, Zip,
};
use num_traits::Float;
use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::stats;

pub use chunk::ChunkPlan;

/// Left-pad `x` along the time axis with `win - 1` copies of `fill`
fn pad_left<F, S>(x: &ArrayBase<S, Ix2>, win: usize, fill: F) -> Array2<F>
where
    F: Float,
    S: Data<Elem = F>,
{
    let (rows, time) = x.dim();
    let mut padded = Array2::from_elem((rows, time + win - 1), fill);
    padded.slice_mut(s![.., win - 1..]).assign(x);
    padded
}

/// Materialize the windows of `rows` from a padded buffer
fn windows_of<F>(padded: &Array2<F>, win: usize, rows: Range<usize>) -> Array3<F>
where
    F: Float + Send + Sync,
{
    let time = padded.ncols() + 1 - win;
    let src = padded.slice(s![rows.clone(), ..]);
    let mut out = Array3::<F>::zeros((rows.len(), time, win));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(r, mut dst)| {
            let row = src.row(r);
            for t in 0..time {
                for k in 0..win {
                    dst[[t, k]] = row[t + k];
                }
            }
        });
    out
}

/// Sliding-window view of `x` (`[rows × time]`) as a `[rows × time × win]` tensor,
/// left-padded with `fill` for `t < win - 1`
///
/// # Examples
/// ```rust
/// use ndarray::array;
/// use panelrs::rolling::unfold;
///
/// let windows = unfold(&array![[10.0, 20.0, 30.0]], 2, f64::NAN).unwrap();
/// assert!(windows[[0, 0, 0]].is_nan());
/// assert_eq!(windows[[0, 0, 1]], 10.0);
/// assert_eq!(windows[[0, 2, 0]], 20.0);
/// ```
pub fn unfold<F, S>(x: &ArrayBase<S, Ix2>, win: usize, fill: F) -> Result<Array3<F>>
where
    F: Float + Send + Sync,
    S: Data<Elem = F>,
{
    check_win(win)?;
    let padded = pad_left(x, win, fill);
    Ok(windows_of(&padded, win, 0..x.nrows()))
}

fn check_win(win: usize) -> Result<()> {
    if win == 0 {
        return Err(Error::InvalidInput(
            "rolling window size must be positive".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct Adjustment<F> {
    /// Padded adjustment factors, same layout as the values
    padded: Array2<F>,
    /// Rightmost present factor of each window, `[rows × time]`
    last: Array2<F>,
}

/// Rolling-window engine over a `[rows × time]` buffer
#[derive(Debug, Clone)]
pub struct Rolling<F> {
    padded: Array2<F>,
    win: usize,
    ddof: usize,
    chunks: ChunkPlan,
    adjustment: Option<Adjustment<F>>,
}

impl<F> Rolling<F>
where
    F: Float + Send + Sync,
{
    /// Build an unadjusted rolling engine with the default configuration
    ///
    /// # Examples
    /// ```rust
    /// use ndarray::array;
    /// use panelrs::Rolling;
    ///
    /// let rolling = Rolling::new(&array![[10.0f64, 20.0, 30.0, 40.0]], 2).unwrap();
    /// let sums = rolling.sum().unwrap();
    /// assert!(sums[[0, 0]].is_nan());
    /// assert_eq!(sums.row(0).slice(ndarray::s![1..]).to_vec(), vec![30.0, 50.0, 70.0]);
    /// ```
    pub fn new<S>(x: &ArrayBase<S, Ix2>, win: usize) -> Result<Self>
    where
        S: Data<Elem = F>,
    {
        Self::with_config(x, win, None, &EngineConfig::default())
    }

    /// Build a rolling engine whose windows are rescaled by `adjustment`
    pub fn with_adjustment<S>(
        x: &ArrayBase<S, Ix2>,
        win: usize,
        adjustment: ArrayView2<F>,
    ) -> Result<Self>
    where
        S: Data<Elem = F>,
    {
        Self::with_config(x, win, Some(adjustment), &EngineConfig::default())
    }

    pub fn with_config<S>(
        x: &ArrayBase<S, Ix2>,
        win: usize,
        adjustment: Option<ArrayView2<F>>,
        config: &EngineConfig,
    ) -> Result<Self>
    where
        S: Data<Elem = F>,
    {
        check_win(win)?;
        config.validate()?;
        let (rows, time) = x.dim();
        let chunks = ChunkPlan::new(rows, time * win, &config.rolling);

        let adjustment = match adjustment {
            Some(adj) => {
                if adj.dim() != x.dim() {
                    return Err(Error::ShapeMismatch {
                        label: "adjustment".to_string(),
                        expected: x.shape().to_vec(),
                        actual: adj.shape().to_vec(),
                    });
                }
                let factors = Rolling::with_config(&adj, win, None, config)?;
                let last = factors.last_nonnan()?;
                Some(Adjustment {
                    padded: factors.padded,
                    last,
                })
            }
            None => None,
        };

        Ok(Rolling {
            padded: pad_left(x, win, F::nan()),
            win,
            ddof: config.stats.ddof,
            chunks,
            adjustment,
        })
    }

    /// Window size
    pub fn win(&self) -> usize {
        self.win
    }

    pub fn rows(&self) -> usize {
        self.padded.nrows()
    }

    /// Length of the time axis
    pub fn time(&self) -> usize {
        self.padded.ncols() + 1 - self.win
    }

    /// Row ranges processed one at a time by [`Rolling::agg`]
    pub fn chunks(&self) -> &[Range<usize>] {
        self.chunks.ranges()
    }

    pub fn has_adjustment(&self) -> bool {
        self.adjustment.is_some()
    }

    /// Unadjusted windows of all rows, `[rows × time × win]`
    pub fn windows(&self) -> Array3<F> {
        windows_of(&self.padded, self.win, 0..self.rows())
    }

    /// Windows of `rows`, rescaled by the adjustment factors when present
    pub fn adjusted(&self, rows: Range<usize>) -> Array3<F> {
        let mut values = windows_of(&self.padded, self.win, rows.clone());
        if let Some(adj) = &self.adjustment {
            let factors = windows_of(&adj.padded, self.win, rows.clone());
            let last = adj.last.slice(s![rows, ..]).insert_axis(Axis(2));
            Zip::from(&mut values)
                .and(&factors)
                .and_broadcast(&last)
                .par_for_each(|v, &a, &l| *v = *v * a / l);
        }
        values
    }

    /// Run `op` over each adjusted chunk in order and concatenate the results
    /// along the row axis
    pub fn agg<D, Op>(&self, mut op: Op) -> Result<Array<F, D>>
    where
        D: RemoveAxis,
        Op: FnMut(ArrayView3<F>) -> Array<F, D>,
    {
        self.agg_with(&[], move |x, _| op(x))
    }

    /// Like [`Rolling::agg`], passing `op` the matching adjusted chunk of every
    /// engine in `others` as well. All engines must share `win` and row count.
    pub fn agg_with<D, Op>(&self, others: &[&Rolling<F>], mut op: Op) -> Result<Array<F, D>>
    where
        D: RemoveAxis,
        Op: FnMut(ArrayView3<F>, &[ArrayView3<F>]) -> Array<F, D>,
    {
        for other in others {
            if other.win != self.win {
                return Err(Error::WindowMismatch {
                    expected: self.win,
                    found: other.win,
                });
            }
            if other.rows() != self.rows() {
                return Err(Error::LengthMismatch {
                    expected: self.rows(),
                    actual: other.rows(),
                });
            }
        }

        let mut parts = Vec::with_capacity(self.chunks.len());
        for (i, range) in self.chunks.ranges().iter().enumerate() {
            log::trace!("rolling chunk {}/{}: rows {:?}", i + 1, self.chunks.len(), range);
            let chunk = self.adjusted(range.clone());
            let other_chunks: Vec<Array3<F>> =
                others.iter().map(|r| r.adjusted(range.clone())).collect();
            let other_views: Vec<ArrayView3<F>> = other_chunks.iter().map(|c| c.view()).collect();
            parts.push(op(chunk.view(), &other_views));
        }

        if parts.len() == 1 {
            if let Some(part) = parts.pop() {
                return Ok(part);
            }
        }
        let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
        Ok(concatenate(Axis(0), &views)?)
    }

    /// Values at window offset `i`; negative offsets count from the most recent
    /// value (`-1`). The most recent value is never adjusted.
    pub fn loc(&self, i: isize) -> Result<Array2<F>> {
        let win = self.win as isize;
        let idx = if i < 0 { win + i } else { i };
        if idx < 0 || idx >= win {
            return Err(Error::InvalidInput(format!(
                "window offset {} out of range for win {}",
                i, self.win
            )));
        }
        let idx = idx as usize;
        if idx == self.win - 1 {
            return Ok(self.padded.slice(s![.., self.win - 1..]).to_owned());
        }
        self.agg(|x| x.index_axis(Axis(2), idx).to_owned())
    }

    /// Most recent value of each window, i.e. the original buffer
    pub fn last(&self) -> Result<Array2<F>> {
        self.loc(-1)
    }

    /// Oldest value of each window
    pub fn first(&self) -> Result<Array2<F>> {
        self.loc(0)
    }

    /// Rightmost present value of each window
    pub fn last_nonnan(&self) -> Result<Array2<F>> {
        self.agg(|x| stats::nanlast(&x, Axis(2)))
    }

    pub fn sum(&self) -> Result<Array2<F>> {
        self.agg(|x| stats::sum(&x, Axis(2)))
    }

    pub fn nansum(&self) -> Result<Array2<F>> {
        self.agg(|x| stats::nansum(&x, Axis(2)))
    }

    pub fn mean(&self) -> Result<Array2<F>> {
        self.agg(|x| stats::mean(&x, Axis(2)))
    }

    pub fn nanmean(&self) -> Result<Array2<F>> {
        self.agg(|x| stats::nanmean(&x, Axis(2)))
    }

    /// Standard deviation with the configured `ddof` (0 by default)
    pub fn std(&self) -> Result<Array2<F>> {
        let ddof = self.ddof;
        self.agg(|x| stats::std(&x, Axis(2), ddof))
    }

    pub fn nanstd(&self) -> Result<Array2<F>> {
        let ddof = self.ddof;
        self.agg(|x| stats::nanstd(&x, Axis(2), ddof))
    }

    pub fn max(&self) -> Result<Array2<F>> {
        self.agg(|x| stats::max(&x, Axis(2)))
    }

    pub fn min(&self) -> Result<Array2<F>> {
        self.agg(|x| stats::min(&x, Axis(2)))
    }

    pub fn nanmax(&self) -> Result<Array2<F>> {
        self.agg(|x| stats::nanmax(&x, Axis(2)))
    }

    pub fn nanmin(&self) -> Result<Array2<F>> {
        self.agg(|x| stats::nanmin(&x, Axis(2)))
    }
}
