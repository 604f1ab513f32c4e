//! Static row partition that bounds the peak memory of one batched window operation

use std::ops::Range;

use crate::config::RollingConfig;

/// Contiguous row ranges covering `0..rows` in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    ranges: Vec<Range<usize>>,
    rows_per_chunk: usize,
}

impl ChunkPlan {
    /// Partition `rows` so one chunk holds at most `config.chunk_budget()`
    /// elements, given `elements_per_row` window-expanded elements per row.
    ///
    /// A chunk always holds at least one row. Zero rows still yields one empty
    /// range so that operators run once and report their output shape.
    pub fn new(rows: usize, elements_per_row: usize, config: &RollingConfig) -> Self {
        let budget = config.chunk_budget();
        let rows_per_chunk = if elements_per_row == 0 {
            rows.max(1)
        } else {
            (budget / elements_per_row).max(1)
        };
        if elements_per_row > budget {
            log::warn!(
                "a single row holds {} window elements, above the chunk budget of {}",
                elements_per_row,
                budget
            );
        }

        let mut ranges = Vec::with_capacity(rows / rows_per_chunk + 1);
        let mut start = 0;
        while start < rows {
            let end = (start + rows_per_chunk).min(rows);
            ranges.push(start..end);
            start = end;
        }
        if ranges.is_empty() {
            ranges.push(0..0);
        }

        log::debug!(
            "chunk plan: rows={}, elements_per_row={}, rows_per_chunk={}, chunks={}",
            rows,
            elements_per_row,
            rows_per_chunk,
            ranges.len()
        );

        ChunkPlan {
            ranges,
            rows_per_chunk,
        }
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn rows_per_chunk(&self) -> usize {
        self.rows_per_chunk
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
