//! Data-parallel panel engine
//!
//! Grouped views over a key vector, memory-bounded rolling windows over
//! `[rows × time]` buffers, and a library of NaN-aware reductions that both
//! engines share. NaN is the missing-value marker throughout.

pub mod config;
pub mod error;
pub mod groupby;
pub mod na;
pub mod rolling;
pub mod stats;

// Re-export commonly used types
pub use config::{EngineConfig, GroupByConfig, RollingConfig, StatsConfig};
pub use error::{Error, Result};
pub use groupby::{GroupKey, GroupLayout, ParallelGroupBy};
pub use na::{DType, Element, NA};
pub use rolling::{unfold, ChunkPlan, Rolling};
pub use stats::LinearFit;

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
