//! Engine configuration
//!
//! All settings have working defaults; a config file only needs to name the
//! values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for memory-bounded rolling aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollingConfig {
    /// Divisor applied to `reference_elements`; 32-64 suits most kernels
    pub split_multiplier: f64,
    /// Reference element count the multiplier is applied to
    pub reference_elements: usize,
    /// Explicit per-chunk element budget, overrides the multiplier when set
    pub max_chunk_elements: Option<usize>,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            split_multiplier: 64.0,
            reference_elements: 1 << 30,
            max_chunk_elements: None,
        }
    }
}

impl RollingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the split multiplier
    pub fn with_split_multiplier(mut self, split_multiplier: f64) -> Self {
        self.split_multiplier = split_multiplier;
        self
    }

    /// Set an explicit element budget per chunk
    pub fn with_max_chunk_elements(mut self, max_chunk_elements: usize) -> Self {
        self.max_chunk_elements = Some(max_chunk_elements);
        self
    }

    /// Number of window-expanded elements one chunk may hold
    pub fn chunk_budget(&self) -> usize {
        match self.max_chunk_elements {
            Some(n) => n,
            None => ((self.reference_elements as f64 / self.split_multiplier) as usize).max(1),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.split_multiplier.is_finite() && self.split_multiplier > 0.0) {
            return Err(Error::Config(format!(
                "rolling.split_multiplier must be a positive number, got {}",
                self.split_multiplier
            )));
        }
        if self.reference_elements == 0 {
            return Err(Error::Config(
                "rolling.reference_elements must be positive".to_string(),
            ));
        }
        if self.max_chunk_elements == Some(0) {
            return Err(Error::Config(
                "rolling.max_chunk_elements must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Defaults for the reduction library
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Delta degrees of freedom for variance-like reductions
    pub ddof: usize,
}

/// Configuration for group layout construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupByConfig {
    /// Key vectors shorter than this are sorted on the calling thread
    pub parallel_sort_threshold: usize,
}

impl Default for GroupByConfig {
    fn default() -> Self {
        Self {
            parallel_sort_threshold: 16_384,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rolling: RollingConfig,
    pub stats: StatsConfig,
    pub groupby: GroupByConfig,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.rolling.validate()
    }
}
