//! Error types for simulation construction.
//!
//! Nothing in the per-step path can fail: once a [`crate::Simulation`] exists
//! every step either completes or the numbers blow up, which is not reported.

use thiserror::Error;

/// A configuration value that cannot describe a runnable simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid size n must be >= 5, got {0}")]
    GridTooSmall(usize),

    #[error("diffusivity alpha must be finite and > 0, got {0}")]
    Diffusivity(f32),

    #[error("stability constant must be finite and > 0, got {0}")]
    StabilityConstant(f32),

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("thread count must be >= 1 when given")]
    ZeroThreads,

    #[error("min_rows_per_task must be >= 1")]
    ZeroRowsPerTask,
}

/// Fatal failures surfaced by [`crate::Simulation::new`].
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("failed to allocate grid buffer of {cells} cells")]
    Allocation { cells: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
