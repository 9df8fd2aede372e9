use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the stencil kernel is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Execution {
    Sequential,
    /// Fork-join over interior rows.
    ///
    /// `threads: None` runs on rayon's global pool, `Some(k)` builds a
    /// dedicated pool of `k` workers once at construction.
    Parallel {
        threads: Option<usize>,
        min_rows_per_task: usize,
    },
}

impl Default for Execution {
    fn default() -> Self {
        Execution::Parallel {
            threads: None,
            min_rows_per_task: 1,
        }
    }
}

/// Periodic heat source at the grid centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Fire every `period` steps. 0 disables injection.
    pub period: u64,
    /// Added to each target cell per trigger.
    pub quantity: f32,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            period: 10,
            quantity: 1.0,
        }
    }
}

/// Disc of constant temperature centred at `(n/2, n/2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialDisc {
    /// Radius in cells (strict `<`).
    pub radius: f32,
    pub value: f32,
}

impl Default for InitialDisc {
    fn default() -> Self {
        Self {
            radius: 25.0,
            value: 1.0,
        }
    }
}

impl InitialDisc {
    /// Value of cell `(i, j)` on an `n`-wide grid before boundaries are applied.
    pub fn sample(&self, n: usize, i: usize, j: usize) -> f32 {
        let c = n as f32 / 2.0;
        let di = i as f32 - c;
        let dj = j as f32 - c;
        if (di * di + dj * dj).sqrt() < self.radius {
            self.value
        } else {
            0.0
        }
    }
}

/// Every parameter of a run. Immutable once handed to [`crate::Simulation`].
///
/// `Default` is the reference run: a 200x200 grid, alpha 0.6, stability
/// constant 0.5, a unit source every 10 steps, 10000 steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grid is `n x n`; spacing is `1 / n`.
    pub n: usize,
    pub alpha: f32,
    /// `c` in `dt = c * alpha * dx^2`.
    pub stability: f32,
    /// Dirichlet value held on the outer ring.
    pub boundary_value: f32,
    pub injection: InjectionConfig,
    pub max_steps: u64,
    pub initial: InitialDisc,
    pub execution: Execution,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n: 200,
            alpha: 0.6,
            stability: 0.5,
            boundary_value: 0.0,
            injection: InjectionConfig::default(),
            max_steps: 10_000,
            initial: InitialDisc::default(),
            execution: Execution::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n < 5 {
            return Err(ConfigError::GridTooSmall(self.n));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(ConfigError::Diffusivity(self.alpha));
        }
        if !(self.stability.is_finite() && self.stability > 0.0) {
            return Err(ConfigError::StabilityConstant(self.stability));
        }
        for (field, value) in [
            ("boundary_value", self.boundary_value),
            ("injection.quantity", self.injection.quantity),
            ("initial.radius", self.initial.radius),
            ("initial.value", self.initial.value),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if let Execution::Parallel {
            threads,
            min_rows_per_task,
        } = self.execution
        {
            if threads == Some(0) {
                return Err(ConfigError::ZeroThreads);
            }
            if min_rows_per_task == 0 {
                return Err(ConfigError::ZeroRowsPerTask);
            }
        }
        Ok(())
    }

    pub fn dx(&self) -> f32 {
        1.0 / self.n as f32
    }
}
