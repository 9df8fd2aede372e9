//! Explicit finite-difference solver for the 2-D heat equation.
//!
//! A [`Simulation`] owns two `n x n` buffers with a fixed (Dirichlet) outer
//! ring, injects heat at the grid centre every few steps, advances the field
//! with a 5-point stencil (sequential or rayon fork-join) and hands every new
//! frame to a [`Presenter`].

pub mod config;
pub mod error;
pub mod grid;
pub mod injection;
pub mod kernel;
pub mod present;
pub mod simulation;
pub mod stability;
pub mod stats;

pub use config::{Execution, InitialDisc, InjectionConfig, SimConfig};
pub use error::{ConfigError, SimError};
pub use grid::{GridState, GridView};
pub use injection::InjectionSchedule;
pub use kernel::Stencil;
pub use present::{NullPresenter, Presenter};
pub use simulation::{RunOutcome, RunState, Simulation};
pub use stability::{MESH_RATIO_BOUND, TimeStep};
pub use stats::FieldStats;
