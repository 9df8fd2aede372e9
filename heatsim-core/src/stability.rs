//! Time step derivation for the explicit scheme.

use tracing::warn;

/// Upper bound on the mesh ratio `alpha * dt / dx^2` for the 2-D explicit
/// 5-point scheme (von Neumann).
pub const MESH_RATIO_BOUND: f32 = 0.25;

/// Step sizes fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    pub dx: f32,
    pub dt: f32,
    /// `alpha * dt / dx^2`
    pub mesh_ratio: f32,
}

impl TimeStep {
    /// `dt = c * alpha * dx^2`.
    ///
    /// `c` is taken as given. A mesh ratio above [`MESH_RATIO_BOUND`] is
    /// logged but not corrected.
    pub fn derive(alpha: f32, dx: f32, c: f32) -> Self {
        let dx2 = dx * dx;
        let dt = c * alpha * dx2;
        let mesh_ratio = alpha * dt / dx2;
        if mesh_ratio > MESH_RATIO_BOUND {
            warn!(
                mesh_ratio,
                bound = MESH_RATIO_BOUND,
                "stability constant {c} with alpha {alpha} exceeds the explicit scheme bound; field may diverge"
            );
        }
        Self { dx, dt, mesh_ratio }
    }

    pub fn is_stable(&self) -> bool {
        self.mesh_ratio <= MESH_RATIO_BOUND
    }
}
