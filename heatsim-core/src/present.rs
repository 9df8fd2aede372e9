//! Seam to whatever displays the field.

use crate::grid::GridView;

/// Consumer of the evolving field, polled once per step.
///
/// The orchestrator hands over raw, unclamped temperatures; any colour
/// mapping belongs to the implementor.
pub trait Presenter {
    /// Cancellation signal. Checked once per step boundary.
    fn should_close(&self) -> bool;

    /// Drain host input/window events. Has no effect on the simulation.
    fn poll_events(&mut self) {}

    fn render_grid(&mut self, grid: GridView<'_>);
}

/// Never closes, drops every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn should_close(&self) -> bool {
        false
    }

    fn render_grid(&mut self, _grid: GridView<'_>) {}
}
