use std::time::{Duration, Instant};

use heatsim_core::{FieldStats, GridView, Presenter};
use tracing::{info, warn};

/// Headless presenter: logs a field summary every `report_every` frames and
/// asks to close once the optional wall-clock budget is spent.
pub struct ConsolePresenter {
    report_every: u64,
    deadline: Option<Instant>,
    frames: u64,
    warned_non_finite: bool,
}

impl ConsolePresenter {
    pub fn new(report_every: u64, time_limit: Option<Duration>) -> Self {
        Self {
            report_every,
            deadline: time_limit.map(|d| Instant::now() + d),
            frames: 0,
            warned_non_finite: false,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for ConsolePresenter {
    fn should_close(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn render_grid(&mut self, grid: GridView<'_>) {
        self.frames += 1;
        if self.report_every == 0 || self.frames % self.report_every != 0 {
            return;
        }

        let stats = FieldStats::of(grid.as_slice());
        let centre = grid.get(grid.n() / 2, grid.n() / 2);
        info!(
            frame = self.frames,
            centre,
            max = stats.max,
            mean = stats.mean,
            "field"
        );
        if !stats.all_finite && !self.warned_non_finite {
            warn!(frame = self.frames, "field contains non-finite values");
            self.warned_non_finite = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_limit_never_closes() {
        let p = ConsolePresenter::new(10, None);
        assert!(!p.should_close());
    }

    #[test]
    fn expired_limit_closes() {
        let p = ConsolePresenter::new(10, Some(Duration::ZERO));
        assert!(p.should_close());
    }

    #[test]
    fn counts_frames() {
        let mut p = ConsolePresenter::new(2, None);
        let cells = vec![0.0; 9];
        for _ in 0..5 {
            p.render_grid(GridView::new(3, &cells));
        }
        assert_eq!(p.frames(), 5);
    }
}
