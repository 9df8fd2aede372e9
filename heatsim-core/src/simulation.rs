//! Step orchestration.
//!
//! One iteration of the run loop is: check for completion, poll the
//! presenter's close flag, inject (maybe), run the kernel, swap, then hand
//! the new `current` to the presenter. Everything except the kernel runs on
//! the calling thread; the kernel returns only after every worker is done,
//! so the swap always sees a fully written buffer.

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{info, trace};

use crate::config::{Execution, SimConfig};
use crate::error::SimError;
use crate::grid::{GridState, GridView};
use crate::injection::InjectionSchedule;
use crate::kernel::Stencil;
use crate::present::Presenter;
use crate::stability::TimeStep;
use crate::stats::FieldStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    /// The presenter asked to close. Terminal.
    Cancelled,
    /// `max_steps` reached. Terminal.
    Completed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunOutcome {
    pub state: RunState,
    pub steps: u64,
    pub injections: u64,
    pub stats: FieldStats,
}

enum Executor {
    Sequential,
    Global { min_rows: usize },
    Pool { pool: ThreadPool, min_rows: usize },
}

impl Executor {
    fn build(execution: Execution) -> Result<Self, SimError> {
        Ok(match execution {
            Execution::Sequential => Executor::Sequential,
            Execution::Parallel {
                threads: None,
                min_rows_per_task,
            } => Executor::Global {
                min_rows: min_rows_per_task,
            },
            Execution::Parallel {
                threads: Some(k),
                min_rows_per_task,
            } => Executor::Pool {
                pool: ThreadPoolBuilder::new()
                    .num_threads(k)
                    .thread_name(|i| format!("heatsim-kernel-{i}"))
                    .build()?,
                min_rows: min_rows_per_task,
            },
        })
    }

    fn run(&self, stencil: &Stencil, cur: &[f32], next: &mut [f32]) {
        match self {
            Executor::Sequential => stencil.apply_sequential(cur, next),
            Executor::Global { min_rows } => stencil.apply_parallel(cur, next, *min_rows),
            Executor::Pool { pool, min_rows } => {
                pool.install(|| stencil.apply_parallel(cur, next, *min_rows));
            }
        }
    }
}

/// Owns the grid, the schedule and the step index for one run.
pub struct Simulation {
    config: SimConfig,
    time_step: TimeStep,
    stencil: Stencil,
    schedule: InjectionSchedule,
    grid: GridState,
    executor: Executor,
    step_index: u64,
    injections: u64,
    state: RunState,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let n = config.n;
        let disc = config.initial;
        Self::with_initial(config, |row, col| disc.sample(n, row, col))
    }

    /// Builds a run whose initial field is `f(row, col)`. The outer ring is
    /// overwritten with the boundary value afterwards.
    pub fn with_initial<F>(config: SimConfig, f: F) -> Result<Self, SimError>
    where
        F: FnMut(usize, usize) -> f32,
    {
        config.validate()?;

        let n = config.n;
        let time_step = TimeStep::derive(config.alpha, config.dx(), config.stability);
        let stencil = Stencil::new(n, config.alpha, time_step.dt, time_step.dx);
        let schedule = InjectionSchedule::centre(n, config.injection);
        let grid = GridState::initialize(n, config.boundary_value, f)?;
        let executor = Executor::build(config.execution)?;

        info!(
            n,
            alpha = config.alpha,
            dx = time_step.dx,
            dt = time_step.dt,
            mesh_ratio = time_step.mesh_ratio,
            max_steps = config.max_steps,
            "simulation initialized"
        );

        Ok(Self {
            config,
            time_step,
            stencil,
            schedule,
            grid,
            executor,
            step_index: 0,
            injections: 0,
            state: RunState::Running,
        })
    }

    // ---- Accessors ----

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn time_step(&self) -> TimeStep {
        self.time_step
    }

    pub fn schedule(&self) -> &InjectionSchedule {
        &self.schedule
    }

    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    pub fn injections(&self) -> u64 {
        self.injections
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn field(&self) -> GridView<'_> {
        self.grid.current()
    }

    pub fn stats(&self) -> FieldStats {
        FieldStats::of(self.grid.current().as_slice())
    }

    // ---- Stepping ----

    /// One inject / kernel / swap cycle, without a presenter and without
    /// regard to `max_steps`.
    pub fn step(&mut self) {
        if self
            .schedule
            .maybe_inject(self.grid.current_mut(), self.step_index)
        {
            self.injections += 1;
        }

        let (cur, next) = self.grid.split();
        self.executor.run(&self.stencil, cur, next);
        self.grid.swap();

        self.step_index += 1;
        trace!(step = self.step_index, "step complete");
    }

    /// Advances the run state machine by one iteration.
    pub fn tick<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> RunState {
        if self.state.is_terminal() {
            return self.state;
        }

        if self.step_index >= self.config.max_steps {
            self.state = RunState::Completed;
            info!(steps = self.step_index, "run completed");
            return self.state;
        }

        if presenter.should_close() {
            self.state = RunState::Cancelled;
            info!(steps = self.step_index, "run cancelled by presenter");
            return self.state;
        }

        self.step();
        presenter.poll_events();
        presenter.render_grid(self.grid.current());

        self.state
    }

    pub fn run<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> RunOutcome {
        while !self.tick(presenter).is_terminal() {}
        self.outcome()
    }

    pub fn outcome(&self) -> RunOutcome {
        RunOutcome {
            state: self.state,
            steps: self.step_index,
            injections: self.injections,
            stats: self.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InjectionConfig;
    use crate::present::NullPresenter;

    fn small(max_steps: u64) -> SimConfig {
        SimConfig {
            n: 16,
            alpha: 0.6,
            max_steps,
            execution: Execution::Sequential,
            ..Default::default()
        }
    }

    struct CloseAfter {
        frames: usize,
        limit: usize,
        polls: usize,
    }

    impl Presenter for CloseAfter {
        fn should_close(&self) -> bool {
            self.frames >= self.limit
        }

        fn poll_events(&mut self) {
            self.polls += 1;
        }

        fn render_grid(&mut self, grid: GridView<'_>) {
            assert_eq!(grid.n(), 16);
            self.frames += 1;
        }
    }

    #[test]
    fn completes_at_max_steps() {
        let mut sim = Simulation::new(small(25)).unwrap();
        let out = sim.run(&mut NullPresenter);
        assert_eq!(out.state, RunState::Completed);
        assert_eq!(out.steps, 25);
        // steps 0, 10, 20
        assert_eq!(out.injections, 3);
        assert_eq!(sim.tick(&mut NullPresenter), RunState::Completed);
        assert_eq!(sim.step_index(), 25);
    }

    #[test]
    fn cancels_when_presenter_closes() {
        let mut sim = Simulation::new(small(1000)).unwrap();
        let mut p = CloseAfter { frames: 0, limit: 7, polls: 0 };
        let out = sim.run(&mut p);
        assert_eq!(out.state, RunState::Cancelled);
        assert_eq!(out.steps, 7);
        assert_eq!(p.frames, 7);
        assert_eq!(p.polls, 7);
    }

    #[test]
    fn close_before_first_step_takes_no_step() {
        let mut sim = Simulation::new(small(10)).unwrap();
        let mut p = CloseAfter { frames: 0, limit: 0, polls: 0 };
        assert_eq!(sim.tick(&mut p), RunState::Cancelled);
        assert_eq!(sim.step_index(), 0);
        assert_eq!(p.frames, 0);
    }

    #[test]
    fn zero_max_steps_completes_immediately() {
        let mut sim = Simulation::new(small(0)).unwrap();
        assert_eq!(sim.run(&mut NullPresenter).state, RunState::Completed);
        assert_eq!(sim.step_index(), 0);
    }

    #[test]
    fn swap_exposes_kernel_output_and_recycles_old_current() {
        let cfg = SimConfig {
            injection: InjectionConfig { period: 0, quantity: 1.0 },
            ..small(5)
        };
        let mut sim = Simulation::new(cfg).unwrap();
        let before = sim.field().as_slice().to_vec();

        let mut expected = vec![0.0; before.len()];
        sim.stencil.apply_sequential(&before, &mut expected);
        crate::grid::apply_boundary(&mut expected, 16, 0.0);

        sim.step();
        assert_eq!(sim.field().as_slice(), expected.as_slice());
        assert_eq!(sim.grid.next().as_slice(), before.as_slice());
    }

    #[test]
    fn rejects_invalid_config() {
        let err = Simulation::new(SimConfig { n: 1, ..Default::default() }).err();
        assert!(matches!(err, Some(SimError::InvalidConfig(_))));
    }
}
