mod canvas;

pub use canvas::{CanvasPresenter, heat_color};

use heatsim_core::{Execution, RunState, SimConfig, Simulation};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct HeatSim {
    inner: Simulation,
    canvas: CanvasPresenter,
}

#[wasm_bindgen]
impl HeatSim {
    /// Reference run on an `n x n` grid. The kernel runs on the calling
    /// thread; the browser main thread has no worker pool.
    #[wasm_bindgen(constructor)]
    pub fn new(n: usize, max_steps: u64) -> Result<HeatSim, JsValue> {
        let config = SimConfig {
            n,
            max_steps,
            execution: Execution::Sequential,
            ..Default::default()
        };
        Self::from_config(config)
    }

    /// Build from a JSON-encoded `SimConfig`. The execution mode is forced to
    /// sequential.
    pub fn from_json(json: &str) -> Result<HeatSim, JsValue> {
        let mut config: SimConfig =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        config.execution = Execution::Sequential;
        Self::from_config(config)
    }

    pub fn n(&self) -> usize {
        self.inner.config().n
    }

    pub fn dt(&self) -> f32 {
        self.inner.time_step().dt
    }

    pub fn mesh_ratio(&self) -> f32 {
        self.inner.time_step().mesh_ratio
    }

    pub fn step_index(&self) -> u64 {
        self.inner.step_index()
    }

    // Copy-based JS access
    pub fn get_field(&self) -> Vec<f32> {
        self.inner.field().as_slice().to_vec()
    }

    /// RGBA bytes of the last rendered frame, `n * n * 4` long.
    pub fn get_rgba(&self) -> Vec<u8> {
        self.canvas.rgba().to_vec()
    }

    pub fn request_close(&mut self) {
        self.canvas.request_close();
    }

    /// Advance up to `steps` ticks for one animation frame.
    pub fn advance(&mut self, steps: u32) -> FrameInfo {
        let t0 = now_ms();
        let mut state = self.inner.state();
        for _ in 0..steps {
            state = self.inner.tick(&mut self.canvas);
            if state.is_terminal() {
                break;
            }
        }
        let t1 = now_ms();
        FrameInfo {
            step: self.inner.step_index(),
            compute_ms: t1 - t0,
            finished: state.is_terminal(),
            cancelled: state == RunState::Cancelled,
        }
    }
}

impl HeatSim {
    fn from_config(config: SimConfig) -> Result<HeatSim, JsValue> {
        let n = config.n;
        let inner = Simulation::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut canvas = CanvasPresenter::new(n).map_err(|e| JsValue::from_str(&e.to_string()))?;
        canvas.paint(inner.field());
        Ok(HeatSim { inner, canvas })
    }
}

#[wasm_bindgen]
pub struct FrameInfo {
    step: u64,
    compute_ms: f64,
    finished: bool,
    cancelled: bool,
}

#[wasm_bindgen]
impl FrameInfo {
    pub fn step(&self) -> u64 { self.step }
    pub fn compute_ms(&self) -> f64 { self.compute_ms }
    pub fn finished(&self) -> bool { self.finished }
    pub fn cancelled(&self) -> bool { self.cancelled }
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
