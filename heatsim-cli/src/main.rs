mod console;
mod ic;

use clap::Parser;
use console::ConsolePresenter;
use heatsim_core::{Execution, RunOutcome, SimConfig, SimError, Simulation, TimeStep};
use ic::{IcPreset, generate_ic};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "2-D explicit heat diffusion with a periodic centre source")]
struct Args {
    /// JSON file with a SimConfig; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid size N (NxN)
    #[arg(long)]
    n: Option<usize>,

    /// Diffusivity alpha
    #[arg(long)]
    alpha: Option<f32>,

    /// Stability constant c in dt = c * alpha * dx^2
    #[arg(long)]
    stability: Option<f32>,

    /// Fixed value on the outer ring
    #[arg(long)]
    boundary: Option<f32>,

    /// Inject every K steps (0 disables)
    #[arg(long)]
    period: Option<u64>,

    /// Heat added to each centre cell per injection
    #[arg(long)]
    quantity: Option<f32>,

    /// Number of steps before the run completes
    #[arg(long)]
    max_steps: Option<u64>,

    /// Radius of the initial disc (circle preset)
    #[arg(long)]
    radius: Option<f32>,

    /// Initial condition preset
    #[arg(long, value_enum, default_value_t = IcPreset::Circle)]
    ic: IcPreset,

    /// RNG seed for random presets
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Run the kernel on the calling thread only
    #[arg(long, conflicts_with = "threads")]
    sequential: bool,

    /// Dedicated kernel worker count (default: rayon global pool)
    #[arg(long)]
    threads: Option<usize>,

    /// Minimum interior rows per parallel task
    #[arg(long)]
    min_rows: Option<usize>,

    /// Log a field summary every N frames (0 = never)
    #[arg(long, default_value_t = 1000)]
    report_every: u64,

    /// Cancel the run after this many seconds of wall-clock time
    #[arg(long)]
    time_limit_secs: Option<f64>,

    /// Write the final field and run metadata to this directory
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunMeta<'a> {
    config: &'a SimConfig,
    ic: &'static str,
    seed: u64,
    dx: f32,
    dt: f32,
    mesh_ratio: f32,
    outcome: RunOutcome,
    elapsed_secs: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let mut sim = build_simulation(config, args.ic, args.seed)?;

    let time_limit = match args.time_limit_secs {
        Some(s) => Some(Duration::try_from_secs_f64(s).map_err(|e| format!("--time-limit-secs: {e}"))?),
        None => None,
    };
    let mut presenter = ConsolePresenter::new(args.report_every, time_limit);

    let start = Instant::now();
    let outcome = sim.run(&mut presenter);
    let elapsed = start.elapsed();

    info!(
        state = ?outcome.state,
        steps = outcome.steps,
        injections = outcome.injections,
        max = outcome.stats.max,
        elapsed_secs = elapsed.as_secs_f64(),
        "finished"
    );

    if let Some(dir) = &args.out {
        let ts = sim.time_step();
        write_snapshot(dir, &sim, &args, ts, outcome, elapsed)?;
        println!("Wrote final field to: {}", dir.display());
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<SimConfig, Box<dyn std::error::Error>> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("reading {}: {e}", path.display()))?;
            serde_json::from_str(&text).map_err(|e| format!("parsing {}: {e}", path.display()))?
        }
        None => SimConfig::default(),
    };

    if let Some(n) = args.n {
        cfg.n = n;
    }
    if let Some(alpha) = args.alpha {
        cfg.alpha = alpha;
    }
    if let Some(c) = args.stability {
        cfg.stability = c;
    }
    if let Some(b) = args.boundary {
        cfg.boundary_value = b;
    }
    if let Some(k) = args.period {
        cfg.injection.period = k;
    }
    if let Some(q) = args.quantity {
        cfg.injection.quantity = q;
    }
    if let Some(m) = args.max_steps {
        cfg.max_steps = m;
    }
    if let Some(r) = args.radius {
        cfg.initial.radius = r;
    }

    if args.sequential {
        cfg.execution = Execution::Sequential;
    } else if args.threads.is_some() || args.min_rows.is_some() {
        let (threads, rows) = match cfg.execution {
            Execution::Parallel {
                threads,
                min_rows_per_task,
            } => (threads, min_rows_per_task),
            Execution::Sequential => (None, 1),
        };
        cfg.execution = Execution::Parallel {
            threads: args.threads.or(threads),
            min_rows_per_task: args.min_rows.unwrap_or(rows),
        };
    }

    cfg.validate()?;
    Ok(cfg)
}

fn build_simulation(config: SimConfig, preset: IcPreset, seed: u64) -> Result<Simulation, SimError> {
    if preset == IcPreset::Circle {
        return Simulation::new(config);
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let field = generate_ic(&mut rng, config.n, preset, &config.initial)?;
    let n = config.n;
    Simulation::with_initial(config, |row, col| field[row * n + col])
}

fn write_snapshot(
    dir: &Path,
    sim: &Simulation,
    args: &Args,
    ts: TimeStep,
    outcome: RunOutcome,
    elapsed: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;

    let mut field_writer = BufWriter::new(File::create(dir.join("field.bin"))?);
    write_f32_vec(&mut field_writer, sim.field().as_slice())?;
    field_writer.flush()?;

    let meta = RunMeta {
        config: sim.config(),
        ic: args.ic.as_str(),
        seed: args.seed,
        dx: ts.dx,
        dt: ts.dt,
        mesh_ratio: ts.mesh_ratio,
        outcome,
        elapsed_secs: elapsed.as_secs_f64(),
    };
    let mut meta_writer = BufWriter::new(File::create(dir.join("meta.json"))?);
    serde_json::to_writer_pretty(&mut meta_writer, &meta)?;
    meta_writer.write_all(b"\n")?;
    meta_writer.flush()?;

    Ok(())
}

fn write_f32_vec<W: Write>(w: &mut W, v: &[f32]) -> std::io::Result<()> {
    for &x in v {
        w.write_all(&x.to_le_bytes())?;
    }
    Ok(())
}
