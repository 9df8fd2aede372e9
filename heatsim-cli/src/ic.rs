use clap::ValueEnum;
use heatsim_core::grid::alloc_field;
use heatsim_core::{InitialDisc, SimError, Stencil};
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum IcPreset {
    /// Constant disc at the centre (reference run)
    Circle,
    /// A few Gaussian hot spots
    HotSpots,
    /// Overlapping heated plates
    HotPlates,
    /// White noise relaxed by a few diffusion passes
    SmoothNoise,
    /// Linear ramp between two walls plus one hot spot
    RampHotspot,
}

impl IcPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            IcPreset::Circle => "circle",
            IcPreset::HotSpots => "hot-spots",
            IcPreset::HotPlates => "hot-plates",
            IcPreset::SmoothNoise => "smooth-noise",
            IcPreset::RampHotspot => "ramp-hotspot",
        }
    }
}

// Mesh ratio 0.25: each pass replaces a cell by the mean of its four neighbours.
const RELAX_PASSES: usize = 3;

/// Initial field (len = n*n, row-major). Random presets are normalized to
/// [0,1]; the boundary ring is left for the simulation to overwrite.
pub fn generate_ic<R: Rng>(
    rng: &mut R,
    n: usize,
    preset: IcPreset,
    disc: &InitialDisc,
) -> Result<Vec<f32>, SimError> {
    let mut f = alloc_field(n)?;
    let span = n as f32 - 1.0;

    match preset {
        IcPreset::Circle => {
            for (k, v) in f.iter_mut().enumerate() {
                *v = disc.sample(n, k / n, k % n);
            }
            return Ok(f);
        }

        IcPreset::HotSpots => {
            for _ in 0..rng.gen_range(1..=3) {
                let centre = (rng.gen_range(0.15..0.85) * span, rng.gen_range(0.15..0.85) * span);
                let sigma = rng.gen_range(0.02..0.08) * n as f32;
                let peak = rng.gen_range(0.6..1.0);
                add_hot_spot(&mut f, n, centre, sigma, peak);
            }
        }

        IcPreset::HotPlates => {
            let half = (n / 2).max(3);
            for _ in 0..rng.gen_range(1..=4) {
                let top = rng.gen_range(1..half);
                let left = rng.gen_range(1..half);
                let bottom = (top + rng.gen_range(2..half)).min(n - 2);
                let right = (left + rng.gen_range(2..half)).min(n - 2);
                let temp = rng.gen_range(0.5..1.0);

                for row in top..=bottom {
                    for cell in &mut f[row * n + left..=row * n + right] {
                        *cell = cell.max(temp);
                    }
                }
            }
        }

        IcPreset::SmoothNoise => {
            for v in f.iter_mut() {
                *v = rng.gen_range(0.0..1.0);
            }
            relax(&mut f, n, RELAX_PASSES)?;
        }

        IcPreset::RampHotspot => {
            // cold wall at 0, warm wall at `wall`, along a random axis
            let wall = rng.gen_range(0.3..0.8);
            let axis = rng.gen_range(0..4);
            for (k, v) in f.iter_mut().enumerate() {
                let (row, col) = ((k / n) as f32, (k % n) as f32);
                let t = match axis {
                    0 => col / span,
                    1 => row / span,
                    2 => 1.0 - col / span,
                    _ => 1.0 - row / span,
                };
                *v = wall * t;
            }
            let centre = (rng.gen_range(0.2..0.8) * span, rng.gen_range(0.2..0.8) * span);
            let sigma = rng.gen_range(0.03..0.1) * n as f32;
            let peak = rng.gen_range(0.4..0.9);
            add_hot_spot(&mut f, n, centre, sigma, peak);
        }
    }

    normalize_01(&mut f);
    Ok(f)
}

fn add_hot_spot(f: &mut [f32], n: usize, (cr, cc): (f32, f32), sigma: f32, peak: f32) {
    let denom = 2.0 * sigma * sigma;
    for (k, v) in f.iter_mut().enumerate() {
        let dr = (k / n) as f32 - cr;
        let dc = (k % n) as f32 - cc;
        *v += peak * (-(dr * dr + dc * dc) / denom).exp();
    }
}

fn normalize_01(f: &mut [f32]) {
    let peak = f.iter().copied().fold(0.0f32, f32::max);
    if peak > 0.0 {
        for v in f.iter_mut() {
            *v = (*v / peak).clamp(0.0, 1.0);
        }
    }
}

/// Runs `passes` heat-equation steps at the stability limit over the field.
/// The outer ring is held fixed.
fn relax(f: &mut Vec<f32>, n: usize, passes: usize) -> Result<(), SimError> {
    let stencil = Stencil::new(n, 1.0, 0.25, 1.0);
    let mut out = alloc_field(n)?;
    for _ in 0..passes {
        out.copy_from_slice(f);
        stencil.apply_sequential(f, &mut out);
        std::mem::swap(f, &mut out);
    }
    Ok(())
}
