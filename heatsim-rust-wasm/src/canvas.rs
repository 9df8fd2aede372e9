use heatsim_core::{GridView, Presenter, SimError};

const STOPS: [[f32; 3]; 5] = [
    [0.0, 0.0, 1.0], // blue
    [0.0, 1.0, 1.0], // cyan
    [0.0, 1.0, 0.0], // green
    [1.0, 1.0, 0.0], // yellow
    [1.0, 0.0, 0.0], // red
];

/// Five-stop gradient over [0,1]; values outside are clamped, NaN maps to
/// the low end.
pub fn heat_color(value: f32) -> [u8; 3] {
    let v = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    let seg = ((v * 4.0) as usize).min(3);
    let t = v * 4.0 - seg as f32;
    let (a, b) = (STOPS[seg], STOPS[seg + 1]);

    let mut rgb = [0u8; 3];
    for k in 0..3 {
        let c = a[k] + (b[k] - a[k]) * t;
        rgb[k] = (c * 255.0).round() as u8;
    }
    rgb
}

/// RGBA surface for a `<canvas>` `ImageData`, one pixel per cell.
pub struct CanvasPresenter {
    n: usize,
    pixels: Vec<u8>,
    close_requested: bool,
    frames: u64,
}

impl CanvasPresenter {
    pub fn new(n: usize) -> Result<Self, SimError> {
        let bytes = n
            .checked_mul(n)
            .and_then(|cells| cells.checked_mul(4))
            .ok_or(SimError::Allocation { cells: usize::MAX })?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| SimError::Allocation { cells: n * n })?;
        pixels.resize(bytes, 0);
        Ok(Self {
            n,
            pixels,
            close_requested: false,
            frames: 0,
        })
    }

    pub fn rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn paint(&mut self, grid: GridView<'_>) {
        debug_assert_eq!(grid.n(), self.n);
        for (px, &v) in self.pixels.chunks_exact_mut(4).zip(grid.as_slice()) {
            let [r, g, b] = heat_color(v);
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }
}

impl Presenter for CanvasPresenter {
    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn render_grid(&mut self, grid: GridView<'_>) {
        self.paint(grid);
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_map_to_pure_colours() {
        assert_eq!(heat_color(0.0), [0, 0, 255]);
        assert_eq!(heat_color(0.25), [0, 255, 255]);
        assert_eq!(heat_color(0.5), [0, 255, 0]);
        assert_eq!(heat_color(0.75), [255, 255, 0]);
        assert_eq!(heat_color(1.0), [255, 0, 0]);
    }

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(heat_color(-3.0), heat_color(0.0));
        assert_eq!(heat_color(7.5), heat_color(1.0));
        assert_eq!(heat_color(f32::NAN), heat_color(0.0));
    }

    #[test]
    fn interpolates_inside_segment() {
        // halfway blue -> cyan
        assert_eq!(heat_color(0.125), [0, 128, 255]);
    }

    #[test]
    fn paints_one_opaque_pixel_per_cell() {
        let mut p = CanvasPresenter::new(2).unwrap();
        let cells = [0.0, 1.0, 0.5, 0.25];
        p.render_grid(GridView::new(2, &cells));
        assert_eq!(
            p.rgba(),
            &[0, 0, 255, 255, 255, 0, 0, 255, 0, 255, 0, 255, 0, 255, 255, 255]
        );
        assert_eq!(p.frames(), 1);
        assert!(!p.should_close());
        p.request_close();
        assert!(p.should_close());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_surface_is_an_error() {
        assert!(matches!(
            CanvasPresenter::new((1 << 32) + 1),
            Err(SimError::Allocation { .. })
        ));
        assert!(CanvasPresenter::new(1 << 31).is_err());
    }
}
