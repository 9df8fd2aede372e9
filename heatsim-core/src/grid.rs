//! Double-buffered temperature field.
//!
//! Each buffer is one contiguous row-major `Vec<f32>` of `n * n` cells,
//! indexed `row * n + col`. The outer ring of both buffers holds the
//! boundary value from construction on; the kernel never writes it and the
//! injection targets never touch it.

use crate::error::SimError;

#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    n: usize,
    cells: &'a [f32],
}

impl<'a> GridView<'a> {
    pub fn new(n: usize, cells: &'a [f32]) -> Self {
        debug_assert_eq!(cells.len(), n * n);
        Self { n, cells }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cells[row * self.n + col]
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.cells
    }
}

/// Flat indices of the outer ring of an `n x n` grid, each exactly once.
pub fn ring_indices(n: usize) -> impl Iterator<Item = usize> {
    let last = n.saturating_sub(1);
    let top_bottom = (0..n).flat_map(move |col| {
        let bottom = (last > 0).then_some(last * n + col);
        std::iter::once(col).chain(bottom)
    });
    let sides = (1..last).flat_map(move |row| [row * n, row * n + last]);
    top_bottom.chain(sides)
}

/// Sets every outer-ring cell of `cells` (an `n x n` buffer) to `value`.
pub fn apply_boundary(cells: &mut [f32], n: usize, value: f32) {
    for idx in ring_indices(n) {
        cells[idx] = value;
    }
}

/// Zeroed `n x n` buffer. Fails instead of panicking or aborting when the
/// cell count overflows or the allocator refuses.
pub fn alloc_field(n: usize) -> Result<Vec<f32>, SimError> {
    let cells = n
        .checked_mul(n)
        .ok_or(SimError::Allocation { cells: usize::MAX })?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(cells)
        .map_err(|_| SimError::Allocation { cells })?;
    buf.resize(cells, 0.0);
    Ok(buf)
}

#[derive(Debug)]
pub struct GridState {
    n: usize,
    current: Vec<f32>,
    next: Vec<f32>,
}

impl GridState {
    /// Allocates both buffers, fills every cell with `f(row, col)` and then
    /// forces the outer ring of both to `boundary_value`.
    pub fn initialize<F>(n: usize, boundary_value: f32, mut f: F) -> Result<Self, SimError>
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut current = alloc_field(n)?;
        let mut next = alloc_field(n)?;

        for row in 0..n {
            for col in 0..n {
                current[row * n + col] = f(row, col);
            }
        }
        next.copy_from_slice(&current);

        apply_boundary(&mut current, n, boundary_value);
        apply_boundary(&mut next, n, boundary_value);

        Ok(Self { n, current, next })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    // ---- Buffer access ----

    pub fn current(&self) -> GridView<'_> {
        GridView::new(self.n, &self.current)
    }

    pub(crate) fn current_mut(&mut self) -> &mut [f32] {
        &mut self.current
    }

    pub fn next_mut(&mut self) -> &mut [f32] {
        &mut self.next
    }

    pub(crate) fn split(&mut self) -> (&[f32], &mut [f32]) {
        (&self.current, &mut self.next)
    }

    /// Exchanges the roles of the two buffers. O(1), no cells are copied.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    #[cfg(test)]
    pub(crate) fn next(&self) -> GridView<'_> {
        GridView::new(self.n, &self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_covers_each_edge_cell_once() {
        for n in 1..8 {
            let mut idx: Vec<_> = ring_indices(n).collect();
            let len = idx.len();
            idx.sort_unstable();
            idx.dedup();
            assert_eq!(idx.len(), len, "duplicate ring index for n={n}");
            let expected = if n == 1 { 1 } else { 4 * n - 4 };
            assert_eq!(len, expected);
            for i in idx {
                let (r, c) = (i / n, i % n);
                assert!(r == 0 || c == 0 || r == n - 1 || c == n - 1);
            }
        }
    }

    #[test]
    fn boundary_wins_over_initial_condition() {
        let g = GridState::initialize(6, 0.0, |_, _| 3.0).unwrap();
        for view in [g.current(), g.next()] {
            for r in 0..6 {
                for c in 0..6 {
                    let edge = r == 0 || c == 0 || r == 5 || c == 5;
                    assert_eq!(view.get(r, c), if edge { 0.0 } else { 3.0 });
                }
            }
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_grid_is_an_allocation_error() {
        let overflow = GridState::initialize((1 << 32) + 1, 0.0, |_, _| 0.0);
        assert!(matches!(overflow, Err(SimError::Allocation { cells: usize::MAX })));

        // fits in usize, but no allocator will hand out 2^62 floats
        let huge = alloc_field(1 << 31);
        assert!(matches!(huge, Err(SimError::Allocation { cells }) if cells == 1 << 62));
    }

    #[test]
    fn swap_exchanges_buffers_without_copy() {
        let mut g = GridState::initialize(4, 0.0, |r, c| (r * 4 + c) as f32).unwrap();
        let before = g.current().as_slice().as_ptr();
        g.next_mut()[5] = 42.0;
        g.swap();
        assert_eq!(g.current().get(1, 1), 42.0);
        assert_eq!(g.next().as_slice().as_ptr(), before);
    }
}
