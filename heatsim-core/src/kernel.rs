//! 5-point stencil update with explicit Euler integration.
//!
//! For every interior cell `(i, j)`:
//!
//! ```text
//! lap       = (cur[i+1][j] - 2 cur[i][j] + cur[i-1][j]) / dx^2
//!           + (cur[i][j+1] - 2 cur[i][j] + cur[i][j-1]) / dx^2
//! next[i][j] = cur[i][j] + alpha * dt * lap
//! ```
//!
//! `cur` is only ever borrowed shared and `next` is split into disjoint
//! rows, so the parallel and sequential paths run the same per-row code and
//! produce bit-identical output. Boundary cells of `next` are not written.

use rayon::prelude::*;

/// Coefficients of one kernel pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    pub n: usize,
    /// `alpha * dt`
    pub alpha_dt: f32,
    /// `dx * dx`
    pub dx2: f32,
}

impl Stencil {
    pub fn new(n: usize, alpha: f32, dt: f32, dx: f32) -> Self {
        Self {
            n,
            alpha_dt: alpha * dt,
            dx2: dx * dx,
        }
    }

    #[inline]
    fn update_row(&self, cur: &[f32], row: usize, out: &mut [f32]) {
        let n = self.n;
        let above = &cur[(row - 1) * n..row * n];
        let here = &cur[row * n..(row + 1) * n];
        let below = &cur[(row + 1) * n..(row + 2) * n];

        for j in 1..n - 1 {
            let u = here[j];
            let lap = (below[j] - 2.0 * u + above[j]) / self.dx2
                + (here[j + 1] - 2.0 * u + here[j - 1]) / self.dx2;
            out[j] = u + self.alpha_dt * lap;
        }
    }

    fn interior_rows<'a>(&self, next: &'a mut [f32]) -> &'a mut [f32] {
        debug_assert_eq!(next.len(), self.n * self.n);
        &mut next[self.n..(self.n - 1) * self.n]
    }

    /// Single-threaded pass.
    pub fn apply_sequential(&self, cur: &[f32], next: &mut [f32]) {
        debug_assert_eq!(cur.len(), self.n * self.n);
        if self.n < 3 {
            return;
        }
        for (r, out) in self.interior_rows(next).chunks_mut(self.n).enumerate() {
            self.update_row(cur, r + 1, out);
        }
    }

    /// Fork-join pass on the current rayon pool. Returns once every row is
    /// written.
    pub fn apply_parallel(&self, cur: &[f32], next: &mut [f32], min_rows_per_task: usize) {
        debug_assert_eq!(cur.len(), self.n * self.n);
        if self.n < 3 {
            return;
        }
        let n = self.n;
        self.interior_rows(next)
            .par_chunks_mut(n)
            .with_min_len(min_rows_per_task.max(1))
            .enumerate()
            .for_each(|(r, out)| self.update_row(cur, r + 1, out));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bumpy(n: usize) -> Vec<f32> {
        (0..n * n)
            .map(|k| ((k * 7919) % 101) as f32 / 100.0)
            .collect()
    }

    #[test]
    fn uniform_interior_is_fixed_point() {
        let n = 6;
        let cur = vec![0.5; n * n];
        let mut next = vec![-1.0; n * n];
        Stencil::new(n, 1.0, 0.001, 0.1).apply_sequential(&cur, &mut next);
        for r in 1..n - 1 {
            for c in 1..n - 1 {
                assert_eq!(next[r * n + c], 0.5);
            }
        }
    }

    #[test]
    fn never_touches_ring_or_cur() {
        let n = 7;
        let cur = bumpy(n);
        let snapshot = cur.clone();
        let mut next = vec![-9.0; n * n];
        Stencil::new(n, 0.6, 0.0001, 1.0 / 7.0).apply_parallel(&cur, &mut next, 1);
        assert_eq!(cur, snapshot);
        for idx in crate::grid::ring_indices(n) {
            assert_eq!(next[idx], -9.0);
        }
    }

    #[test]
    fn parallel_matches_sequential_bitwise() {
        let n = 33;
        let cur = bumpy(n);
        let s = Stencil::new(n, 0.6, 0.5 * 0.6 / (n * n) as f32, 1.0 / n as f32);
        let mut a = vec![0.0; n * n];
        let mut b = vec![0.0; n * n];
        s.apply_sequential(&cur, &mut a);
        for rows in [1, 2, 5, 31] {
            s.apply_parallel(&cur, &mut b, rows);
            assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
        }
    }
}
