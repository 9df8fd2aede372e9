use tracing::debug;

use crate::config::InjectionConfig;

/// Periodic additive heat source on the cells nearest the grid centre.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionSchedule {
    n: usize,
    period: u64,
    quantity: f32,
    targets: Vec<(usize, usize)>,
}

/// Rows and columns `n/2` and `n/2 + 1`: four distinct cells, interior for
/// every `n >= 5`.
pub fn centre_targets(n: usize) -> Vec<(usize, usize)> {
    let (lo, hi) = (n / 2, n / 2 + 1);
    vec![(lo, lo), (lo, hi), (hi, lo), (hi, hi)]
}

impl InjectionSchedule {
    pub fn centre(n: usize, cfg: InjectionConfig) -> Self {
        Self {
            n,
            period: cfg.period,
            quantity: cfg.quantity,
            targets: centre_targets(n),
        }
    }

    pub fn targets(&self) -> &[(usize, usize)] {
        &self.targets
    }

    pub fn is_enabled(&self) -> bool {
        self.period > 0 && self.quantity != 0.0
    }

    pub fn fires_at(&self, step: u64) -> bool {
        self.is_enabled() && step % self.period == 0
    }

    /// Adds the quantity to every target of `current` when `step` is a
    /// trigger step. Returns whether it fired.
    pub fn maybe_inject(&self, current: &mut [f32], step: u64) -> bool {
        if !self.fires_at(step) {
            return false;
        }
        for &(row, col) in &self.targets {
            current[row * self.n + col] += self.quantity;
        }
        debug!(step, quantity = self.quantity, cells = self.targets.len(), "injected heat");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_are_interior_and_centred() {
        assert_eq!(
            centre_targets(200),
            vec![(100, 100), (100, 101), (101, 100), (101, 101)]
        );
        assert_eq!(centre_targets(5), vec![(2, 2), (2, 3), (3, 2), (3, 3)]);
        assert_eq!(centre_targets(6), vec![(3, 3), (3, 4), (4, 3), (4, 4)]);
        for n in 5..64 {
            let mut t = centre_targets(n);
            t.dedup();
            assert_eq!(t.len(), 4, "n={n}");
            for (r, c) in t {
                assert!(r >= 1 && c >= 1 && r <= n - 2 && c <= n - 2, "n={n}");
            }
        }
    }

    #[test]
    fn fires_on_period_multiples_only() {
        let s = InjectionSchedule::centre(10, InjectionConfig { period: 10, quantity: 1.0 });
        let fired: Vec<u64> = (0..=10).filter(|&t| s.fires_at(t)).collect();
        assert_eq!(fired, vec![0, 10]);
    }

    #[test]
    fn zero_period_or_quantity_disables() {
        let off = InjectionSchedule::centre(10, InjectionConfig { period: 0, quantity: 1.0 });
        assert!(!off.fires_at(0));
        let none = InjectionSchedule::centre(10, InjectionConfig { period: 1, quantity: 0.0 });
        let mut cells = vec![0.0; 100];
        assert!(!none.maybe_inject(&mut cells, 0));
    }

    #[test]
    fn adds_exactly_quantity_to_targets() {
        let n = 6;
        let s = InjectionSchedule::centre(n, InjectionConfig { period: 3, quantity: 0.25 });
        let before: Vec<f32> = (0..n * n).map(|k| k as f32 * 0.5).collect();
        let mut after = before.clone();
        assert!(s.maybe_inject(&mut after, 6));
        for k in 0..n * n {
            let hit = s.targets().contains(&(k / n, k % n));
            let want = if hit { before[k] + 0.25 } else { before[k] };
            assert_eq!(after[k], want);
        }
        assert!(!s.maybe_inject(&mut after, 7));
    }
}
