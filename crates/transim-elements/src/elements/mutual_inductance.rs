use transim_matrix::MnaSystem;

use super::{Identifiable, IntegrationRule, Stamp, StepContext};

/// Mutual inductance between two branch-current-form inductors. `coupling`
/// (`k`) precomputes into `mutual = k * sqrt(li * lj)` at construction.
/// Forward Euler is invalid for any circuit containing a `K` element
/// rejected upstream at circuit construction, not here.
#[derive(Debug, Clone)]
pub struct MutualInductance {
    pub name: String,
    pub current_i: usize,
    pub current_j: usize,
    pub ic_i: f64,
    pub ic_j: f64,
    pub mutual: f64,
}

impl MutualInductance {
    pub fn new(name: String, current_i: usize, ic_i: f64, current_j: usize, ic_j: f64, coupling: f64, li: f64, lj: f64) -> Self {
        Self {
            name,
            current_i,
            current_j,
            ic_i,
            ic_j,
            mutual: coupling * (li * lj).sqrt(),
        }
    }
}

impl Identifiable for MutualInductance {
    fn identifier(&self) -> String {
        format!("K{}", self.name)
    }
}

impl Stamp for MutualInductance {
    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, _k: usize) {
        let i_prev = if ctx.n == 0 { self.ic_i } else { ctx.x_prev[self.current_i] };
        let j_prev = if ctx.n == 0 { self.ic_j } else { ctx.x_prev[self.current_j] };

        let r = match ctx.rule {
            IntegrationRule::BackwardEuler => self.mutual / ctx.dt,
            IntegrationRule::Trapezoidal => 2.0 * self.mutual / ctx.dt,
            IntegrationRule::ForwardEuler => {
                unreachable!("forward Euler is invalid with mutual inductance; must be rejected at circuit construction")
            }
        };

        sys.add(self.current_i, self.current_j, r);
        sys.add(self.current_j, self.current_i, r);
        sys.add_rhs(self.current_i, r * j_prev);
        sys.add_rhs(self.current_j, r * i_prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precomputes_mutual_from_coupling() {
        let m = MutualInductance::new("1".into(), 1, 0.0, 2, 0.0, 0.5, 1e-3, 4e-3);
        assert!((m.mutual - 0.5 * (1e-3_f64 * 4e-3).sqrt()).abs() < 1e-15);
    }

    #[test]
    fn stamps_symmetric_coupling() {
        let m = MutualInductance::new("1".into(), 1, 0.1, 2, 0.2, 0.5, 1e-3, 1e-3);
        let mut sys = MnaSystem::new(2);
        let ctx = StepContext {
            rule: IntegrationRule::BackwardEuler,
            t: 0.0,
            dt: 1e-6,
            dt_prev: 1e-6,
            n: 0,
            x_now: &[0.0, 0.0, 0.0],
            x_prev: &[0.0, 0.0, 0.0],
        };
        m.stamp(&mut sys, &ctx, 0);
        assert_eq!(sys.get(1, 2), sys.get(2, 1));
    }
}
