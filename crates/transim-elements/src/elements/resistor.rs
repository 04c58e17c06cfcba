use transim_matrix::MnaSystem;

use super::{Identifiable, Stamp, StepContext};

#[derive(Debug, Clone)]
pub struct Resistor {
    pub name: String,
    pub plus: usize,
    pub minus: usize,
    pub resistance: f64,
}

impl Identifiable for Resistor {
    fn identifier(&self) -> String {
        format!("R{}", self.name)
    }
}

impl Stamp for Resistor {
    fn stamp(&self, sys: &mut MnaSystem, _ctx: &StepContext, _k: usize) {
        sys.stamp_cond(self.plus, self.minus, 1.0 / self.resistance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_reciprocal_conductance() {
        let r = Resistor { name: "1".into(), plus: 1, minus: 2, resistance: 1000.0 };
        let mut sys = MnaSystem::new(2);
        let ctx = StepContext {
            rule: super::super::IntegrationRule::BackwardEuler,
            t: 0.0,
            dt: 1e-6,
            dt_prev: 1e-6,
            n: 0,
            x_now: &[0.0, 0.0, 0.0],
            x_prev: &[0.0, 0.0, 0.0],
        };
        r.stamp(&mut sys, &ctx, 0);
        assert!((sys.get(1, 1) - 1e-3).abs() < 1e-12);
        assert!((sys.get(2, 2) - 1e-3).abs() < 1e-12);
        assert!((sys.get(1, 2) + 1e-3).abs() < 1e-12);
    }
}
