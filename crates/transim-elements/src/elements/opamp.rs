use transim_matrix::MnaSystem;

use super::{Identifiable, Stamp, StepContext};

/// Ideal op-amp: infinite gain forces `v_ctrl_plus == v_ctrl_minus`, output
/// current unknown `current` is unconstrained by the input pair.
#[derive(Debug, Clone)]
pub struct OpAmp {
    pub name: String,
    pub out_plus: usize,
    pub out_minus: usize,
    pub ctrl_plus: usize,
    pub ctrl_minus: usize,
    pub current: usize,
}

impl Identifiable for OpAmp {
    fn identifier(&self) -> String {
        format!("O{}", self.name)
    }
}

impl Stamp for OpAmp {
    fn stamp(&self, sys: &mut MnaSystem, _ctx: &StepContext, _k: usize) {
        let x = self.current;
        sys.add(self.out_plus, x, 1.0);
        sys.add(self.out_minus, x, -1.0);
        sys.add(x, self.ctrl_plus, 1.0);
        sys.add(x, self.ctrl_minus, -1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::IntegrationRule;

    #[test]
    fn forces_input_pair_equal() {
        let o = OpAmp { name: "1".into(), out_plus: 1, out_minus: 0, ctrl_plus: 2, ctrl_minus: 3, current: 4 };
        let mut sys = MnaSystem::new(4);
        let ctx = StepContext {
            rule: IntegrationRule::BackwardEuler,
            t: 0.0,
            dt: 1e-6,
            dt_prev: 1e-6,
            n: 0,
            x_now: &[],
            x_prev: &[],
        };
        o.stamp(&mut sys, &ctx, 0);
        assert_eq!(sys.get(4, 2), 1.0);
        assert_eq!(sys.get(4, 3), -1.0);
        assert_eq!(sys.get(1, 4), 1.0);
    }
}
