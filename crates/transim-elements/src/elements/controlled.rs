//! Controlled-source stamps (G/E/F/H). The teacher has no controlled-source
//! family at all; these are grounded on the direct dense-matrix-mutation
//! style of `examples/rjwalters-spicier/crates/spicier-devices/src/controlled.rs`,
//! adapted to this crate's `Stamp` trait and symbol-table indices.

use transim_matrix::MnaSystem;

use super::{Identifiable, Stamp, StepContext};

/// Voltage-controlled current source: `g(a, b, c, d, gm)`. No branch current unknown.
#[derive(Debug, Clone)]
pub struct Vccs {
    pub name: String,
    pub out_plus: usize,
    pub out_minus: usize,
    pub ctrl_plus: usize,
    pub ctrl_minus: usize,
    pub transconductance: f64,
}

impl Identifiable for Vccs {
    fn identifier(&self) -> String {
        format!("G{}", self.name)
    }
}

impl Stamp for Vccs {
    fn stamp(&self, sys: &mut MnaSystem, _ctx: &StepContext, _k: usize) {
        sys.stamp_g(self.out_plus, self.out_minus, self.ctrl_plus, self.ctrl_minus, self.transconductance);
    }
}

/// Voltage-controlled voltage source with branch current unknown `current`.
#[derive(Debug, Clone)]
pub struct Vcvs {
    pub name: String,
    pub out_plus: usize,
    pub out_minus: usize,
    pub ctrl_plus: usize,
    pub ctrl_minus: usize,
    pub current: usize,
    pub gain: f64,
}

impl Identifiable for Vcvs {
    fn identifier(&self) -> String {
        format!("E{}", self.name)
    }
}

impl Stamp for Vcvs {
    fn stamp(&self, sys: &mut MnaSystem, _ctx: &StepContext, _k: usize) {
        let x = self.current;
        sys.add(self.out_plus, x, 1.0);
        sys.add(self.out_minus, x, -1.0);
        sys.add(x, self.out_plus, 1.0);
        sys.add(x, self.out_minus, -1.0);
        sys.add(x, self.ctrl_plus, -self.gain);
        sys.add(x, self.ctrl_minus, self.gain);
    }
}

/// Current-controlled current source. `current` senses the (zero-volt)
/// control branch; `gain` scales that sensed current into the output nodes.
#[derive(Debug, Clone)]
pub struct Cccs {
    pub name: String,
    pub out_plus: usize,
    pub out_minus: usize,
    pub ctrl_plus: usize,
    pub ctrl_minus: usize,
    pub current: usize,
    pub gain: f64,
}

impl Identifiable for Cccs {
    fn identifier(&self) -> String {
        format!("F{}", self.name)
    }
}

impl Stamp for Cccs {
    fn stamp(&self, sys: &mut MnaSystem, _ctx: &StepContext, _k: usize) {
        let x = self.current;
        sys.add(self.ctrl_plus, x, 1.0);
        sys.add(self.ctrl_minus, x, -1.0);
        sys.add(self.out_plus, x, self.gain);
        sys.add(self.out_minus, x, -self.gain);
        sys.add(x, self.ctrl_plus, 1.0);
        sys.add(x, self.ctrl_minus, -1.0);
    }
}

/// Current-controlled voltage source. `current` is the output branch
/// current unknown, `control_current` senses the zero-volt control branch.
#[derive(Debug, Clone)]
pub struct Ccvs {
    pub name: String,
    pub out_plus: usize,
    pub out_minus: usize,
    pub ctrl_plus: usize,
    pub ctrl_minus: usize,
    pub current: usize,
    pub control_current: usize,
    pub transresistance: f64,
}

impl Identifiable for Ccvs {
    fn identifier(&self) -> String {
        format!("H{}", self.name)
    }
}

impl Stamp for Ccvs {
    fn stamp(&self, sys: &mut MnaSystem, _ctx: &StepContext, _k: usize) {
        let x = self.current;
        let y = self.control_current;
        sys.add(self.out_plus, x, 1.0);
        sys.add(self.out_minus, x, -1.0);
        sys.add(x, self.out_plus, 1.0);
        sys.add(x, self.out_minus, -1.0);
        sys.add(x, y, -self.transresistance);

        sys.add(self.ctrl_plus, y, 1.0);
        sys.add(self.ctrl_minus, y, -1.0);
        sys.add(y, self.ctrl_plus, 1.0);
        sys.add(y, self.ctrl_minus, -1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::IntegrationRule;

    fn ctx() -> StepContext<'static> {
        StepContext {
            rule: IntegrationRule::BackwardEuler,
            t: 0.0,
            dt: 1e-6,
            dt_prev: 1e-6,
            n: 0,
            x_now: &[],
            x_prev: &[],
        }
    }

    #[test]
    fn vccs_stamps_four_terminal_transconductance() {
        let g = Vccs { name: "1".into(), out_plus: 1, out_minus: 2, ctrl_plus: 3, ctrl_minus: 4, transconductance: 0.1 };
        let mut sys = MnaSystem::new(4);
        g.stamp(&mut sys, &ctx(), 0);
        assert_eq!(sys.get(1, 3), 0.1);
        assert_eq!(sys.get(2, 4), 0.1);
        assert_eq!(sys.get(1, 4), -0.1);
        assert_eq!(sys.get(2, 3), -0.1);
    }

    #[test]
    fn vcvs_couples_branch_and_gain() {
        let e = Vcvs { name: "1".into(), out_plus: 1, out_minus: 0, ctrl_plus: 2, ctrl_minus: 0, current: 3, gain: 2.0 };
        let mut sys = MnaSystem::new(3);
        e.stamp(&mut sys, &ctx(), 0);
        assert_eq!(sys.get(1, 3), 1.0);
        assert_eq!(sys.get(3, 1), 1.0);
        assert_eq!(sys.get(3, 2), -2.0);
    }

    #[test]
    fn cccs_injects_scaled_sensed_current() {
        let f = Cccs { name: "1".into(), out_plus: 1, out_minus: 0, ctrl_plus: 2, ctrl_minus: 0, current: 3, gain: 5.0 };
        let mut sys = MnaSystem::new(3);
        f.stamp(&mut sys, &ctx(), 0);
        assert_eq!(sys.get(1, 3), 5.0);
        assert_eq!(sys.get(3, 2), 1.0);
    }

    #[test]
    fn ccvs_couples_both_branches() {
        let h = Ccvs {
            name: "1".into(),
            out_plus: 1,
            out_minus: 0,
            ctrl_plus: 2,
            ctrl_minus: 0,
            current: 3,
            control_current: 4,
            transresistance: 10.0,
        };
        let mut sys = MnaSystem::new(4);
        h.stamp(&mut sys, &ctx(), 0);
        assert_eq!(sys.get(3, 4), -10.0);
        assert_eq!(sys.get(4, 2), 1.0);
    }
}
