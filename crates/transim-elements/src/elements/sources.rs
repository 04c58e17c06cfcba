use transim_matrix::MnaSystem;

use crate::waveform::Waveform;

use super::{Identifiable, Stamp, StepContext};

#[derive(Debug, Clone)]
pub struct CurrentSource {
    pub name: String,
    pub plus: usize,
    pub minus: usize,
    pub waveform: Waveform,
}

impl Identifiable for CurrentSource {
    fn identifier(&self) -> String {
        format!("I{}", self.name)
    }
}

impl Stamp for CurrentSource {
    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, _k: usize) {
        sys.stamp_isrc(self.plus, self.minus, self.waveform.value_at(ctx.t));
    }
}

#[derive(Debug, Clone)]
pub struct VoltageSource {
    pub name: String,
    pub plus: usize,
    pub minus: usize,
    pub current: usize,
    pub waveform: Waveform,
}

impl Identifiable for VoltageSource {
    fn identifier(&self) -> String {
        format!("V{}", self.name)
    }
}

impl Stamp for VoltageSource {
    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, _k: usize) {
        sys.add(self.plus, self.current, 1.0);
        sys.add(self.minus, self.current, -1.0);
        sys.add(self.current, self.plus, 1.0);
        sys.add(self.current, self.minus, -1.0);
        sys.set_rhs(self.current, self.waveform.value_at(ctx.t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::IntegrationRule;

    fn ctx(t: f64) -> StepContext<'static> {
        StepContext {
            rule: IntegrationRule::BackwardEuler,
            t,
            dt: 1e-6,
            dt_prev: 1e-6,
            n: 0,
            x_now: &[],
            x_prev: &[],
        }
    }

    #[test]
    fn current_source_injects_waveform_value() {
        let src = CurrentSource { name: "1".into(), plus: 1, minus: 0, waveform: Waveform::Dc(2e-3) };
        let mut sys = MnaSystem::new(1);
        src.stamp(&mut sys, &ctx(0.0), 0);
        assert!((sys.get(1, 2) - 2e-3).abs() < 1e-12);
    }

    #[test]
    fn voltage_source_couples_branch_current() {
        let src = VoltageSource {
            name: "1".into(),
            plus: 1,
            minus: 0,
            current: 2,
            waveform: Waveform::Dc(5.0),
        };
        let mut sys = MnaSystem::new(2);
        src.stamp(&mut sys, &ctx(0.0), 0);
        assert_eq!(sys.get(1, 2), 1.0);
        assert_eq!(sys.get(2, 1), 1.0);
        assert_eq!(sys.get(2, 3), 5.0);
    }
}
