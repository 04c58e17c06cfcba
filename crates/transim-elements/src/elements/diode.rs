use transim_matrix::MnaSystem;

use crate::constants::{DIODE_IS, DIODE_VT, DIODE_V_CLAMP, DIODE_V_SEED};

use super::{Identifiable, Stamp, StepContext};

/// Linearizes the diode exponential at junction voltage `v`, returning
/// `(conductance, linearized_current)` where `linearized_current` already
/// carries the non-tangent remainder (`i_d - g*v`). Shared with BJT (Q) and
/// MOSFET (M), which compose a diode stamp as a subroutine.
pub fn diode_linearize(v: f64) -> (f64, f64) {
    let v = v.min(DIODE_V_CLAMP);
    let exp = (v / DIODE_VT).exp();
    let i_d_full = DIODE_IS * (exp - 1.0);
    let g = (DIODE_IS / DIODE_VT) * exp;
    let id = i_d_full - g * v;
    (g, id)
}

#[derive(Debug, Clone)]
pub struct Diode {
    pub name: String,
    pub anode: usize,
    pub cathode: usize,
}

impl Identifiable for Diode {
    fn identifier(&self) -> String {
        format!("D{}", self.name)
    }
}

impl Stamp for Diode {
    fn is_nonlinear(&self) -> bool {
        true
    }

    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, k: usize) {
        let v = if ctx.is_seed_iteration(k) {
            DIODE_V_SEED
        } else {
            ctx.x_now[self.anode] - ctx.x_now[self.cathode]
        };
        let (g, id) = diode_linearize(v);
        sys.stamp_cond(self.anode, self.cathode, g);
        sys.stamp_isrc(self.anode, self.cathode, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linearization_matches_shockley_tangent() {
        let (g, id) = diode_linearize(0.6);
        let exp = (0.6_f64 / DIODE_VT).exp();
        let i_full = DIODE_IS * (exp - 1.0);
        assert!((g - (DIODE_IS / DIODE_VT) * exp).abs() < 1e-20);
        assert!(((id + g * 0.6) - i_full).abs() < 1e-15);
    }

    #[test]
    fn clamps_voltage_above_ceiling() {
        let (g_clamped, _) = diode_linearize(5.0);
        let (g_at_clamp, _) = diode_linearize(DIODE_V_CLAMP);
        assert!((g_clamped - g_at_clamp).abs() < 1e-20);
    }

    #[test]
    fn seeds_bias_on_first_iteration_of_first_step() {
        let d = Diode { name: "1".into(), anode: 1, cathode: 0 };
        let mut sys = MnaSystem::new(1);
        let ctx = StepContext {
            rule: crate::elements::IntegrationRule::BackwardEuler,
            t: 0.0,
            dt: 1e-6,
            dt_prev: 1e-6,
            n: 0,
            x_now: &[0.0, 0.0],
            x_prev: &[0.0, 0.0],
        };
        d.stamp(&mut sys, &ctx, 0);
        let (g_seed, _) = diode_linearize(DIODE_V_SEED);
        assert!((sys.get(1, 1) - g_seed).abs() < 1e-20);
    }
}
