use transim_matrix::MnaSystem;

use crate::constants::{BJT_ALPHA_F, BJT_ALPHA_R};

use super::diode::diode_linearize;
use super::{Identifiable, Stamp, StepContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Npn,
    Pnp,
}

/// BJT modeled as two back-to-back diode companion stamps with cross-coupled
/// Ebers-Moll current injection. Each junction diode
/// composes `diode_linearize` as a subroutine rather than duplicating the
/// exponential instead of duplicating it.
#[derive(Debug, Clone)]
pub struct Bjt {
    pub name: String,
    pub collector: usize,
    pub base: usize,
    pub emitter: usize,
    pub polarity: Polarity,
}

impl Identifiable for Bjt {
    fn identifier(&self) -> String {
        format!("Q{}", self.name)
    }
}

impl Stamp for Bjt {
    fn is_nonlinear(&self) -> bool {
        true
    }

    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, k: usize) {
        let (c, b, e) = (self.collector, self.base, self.emitter);
        let seed = ctx.is_seed_iteration(k);

        match self.polarity {
            Polarity::Npn => {
                let v_be = if seed { 0.6 } else { ctx.x_now[b] - ctx.x_now[e] };
                let v_bc = if seed { 0.0 } else { ctx.x_now[b] - ctx.x_now[c] };
                let (g1, id1) = diode_linearize(v_be);
                let (g2, id2) = diode_linearize(v_bc);

                sys.stamp_cond(b, e, g1);
                sys.stamp_isrc(b, e, id1);
                sys.stamp_isrc(c, b, BJT_ALPHA_F * id1);
                sys.stamp_g(c, b, b, e, BJT_ALPHA_F * g1);

                sys.stamp_cond(b, c, g2);
                sys.stamp_isrc(b, c, id2);
                sys.stamp_isrc(e, b, BJT_ALPHA_R * id2);
                sys.stamp_g(e, b, b, c, BJT_ALPHA_R * g2);
            }
            Polarity::Pnp => {
                let v_eb = if seed { 0.6 } else { ctx.x_now[e] - ctx.x_now[b] };
                let v_cb = if seed { 0.0 } else { ctx.x_now[c] - ctx.x_now[b] };
                let (g1, id1) = diode_linearize(v_eb);
                let (g2, id2) = diode_linearize(v_cb);

                sys.stamp_cond(e, b, g1);
                sys.stamp_isrc(e, b, id1);
                sys.stamp_isrc(b, c, BJT_ALPHA_F * id1);
                sys.stamp_g(b, c, e, b, BJT_ALPHA_F * g1);

                sys.stamp_cond(c, b, g2);
                sys.stamp_isrc(c, b, id2);
                sys.stamp_isrc(b, e, BJT_ALPHA_R * id2);
                sys.stamp_g(b, e, c, b, BJT_ALPHA_R * g2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::IntegrationRule;

    #[test]
    fn npn_base_emitter_conducts_in_forward_bias() {
        let q = Bjt { name: "1".into(), collector: 1, base: 2, emitter: 3, polarity: Polarity::Npn };
        let mut sys = MnaSystem::new(3);
        let ctx = StepContext {
            rule: IntegrationRule::BackwardEuler,
            t: 0.0,
            dt: 1e-6,
            dt_prev: 1e-6,
            n: 1,
            x_now: &[0.0, 0.0, 0.65, 0.0],
            x_prev: &[0.0, 0.0, 0.0, 0.0],
        };
        q.stamp(&mut sys, &ctx, 1);
        assert!(sys.get(2, 2) > 0.0);
        assert!(sys.get(1, 2) != 0.0);
    }
}
