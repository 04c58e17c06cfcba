use transim_matrix::MnaSystem;

use crate::constants::{MOSFET_K0, MOSFET_LAMBDA, MOSFET_VGS_SEED, MOSFET_VT0};

use super::{Identifiable, Stamp, StepContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    N,
    P,
}

/// Square-law MOSFET. Bulk is not modeled (body tied to
/// source is assumed, as the spec's node list has no fourth terminal).
#[derive(Debug, Clone)]
pub struct Mosfet {
    pub name: String,
    pub drain: usize,
    pub gate: usize,
    pub source: usize,
    pub length: f64,
    pub width: f64,
    pub polarity: Polarity,
}

impl Identifiable for Mosfet {
    fn identifier(&self) -> String {
        format!("M{}", self.name)
    }
}

impl Stamp for Mosfet {
    fn is_nonlinear(&self) -> bool {
        true
    }

    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, k: usize) {
        let seed = ctx.is_seed_iteration(k);
        let sign = match self.polarity {
            Polarity::N => 1.0,
            Polarity::P => -1.0,
        };

        let (drain, source) = if seed {
            (self.drain, self.source)
        } else {
            let raw = ctx.x_now[self.drain] - ctx.x_now[self.source];
            let drain_is_higher = raw >= 0.0;
            match self.polarity {
                Polarity::N if drain_is_higher => (self.drain, self.source),
                Polarity::N => (self.source, self.drain),
                Polarity::P if !drain_is_higher => (self.drain, self.source),
                Polarity::P => (self.source, self.drain),
            }
        };

        let v_gs = if seed {
            MOSFET_VGS_SEED
        } else {
            sign * (ctx.x_now[self.gate] - ctx.x_now[source])
        };
        let v_ds = if seed {
            0.0
        } else {
            sign * (ctx.x_now[drain] - ctx.x_now[source])
        };

        if v_gs <= MOSFET_VT0 {
            return; // cutoff: no stamp
        }

        let km = MOSFET_K0 * self.width / self.length;
        let v_ov = v_gs - MOSFET_VT0;

        let (i_d, g_m, g_ds) = if v_ds > v_ov {
            // saturation
            let i_d = km * v_ov * v_ov * (1.0 + MOSFET_LAMBDA * v_ds);
            let g_m = 2.0 * km * v_ov * (1.0 + MOSFET_LAMBDA * v_ds);
            let g_ds = km * v_ov * v_ov * MOSFET_LAMBDA;
            (i_d, g_m, g_ds)
        } else {
            // triode
            let i_d = km * (2.0 * v_ov * v_ds - v_ds * v_ds);
            let g_m = 2.0 * km * v_ds;
            let g_ds = 2.0 * km * (v_ov - v_ds);
            (i_d, g_m, g_ds)
        };

        let i_eq = sign * (i_d - g_m * v_gs - g_ds * v_ds);

        sys.stamp_g(drain, source, self.gate, source, g_m);
        sys.stamp_cond(drain, source, g_ds);
        sys.stamp_isrc(drain, source, i_eq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::IntegrationRule;

    fn ctx<'a>(x_now: &'a [f64], n: u64, k: usize) -> (StepContext<'a>, usize) {
        (
            StepContext {
                rule: IntegrationRule::BackwardEuler,
                t: 0.0,
                dt: 1e-6,
                dt_prev: 1e-6,
                n,
                x_now,
                x_prev: x_now,
            },
            k,
        )
    }

    #[test]
    fn cutoff_stamps_nothing() {
        let m = Mosfet { name: "1".into(), drain: 1, gate: 2, source: 0, length: 1e-6, width: 1e-6, polarity: Polarity::N };
        let mut sys = MnaSystem::new(2);
        let x_now = [5.0, 0.5, 0.0];
        let (c, k) = ctx(&x_now, 1, 1);
        m.stamp(&mut sys, &c, k);
        assert_eq!(sys.get(1, 1), 0.0);
    }

    #[test]
    fn saturation_conducts_above_threshold() {
        let m = Mosfet { name: "1".into(), drain: 1, gate: 2, source: 0, length: 1e-6, width: 1e-6, polarity: Polarity::N };
        let mut sys = MnaSystem::new(2);
        let x_now = [5.0, 3.0, 0.0];
        let (c, k) = ctx(&x_now, 1, 1);
        m.stamp(&mut sys, &c, k);
        assert!(sys.get(1, 2) != 0.0);
    }

    #[test]
    fn seed_iteration_forces_vgs() {
        let m = Mosfet { name: "1".into(), drain: 1, gate: 2, source: 0, length: 1e-6, width: 1e-6, polarity: Polarity::N };
        let mut sys = MnaSystem::new(2);
        let x_now = [0.0, 0.0, 0.0];
        let (c, k) = ctx(&x_now, 0, 0);
        m.stamp(&mut sys, &c, k);
        // Vgs seeded to 2V (> Vt0=1), so the device should conduct despite x_now being all zero.
        assert!(sys.get(1, 2) != 0.0);
    }
}
