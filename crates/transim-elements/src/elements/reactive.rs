use transim_matrix::MnaSystem;

use super::{Identifiable, IntegrationRule, Stamp, StepContext};

/// Capacitor. Backward/Forward Euler read `x_prev` directly for the companion
/// voltage; only the trapezoidal rule needs persistent scratch, since its
/// update depends on the *previous* companion voltage, not just `x_prev`
/// (the element's "companion scratch").
#[derive(Debug, Clone)]
pub struct Capacitor {
    pub name: String,
    pub plus: usize,
    pub minus: usize,
    pub capacitance: f64,
    pub ic: f64,
    companion: f64,
}

impl Capacitor {
    pub fn new(name: String, plus: usize, minus: usize, capacitance: f64, ic: f64) -> Self {
        Self { name, plus, minus, capacitance, ic, companion: ic }
    }
}

impl Identifiable for Capacitor {
    fn identifier(&self) -> String {
        format!("C{}", self.name)
    }
}

impl Stamp for Capacitor {
    fn on_step_start(&mut self, ctx: &StepContext) {
        if ctx.n == 0 {
            self.companion = self.ic;
            return;
        }
        let v_prev = ctx.x_prev[self.plus] - ctx.x_prev[self.minus];
        match ctx.rule {
            IntegrationRule::Trapezoidal => {
                let g_prev = 2.0 * self.capacitance / ctx.dt_prev;
                let i_prev = g_prev * (v_prev - self.companion);
                let g = 2.0 * self.capacitance / ctx.dt;
                self.companion = v_prev + i_prev / g;
            }
            IntegrationRule::BackwardEuler | IntegrationRule::ForwardEuler => {
                self.companion = v_prev;
            }
        }
    }

    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, _k: usize) {
        let g = match ctx.rule {
            IntegrationRule::Trapezoidal => 2.0 * self.capacitance / ctx.dt,
            IntegrationRule::BackwardEuler | IntegrationRule::ForwardEuler => self.capacitance / ctx.dt,
        };
        sys.stamp_cond(self.plus, self.minus, g);
        sys.stamp_isrc(self.minus, self.plus, g * self.companion);
    }
}

/// Inductor in augmented (branch-current) form, with aux current unknown `current`.
#[derive(Debug, Clone)]
pub struct Inductor {
    pub name: String,
    pub plus: usize,
    pub minus: usize,
    pub current: usize,
    pub inductance: f64,
    pub ic: f64,
}

impl Identifiable for Inductor {
    fn identifier(&self) -> String {
        format!("L{}", self.name)
    }
}

impl Stamp for Inductor {
    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, _k: usize) {
        let (a, b, x) = (self.plus, self.minus, self.current);
        let i_prev = if ctx.n == 0 { self.ic } else { ctx.x_prev[x] };
        let v_prev_a = ctx.x_prev[a];
        let v_prev_b = ctx.x_prev[b];

        sys.add(a, x, 1.0);
        sys.add(b, x, -1.0);

        match ctx.rule {
            IntegrationRule::BackwardEuler => {
                let r = self.inductance / ctx.dt;
                sys.add(x, a, 1.0);
                sys.add(x, b, -1.0);
                sys.add(x, x, r);
                sys.add_rhs(x, r * i_prev);
            }
            IntegrationRule::ForwardEuler => {
                let r = self.inductance / ctx.dt;
                sys.add(x, x, r);
                sys.add_rhs(x, r * i_prev + (v_prev_a - v_prev_b));
            }
            IntegrationRule::Trapezoidal => {
                let r = 2.0 * self.inductance / ctx.dt;
                sys.add(x, a, 1.0);
                sys.add(x, b, -1.0);
                sys.add(x, x, r);
                sys.add_rhs(x, r * i_prev + (v_prev_a - v_prev_b));
            }
        }
    }
}

/// Alternative inductor model as a pure nodal conductance plus companion
/// current, with no branch-current unknown. Under Forward Euler this kind
/// stamps only the companion current (no conductance) and updates that
/// current using the *current* step size
/// rather than the previous one — an inconsistency inherited from the
/// reference engine and kept here rather than silently "fixed". Experimental.
#[derive(Debug, Clone)]
pub struct NodalInductor {
    pub name: String,
    pub plus: usize,
    pub minus: usize,
    pub inductance: f64,
    pub ic: f64,
}

impl Identifiable for NodalInductor {
    fn identifier(&self) -> String {
        format!("L{}", self.name)
    }
}

impl Stamp for NodalInductor {
    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, _k: usize) {
        let (a, b) = (self.plus, self.minus);
        let v_prev = ctx.x_prev[a] - ctx.x_prev[b];

        let i_eq = if ctx.n == 0 {
            self.ic
        } else {
            match ctx.rule {
                IntegrationRule::BackwardEuler => ctx.dt_prev * v_prev / self.inductance,
                IntegrationRule::Trapezoidal => {
                    (ctx.dt_prev + ctx.dt) / (2.0 * self.inductance) * v_prev
                }
                IntegrationRule::ForwardEuler => ctx.dt * v_prev / self.inductance,
            }
        };

        match ctx.rule {
            IntegrationRule::ForwardEuler => {
                sys.stamp_isrc(a, b, i_eq);
            }
            IntegrationRule::BackwardEuler => {
                sys.stamp_cond(a, b, ctx.dt / self.inductance);
                sys.stamp_isrc(a, b, i_eq);
            }
            IntegrationRule::Trapezoidal => {
                sys.stamp_cond(a, b, ctx.dt / (2.0 * self.inductance));
                sys.stamp_isrc(a, b, i_eq);
            }
        }
    }
}
