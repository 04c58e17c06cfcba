use transim_matrix::MnaSystem;

pub mod bjt;
pub mod controlled;
pub mod diode;
pub mod mosfet;
pub mod mutual_inductance;
pub mod opamp;
pub mod reactive;
pub mod resistor;
pub mod sources;

/// Selects the discretization used by companion models of reactive elements.
/// FE is rejected by the engine for circuits with mutual inductance or
/// inductive cutsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationRule {
    BackwardEuler,
    ForwardEuler,
    Trapezoidal,
}

/// Everything a stamp needs to know about where it is in the simulation,
/// beyond the element's own fields.
pub struct StepContext<'a> {
    pub rule: IntegrationRule,
    pub t: f64,
    pub dt: f64,
    pub dt_prev: f64,
    pub n: u64,
    pub x_now: &'a [f64],
    pub x_prev: &'a [f64],
}

impl StepContext<'_> {
    /// True only for the very first Newton iteration of the very first time
    /// step, when diode/MOSFET stamps substitute a fixed seed bias instead of
    /// reading (all-zero) `x_now`.
    pub fn is_seed_iteration(&self, k: usize) -> bool {
        self.n == 0 && k == 0
    }
}

/// A device family's contribution to the MNA system. Implementors read only
/// `x_now`/`x_prev` from the context, never the working matrix, so stamps
/// within one Newton iteration may run in any order.
pub trait Stamp {
    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, k: usize);

    /// Advances companion scratch state at step acceptance. Called exactly
    /// once per step, before the first Newton iteration of that step.
    fn on_step_start(&mut self, _ctx: &StepContext) {}

    fn is_nonlinear(&self) -> bool {
        false
    }
}

/// A trait for elements that have a unique string identifier.
pub trait Identifiable {
    fn identifier(&self) -> String;
}

/// The closed set of element kinds the netlist grammar supports.
#[derive(Debug, Clone)]
pub enum Element {
    Resistor(resistor::Resistor),
    Capacitor(reactive::Capacitor),
    Inductor(reactive::Inductor),
    NodalInductor(reactive::NodalInductor),
    MutualInductance(mutual_inductance::MutualInductance),
    Vccs(controlled::Vccs),
    Vcvs(controlled::Vcvs),
    Cccs(controlled::Cccs),
    Ccvs(controlled::Ccvs),
    OpAmp(opamp::OpAmp),
    CurrentSource(sources::CurrentSource),
    VoltageSource(sources::VoltageSource),
    Diode(diode::Diode),
    Bjt(bjt::Bjt),
    Mosfet(mosfet::Mosfet),
}

macro_rules! dispatch {
    ($self:expr, $method:ident($($args:expr),*)) => {
        match $self {
            Element::Resistor(e) => e.$method($($args),*),
            Element::Capacitor(e) => e.$method($($args),*),
            Element::Inductor(e) => e.$method($($args),*),
            Element::NodalInductor(e) => e.$method($($args),*),
            Element::MutualInductance(e) => e.$method($($args),*),
            Element::Vccs(e) => e.$method($($args),*),
            Element::Vcvs(e) => e.$method($($args),*),
            Element::Cccs(e) => e.$method($($args),*),
            Element::Ccvs(e) => e.$method($($args),*),
            Element::OpAmp(e) => e.$method($($args),*),
            Element::CurrentSource(e) => e.$method($($args),*),
            Element::VoltageSource(e) => e.$method($($args),*),
            Element::Diode(e) => e.$method($($args),*),
            Element::Bjt(e) => e.$method($($args),*),
            Element::Mosfet(e) => e.$method($($args),*),
        }
    };
}

impl Stamp for Element {
    fn stamp(&self, sys: &mut MnaSystem, ctx: &StepContext, k: usize) {
        dispatch!(self, stamp(sys, ctx, k));
    }

    fn on_step_start(&mut self, ctx: &StepContext) {
        dispatch!(self, on_step_start(ctx));
    }

    fn is_nonlinear(&self) -> bool {
        dispatch!(self, is_nonlinear())
    }
}

impl Identifiable for Element {
    fn identifier(&self) -> String {
        dispatch!(self, identifier())
    }
}

macro_rules! from_impl {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Element {
            fn from(item: $ty) -> Self {
                Element::$variant(item)
            }
        }
    };
}

from_impl!(Resistor, resistor::Resistor);
from_impl!(Capacitor, reactive::Capacitor);
from_impl!(Inductor, reactive::Inductor);
from_impl!(NodalInductor, reactive::NodalInductor);
from_impl!(MutualInductance, mutual_inductance::MutualInductance);
from_impl!(Vccs, controlled::Vccs);
from_impl!(Vcvs, controlled::Vcvs);
from_impl!(Cccs, controlled::Cccs);
from_impl!(Ccvs, controlled::Ccvs);
from_impl!(OpAmp, opamp::OpAmp);
from_impl!(CurrentSource, sources::CurrentSource);
from_impl!(VoltageSource, sources::VoltageSource);
from_impl!(Diode, diode::Diode);
from_impl!(Bjt, bjt::Bjt);
from_impl!(Mosfet, mosfet::Mosfet);

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
