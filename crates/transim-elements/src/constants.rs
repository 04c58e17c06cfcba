//! Fixed device-model constants. The element library has
//! no `.model`-card customization; every nonlinear device uses these literals.

/// Diode saturation current, in amperes.
pub const DIODE_IS: f64 = 3.775_134_5e-14;
/// Diode thermal voltage, in volts.
pub const DIODE_VT: f64 = 0.025;
/// Diode junction voltage is clamped to this ceiling before evaluating the exponential.
pub const DIODE_V_CLAMP: f64 = 0.9;
/// Seed junction voltage used only on the very first Newton iteration of the very first step.
pub const DIODE_V_SEED: f64 = 0.6;

/// BJT forward common-base current gain.
pub const BJT_ALPHA_F: f64 = 0.99;
/// BJT reverse common-base current gain.
pub const BJT_ALPHA_R: f64 = 0.5;

/// MOSFET transconductance parameter K0, in A/V^2.
pub const MOSFET_K0: f64 = 1e-4;
/// MOSFET channel-length modulation coefficient, in 1/V.
pub const MOSFET_LAMBDA: f64 = 0.05;
/// MOSFET threshold voltage magnitude, in volts (same for N and P, sign differs).
pub const MOSFET_VT0: f64 = 1.0;
/// Seed gate-source voltage used only on the very first Newton iteration of the very first step.
pub const MOSFET_VGS_SEED: f64 = 2.0;
