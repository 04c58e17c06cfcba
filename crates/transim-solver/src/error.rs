use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Linear solve pivot fell below the threshold at simulated time `t`.
    #[error("singular system at t={t:e}: pivot magnitude {pivot:e}")]
    SingularSystem { t: f64, pivot: f64 },

    /// Newton iteration failed to converge within the restart budget.
    #[error("nonconvergent at t={t:e} after {restarts} restart(s)")]
    Nonconvergent { t: f64, restarts: usize },

    /// A malformed netlist, oversized circuit, or Forward-Euler violation
    /// surfaced by the element library.
    #[error(transparent)]
    Elements(#[from] transim_elements::error::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
