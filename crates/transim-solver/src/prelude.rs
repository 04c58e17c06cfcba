pub use crate::error::Error;
pub type Result<T> = core::result::Result<T, Error>;

pub use crate::config::SolverConfig;
pub use crate::newton::Newton;
pub use crate::transient::{run, Sample, TransientParams, TransientReport};
