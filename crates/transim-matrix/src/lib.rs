pub mod error;
pub mod system;

pub use error::Error;
pub use system::{MnaSystem, PIVOT_EPSILON};

pub type Result<T> = core::result::Result<T, Error>;
