use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Pivot magnitude fell below the threshold during Gauss-Jordan elimination.
    #[error("singular system at column {column}: pivot magnitude {pivot:e}")]
    Singular { column: usize, pivot: f64 },
}

pub type Result<T> = core::result::Result<T, Error>;
