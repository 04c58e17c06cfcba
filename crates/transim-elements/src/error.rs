use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// More nodes or elements than the implementation bound.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Unknown kind, undeclared coupled inductor, invalid waveform tag, invalid polarity,
    /// or a netlist line that fails to parse.
    #[error("malformed element on line {line}: {message}")]
    MalformedElement { line: usize, message: String },

    /// Non-positive `T`, `P`, `S`, or `P` above the sample-count bound.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Invalid numeric literal encountered while tokenizing a netlist value.
    #[error("invalid float value: {0}")]
    InvalidFloatValue(String),

    /// Forward Euler was selected for a circuit containing mutual inductance
    /// or a node reachable from ground only through inductive branches.
    #[error("forward Euler is not valid for this circuit: {0}")]
    ForwardEulerUnsupported(String),
}

pub type Result<T> = core::result::Result<T, Error>;
