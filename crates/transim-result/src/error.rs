use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to write trajectory output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
