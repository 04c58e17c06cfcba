pub use crate::error::Error;
pub type Result<T> = core::result::Result<T, Error>;

pub use crate::circuit::Circuit;
pub use crate::elements::{Element, Identifiable, IntegrationRule, Stamp, StepContext};
pub use crate::symtab::SymbolTable;
pub use crate::utils::parse_value;
pub use crate::waveform::Waveform;
