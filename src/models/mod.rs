pub mod batch;
pub mod diagnosis;
pub mod enums;
pub mod form;
pub mod imaging;
pub mod measurements;
pub mod pagination;
pub mod patient;
pub mod service;

pub use batch::*;
pub use diagnosis::*;
pub use enums::*;
pub use form::*;
pub use imaging::*;
pub use measurements::*;
pub use pagination::*;
pub use patient::*;
pub use service::*;

use thiserror::Error;

/// Local, pre-submission rejection. Never reaches the network layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select at least one symptom")]
    EmptySymptoms,

    #[error("Please select a file")]
    NoFileSelected,

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Unknown {panel} key: {key}")]
    UnknownMeasurement { panel: String, key: String },

    #[error("Malformed batch row {row}: {reason}")]
    MalformedRow { row: u32, reason: String },

    #[error("Malformed batch result: {0}")]
    MalformedBatch(String),
}
