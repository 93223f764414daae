use thiserror::Error;

use crate::request::FIELD_FUEL_EFFICIENCY;

/// Errors raised while turning a submission into a result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmissionsError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("field `{field}` must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("field `{field}` must be a whole non-negative number, got {value:?}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("field `{field}` must be a finite number")]
    NonFinite { field: &'static str },
    #[error("fuel efficiency must not be zero")]
    ZeroFuelEfficiency,
    #[error("emissions estimate is out of range")]
    OutOfRange,
}

impl EmissionsError {
    /// Name of the offending form field, when the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field }
            | Self::InvalidNumber { field, .. }
            | Self::InvalidInteger { field, .. }
            | Self::NonFinite { field } => Some(*field),
            Self::ZeroFuelEfficiency => Some(FIELD_FUEL_EFFICIENCY),
            Self::OutOfRange => None,
        }
    }
}
