//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a draft enquiry or a credential form has
//!   missing or malformed fields. No network call should follow.
//! - [`InvalidAmount`] thrown when a payment or a fee is not acceptable.
//! - [`InvalidTransition`] thrown when a status change lacks what the target
//!   status requires.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`InvalidWindow`] thrown when a reporting window cannot be placed in
//!   its time zone.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidTransition`]: EngineError::InvalidTransition
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidWindow`]: EngineError::InvalidWindow
use thiserror::Error;

use crate::validation::FieldErrors;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid fields: {0}")]
    Validation(FieldErrors),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid window: {0}")]
    InvalidWindow(String),
}

impl EngineError {
    /// Returns `true` for errors raised by business rules (as opposed to
    /// field-level validation).
    #[must_use]
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::InvalidTransition(_) | Self::KeyNotFound(_)
        )
    }
}
