//! Shared error types for the Blink engine.

use thiserror::Error;

/// A field-specific intent validation failure.
///
/// Produced before anything is signed or submitted; the caller can surface
/// `field` directly against the offending form input. Validation never has
/// side effects.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
	/// Name of the intent field that failed validation.
	pub field: &'static str,
	pub message: String,
}

impl ValidationError {
	pub fn new(field: &'static str, message: impl Into<String>) -> Self {
		Self {
			field,
			message: message.into(),
		}
	}
}
