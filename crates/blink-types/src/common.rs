//! Identifier newtypes shared across the Blink engine.
//!
//! Addresses are validated on construction; signatures and Blink ids are
//! opaque strings assigned by the network.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length in bytes of a decoded on-chain address.
pub const ADDRESS_LEN: usize = 32;

/// Error produced when a string does not decode to a valid address.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct AddressError(String);

/// A validated on-chain address.
///
/// Stored as its base58 string form; construction verifies the encoding
/// decodes to exactly 32 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl FromStr for Address {
	type Err = AddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let decoded = bs58::decode(s)
			.into_vec()
			.map_err(|e| AddressError(format!("not valid base58: {}", e)))?;

		if decoded.len() != ADDRESS_LEN {
			return Err(AddressError(format!(
				"expected {} bytes, got {}",
				ADDRESS_LEN,
				decoded.len()
			)));
		}

		Ok(Address(s.to_string()))
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Signature returned by the network when a submission is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkSignature(pub String);

impl NetworkSignature {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NetworkSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Unique identifier of a Blink record.
///
/// A Blink only exists once the network has accepted its submission, so the
/// id is derived from the submission signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlinkId(pub String);

impl BlinkId {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&NetworkSignature> for BlinkId {
	fn from(signature: &NetworkSignature) -> Self {
		BlinkId(signature.0.clone())
	}
}

impl fmt::Display for BlinkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
