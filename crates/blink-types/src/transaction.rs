//! Unsigned transaction types produced by the transaction builder.
//!
//! These mirror the shape of an on-chain message without committing to a
//! particular chain SDK: an ordered list of program instructions, each
//! naming the accounts it touches and carrying opaque data bytes.

use serde::{Deserialize, Serialize};

use crate::Address;

/// An account referenced by an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
	pub address: Address,
	pub is_signer: bool,
	pub is_writable: bool,
}

impl AccountMeta {
	/// A writable account that must sign the transaction.
	pub fn signer(address: Address) -> Self {
		Self {
			address,
			is_signer: true,
			is_writable: true,
		}
	}

	/// A writable account that does not sign.
	pub fn writable(address: Address) -> Self {
		Self {
			address,
			is_signer: false,
			is_writable: true,
		}
	}
}

/// A single program instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
	/// The on-chain program that interprets `data`.
	pub program_id: Address,
	/// Accounts the instruction reads or writes, in program-defined order.
	pub accounts: Vec<AccountMeta>,
	/// Program-specific payload.
	pub data: Vec<u8>,
}

/// An unsigned transaction ready for the signer gateway.
///
/// Instruction order is significant and deterministic for a given intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
	/// The account that signs and pays for the transaction.
	pub fee_payer: Address,
	pub instructions: Vec<Instruction>,
}
