//! Transaction construction for the Blink engine.
//!
//! Turns a validated intent into an unsigned chain transaction. Construction
//! is pure: no network, no storage, no clocks. Validation fails fast with a
//! field-specific error naming the offending intent field.
//!
//! Instruction ordering is deterministic for a given intent: the value
//! transfer comes first, the memo (if any) second, and kind-specific
//! instructions follow.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

use blink_types::{Address, BlinkIntent, BlinkKind, Instruction, UnsignedTransaction, ValidationError};

pub mod programs;

/// Re-export implementations
pub mod implementations {
	pub mod nft_mint;
	pub mod token_swap;
	pub mod transfer;
}

use implementations::{nft_mint::NftMintBuilder, token_swap::TokenSwapBuilder, transfer::TransferBuilder};
use programs::{memo_instruction, LAMPORTS_PER_SOL, MAX_MEMO_BYTES};

/// Validated inputs handed to kind builders.
///
/// The recipient has been parsed and the amount converted to base units by
/// the time a kind builder runs.
pub struct BuildContext<'a> {
	pub intent: &'a BlinkIntent,
	pub sender: &'a Address,
	pub recipient: &'a Address,
	pub base_units: u64,
}

/// Trait implemented once per Blink kind.
///
/// Each kind contributes the leading value-transfer instruction and any
/// instructions that follow the memo. Builders report bad kind-specific
/// parameters as field-specific validation errors.
pub trait KindBuilder: Send + Sync {
	/// The value-transfer instruction that leads the transaction.
	fn value_transfer(&self, ctx: &BuildContext<'_>) -> Result<Instruction, ValidationError>;

	/// Kind-specific instructions appended after the transfer and memo.
	fn extend(&self, ctx: &BuildContext<'_>) -> Result<Vec<Instruction>, ValidationError>;
}

/// Builds unsigned transactions from intents, dispatching on the intent kind.
pub struct BuilderService {
	builders: HashMap<BlinkKind, Box<dyn KindBuilder>>,
}

impl BuilderService {
	pub fn new(builders: HashMap<BlinkKind, Box<dyn KindBuilder>>) -> Self {
		Self { builders }
	}

	/// Validates the intent and produces an unsigned transaction.
	pub fn build(
		&self,
		intent: &BlinkIntent,
		sender: &Address,
	) -> Result<UnsignedTransaction, ValidationError> {
		if intent.amount <= Decimal::ZERO {
			return Err(ValidationError::new(
				"amount",
				"amount must be greater than zero",
			));
		}

		let base_units = to_base_units(intent.amount)?;

		let recipient: Address = intent
			.recipient
			.parse()
			.map_err(|e| ValidationError::new("recipient", format!("{}", e)))?;

		if let Some(memo) = &intent.memo {
			if memo.len() > MAX_MEMO_BYTES {
				return Err(ValidationError::new(
					"memo",
					format!("memo exceeds the {} byte on-chain limit", MAX_MEMO_BYTES),
				));
			}
		}

		let builder = self.builders.get(&intent.kind).ok_or_else(|| {
			ValidationError::new("kind", format!("unsupported blink kind: {}", intent.kind))
		})?;

		let ctx = BuildContext {
			intent,
			sender,
			recipient: &recipient,
			base_units,
		};

		let mut instructions = vec![builder.value_transfer(&ctx)?];
		if let Some(memo) = &intent.memo {
			instructions.push(memo_instruction(sender, memo));
		}
		instructions.extend(builder.extend(&ctx)?);

		Ok(UnsignedTransaction {
			fee_payer: sender.clone(),
			instructions,
		})
	}
}

impl Default for BuilderService {
	/// Registers the builders for every supported kind.
	fn default() -> Self {
		let mut builders: HashMap<BlinkKind, Box<dyn KindBuilder>> = HashMap::new();
		builders.insert(BlinkKind::Transfer, Box::new(TransferBuilder));
		builders.insert(BlinkKind::NftMint, Box::new(NftMintBuilder));
		builders.insert(BlinkKind::TokenSwap, Box::new(TokenSwapBuilder));
		Self::new(builders)
	}
}

/// Converts a native-unit amount to base units.
///
/// Rejects amounts with more precision than the network supports and
/// amounts too large for a u64, naming the `amount` field in either case.
fn to_base_units(amount: Decimal) -> Result<u64, ValidationError> {
	let scaled = amount
		.checked_mul(Decimal::from(LAMPORTS_PER_SOL))
		.ok_or_else(|| ValidationError::new("amount", "amount is out of range"))?;

	if !scaled.fract().is_zero() {
		return Err(ValidationError::new(
			"amount",
			"amount has more precision than the network supports",
		));
	}

	scaled
		.to_u64()
		.ok_or_else(|| ValidationError::new("amount", "amount is out of range"))
}
