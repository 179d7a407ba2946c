//! Token swap builder.

use blink_types::{AccountMeta, Address, Instruction, ValidationError};

use crate::programs::{system_transfer, SWAP_TAG};
use crate::{BuildContext, KindBuilder};

/// Builds swap transactions: funding transferred to the pool recipient,
/// followed by a swap instruction addressed to the pool named by `asset`.
pub struct TokenSwapBuilder;

impl TokenSwapBuilder {
	fn pool(ctx: &BuildContext<'_>) -> Result<Address, ValidationError> {
		let asset = ctx.intent.asset.as_deref().ok_or_else(|| {
			ValidationError::new("asset", "token_swap requires the target asset")
		})?;

		asset
			.parse()
			.map_err(|e| ValidationError::new("asset", format!("{}", e)))
	}
}

impl KindBuilder for TokenSwapBuilder {
	fn value_transfer(&self, ctx: &BuildContext<'_>) -> Result<Instruction, ValidationError> {
		Self::pool(ctx)?;
		Ok(system_transfer(ctx.sender, ctx.recipient, ctx.base_units))
	}

	fn extend(&self, ctx: &BuildContext<'_>) -> Result<Vec<Instruction>, ValidationError> {
		let pool = Self::pool(ctx)?;

		let mut data = Vec::with_capacity(9);
		data.push(SWAP_TAG);
		data.extend_from_slice(&ctx.base_units.to_le_bytes());

		Ok(vec![Instruction {
			program_id: pool,
			accounts: vec![
				AccountMeta::signer(ctx.sender.clone()),
				AccountMeta::writable(ctx.recipient.clone()),
			],
			data,
		}])
	}
}
