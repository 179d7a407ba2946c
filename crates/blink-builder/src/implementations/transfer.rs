//! Value transfer builder.

use blink_types::{Address, Instruction, ValidationError};

use crate::programs::{system_transfer, token_transfer};
use crate::{BuildContext, KindBuilder};

/// Builds plain payment transactions.
///
/// A native transfer when `asset` is unset, a token transfer otherwise.
pub struct TransferBuilder;

impl KindBuilder for TransferBuilder {
	fn value_transfer(&self, ctx: &BuildContext<'_>) -> Result<Instruction, ValidationError> {
		match &ctx.intent.asset {
			None => Ok(system_transfer(ctx.sender, ctx.recipient, ctx.base_units)),
			Some(asset) => {
				let mint: Address = asset
					.parse()
					.map_err(|e| ValidationError::new("asset", format!("{}", e)))?;
				Ok(token_transfer(&mint, ctx.sender, ctx.recipient, ctx.base_units))
			}
		}
	}

	fn extend(&self, _ctx: &BuildContext<'_>) -> Result<Vec<Instruction>, ValidationError> {
		Ok(Vec::new())
	}
}
