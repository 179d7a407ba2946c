//! NFT mint builder.

use blink_types::{AccountMeta, Address, Instruction, ValidationError};

use crate::programs::{system_transfer, MINT_TAG};
use crate::{BuildContext, KindBuilder};

/// Builds mint transactions: the mint price paid to the recipient, followed
/// by a mint instruction addressed to the collection named by `asset`.
pub struct NftMintBuilder;

impl NftMintBuilder {
	fn collection(ctx: &BuildContext<'_>) -> Result<Address, ValidationError> {
		let asset = ctx.intent.asset.as_deref().ok_or_else(|| {
			ValidationError::new("asset", "nft_mint requires the collection to mint from")
		})?;

		asset
			.parse()
			.map_err(|e| ValidationError::new("asset", format!("{}", e)))
	}
}

impl KindBuilder for NftMintBuilder {
	fn value_transfer(&self, ctx: &BuildContext<'_>) -> Result<Instruction, ValidationError> {
		// Validate the collection before emitting anything, so a bad asset
		// fails the build with no partial output.
		Self::collection(ctx)?;
		Ok(system_transfer(ctx.sender, ctx.recipient, ctx.base_units))
	}

	fn extend(&self, ctx: &BuildContext<'_>) -> Result<Vec<Instruction>, ValidationError> {
		let collection = Self::collection(ctx)?;

		let mut data = Vec::with_capacity(9);
		data.push(MINT_TAG);
		data.extend_from_slice(&ctx.base_units.to_le_bytes());

		Ok(vec![Instruction {
			program_id: collection,
			accounts: vec![
				AccountMeta::signer(ctx.sender.clone()),
				AccountMeta::writable(ctx.recipient.clone()),
			],
			data,
		}])
	}
}
