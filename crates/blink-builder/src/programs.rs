//! Well-known program ids and instruction encoding helpers.

use blink_types::{AccountMeta, Address, Instruction};

/// System program handling native value transfers.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Canonical on-chain memo program.
pub const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// Token program handling non-native asset transfers.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Base units per network-native unit.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Maximum memo payload accepted by the memo program, in bytes.
pub const MAX_MEMO_BYTES: usize = 566;

/// System program instruction tag for a value transfer.
const SYSTEM_TRANSFER_TAG: u32 = 2;

/// Token program instruction tag for a transfer.
const TOKEN_TRANSFER_TAG: u8 = 3;

/// Instruction tag for a kind-specific mint.
pub(crate) const MINT_TAG: u8 = 1;

/// Instruction tag for a kind-specific swap.
pub(crate) const SWAP_TAG: u8 = 2;

fn program_address(id: &str) -> Address {
	id.parse().expect("well-known program id")
}

/// Native value transfer: tag 2 followed by a little-endian u64 amount.
pub fn system_transfer(from: &Address, to: &Address, base_units: u64) -> Instruction {
	let mut data = Vec::with_capacity(12);
	data.extend_from_slice(&SYSTEM_TRANSFER_TAG.to_le_bytes());
	data.extend_from_slice(&base_units.to_le_bytes());

	Instruction {
		program_id: program_address(SYSTEM_PROGRAM_ID),
		accounts: vec![
			AccountMeta::signer(from.clone()),
			AccountMeta::writable(to.clone()),
		],
		data,
	}
}

/// Token transfer: tag 3 followed by a little-endian u64 amount.
pub fn token_transfer(mint: &Address, from: &Address, to: &Address, base_units: u64) -> Instruction {
	let mut data = Vec::with_capacity(9);
	data.push(TOKEN_TRANSFER_TAG);
	data.extend_from_slice(&base_units.to_le_bytes());

	Instruction {
		program_id: program_address(TOKEN_PROGRAM_ID),
		accounts: vec![
			AccountMeta::signer(from.clone()),
			AccountMeta::writable(to.clone()),
			AccountMeta::writable(mint.clone()),
		],
		data,
	}
}

/// Memo instruction: the raw UTF-8 payload, signed by the sender.
pub fn memo_instruction(signer: &Address, memo: &str) -> Instruction {
	Instruction {
		program_id: program_address(MEMO_PROGRAM_ID),
		accounts: vec![AccountMeta::signer(signer.clone())],
		data: memo.as_bytes().to_vec(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_program_ids_are_valid_addresses() {
		for id in [SYSTEM_PROGRAM_ID, MEMO_PROGRAM_ID, TOKEN_PROGRAM_ID] {
			assert!(id.parse::<Address>().is_ok(), "bad program id: {}", id);
		}
	}

	#[test]
	fn test_system_transfer_encoding() {
		let from: Address = SYSTEM_PROGRAM_ID.parse().unwrap();
		let to: Address = TOKEN_PROGRAM_ID.parse().unwrap();

		let ix = system_transfer(&from, &to, 1_500_000_000);

		let mut expected = vec![2, 0, 0, 0];
		expected.extend_from_slice(&1_500_000_000u64.to_le_bytes());
		assert_eq!(ix.data, expected);
		assert!(ix.accounts[0].is_signer);
		assert!(!ix.accounts[1].is_signer);
	}
}
