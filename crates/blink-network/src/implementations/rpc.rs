//! JSON-RPC network implementation.
//!
//! Queries a Solana-style endpoint with `getSignatureStatuses`. The answer
//! shape is a `value` array aligned with the requested signatures; a null
//! entry means the network has no record of the signature yet.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{NetworkError, NetworkInterface, TxStatus};
use blink_types::NetworkSignature;

pub struct RpcNetwork {
	client: reqwest::Client,
	url: String,
}

impl RpcNetwork {
	pub fn new(url: String) -> Self {
		Self {
			client: reqwest::Client::new(),
			url,
		}
	}

	async fn call(&self, method: &str, params: Value) -> Result<Value, NetworkError> {
		let body = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params,
		});

		let response = self
			.client
			.post(&self.url)
			.json(&body)
			.send()
			.await
			.map_err(|e| NetworkError::Rpc(e.to_string()))?;

		let payload: Value = response
			.json()
			.await
			.map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;

		if let Some(err) = payload.get("error") {
			return Err(NetworkError::Rpc(err.to_string()));
		}

		payload
			.get("result")
			.cloned()
			.ok_or_else(|| NetworkError::InvalidResponse("missing result field".to_string()))
	}
}

#[async_trait]
impl NetworkInterface for RpcNetwork {
	async fn get_status(&self, signature: &NetworkSignature) -> Result<TxStatus, NetworkError> {
		let result = self
			.call(
				"getSignatureStatuses",
				json!([[signature.0], {"searchTransactionHistory": true}]),
			)
			.await?;

		let entry = result
			.get("value")
			.and_then(|v| v.as_array())
			.and_then(|v| v.first())
			.ok_or_else(|| {
				NetworkError::InvalidResponse("malformed getSignatureStatuses value".to_string())
			})?;

		// Null entry: the network does not know the signature yet
		if entry.is_null() {
			return Ok(TxStatus::Pending);
		}

		if entry.get("err").map(|e| !e.is_null()).unwrap_or(false) {
			debug!(signature = %signature, "network reports transaction error");
			return Ok(TxStatus::Rejected);
		}

		let confirmation = entry
			.get("confirmationStatus")
			.and_then(|v| v.as_str())
			.unwrap_or("");

		if confirmation == "finalized" {
			Ok(TxStatus::Finalized)
		} else {
			Ok(TxStatus::Pending)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse_entry(entry: Value) -> TxStatus {
		// Mirrors the match in get_status over a single value entry
		if entry.is_null() {
			return TxStatus::Pending;
		}
		if entry.get("err").map(|e| !e.is_null()).unwrap_or(false) {
			return TxStatus::Rejected;
		}
		match entry.get("confirmationStatus").and_then(|v| v.as_str()) {
			Some("finalized") => TxStatus::Finalized,
			_ => TxStatus::Pending,
		}
	}

	#[test]
	fn test_null_entry_is_pending() {
		assert_eq!(parse_entry(Value::Null), TxStatus::Pending);
	}

	#[test]
	fn test_error_entry_is_rejected() {
		let entry = json!({"err": {"InstructionError": [0, "Custom"]}, "confirmationStatus": "finalized"});
		assert_eq!(parse_entry(entry), TxStatus::Rejected);
	}

	#[test]
	fn test_confirmed_is_still_pending() {
		let entry = json!({"err": null, "confirmationStatus": "confirmed"});
		assert_eq!(parse_entry(entry), TxStatus::Pending);
	}

	#[test]
	fn test_finalized() {
		let entry = json!({"err": null, "confirmationStatus": "finalized"});
		assert_eq!(parse_entry(entry), TxStatus::Finalized);
	}
}
