//! Serde data model for the Safe transaction-relay REST API.
//!
//! These types mirror the relay's wire format (camelCase JSON). The relay
//! is treated as external truth; the only client-side check is
//! [`MultisigTransaction::validate`], which flags records that could not
//! have come from a well-formed feed so the ingest path can skip them
//! instead of classifying garbage.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::parse_amount;

/// A malformed record in the relay feed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("transaction requires zero confirmations")]
    ZeroThreshold,
    #[error("{got} confirmations exceed the required {required}")]
    TooManyConfirmations { got: usize, required: u64 },
    #[error("transaction data is not valid hex: {0}")]
    MalformedData(String),
}

/// One collected owner signature. Insertion order is signing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub owner: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_type: Option<String>,
}

/// A decoded call parameter inside [`DataDecoded`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: serde_json::Value,
}

/// The relay's own structured decoding of a transaction's call data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDecoded {
    pub method: String,
    #[serde(default)]
    pub parameters: Vec<DecodedParameter>,
}

impl DataDecoded {
    /// Returns parameter `index` as an address, if it parses as one.
    pub fn address_param(&self, index: usize) -> Option<Address> {
        self.parameters
            .get(index)?
            .value
            .as_str()?
            .parse::<Address>()
            .ok()
    }

    /// Returns parameter `index` as its raw string value.
    pub fn str_param(&self, index: usize) -> Option<&str> {
        self.parameters.get(index)?.value.as_str()
    }
}

/// Token metadata nested inside a [`Transfer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

/// A native or token transfer attached to a history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_info: Option<TokenInfo>,
}

impl Transfer {
    pub fn amount(&self) -> U256 {
        self.value.as_deref().map(parse_amount).unwrap_or(U256::ZERO)
    }
}

/// A proposed or executed multisig transaction as served by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigTransaction {
    pub safe: Address,
    pub to: Address,
    /// Native amount as a decimal string.
    pub value: String,
    /// 0x-prefixed call data, absent for plain value transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default)]
    pub operation: u8,
    pub nonce: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_tx_hash: Option<String>,
    #[serde(default)]
    pub is_executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_date: Option<String>,
    pub confirmations_required: u64,
    #[serde(default)]
    pub confirmations: Vec<Confirmation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_decoded: Option<DataDecoded>,
    /// Present when the record comes from the history feed.
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

impl MultisigTransaction {
    /// Native amount carried by the transaction.
    pub fn amount(&self) -> U256 {
        parse_amount(&self.value)
    }

    /// Decoded call data bytes, `None` when there is no data.
    pub fn data_bytes(&self) -> Option<Vec<u8>> {
        let data = self.data.as_deref()?;
        let stripped = data.strip_prefix("0x").unwrap_or(data);
        if stripped.is_empty() {
            return None;
        }
        hex::decode(stripped).ok()
    }

    /// Whether `owner` has already signed this transaction.
    pub fn signed_by(&self, owner: Address) -> bool {
        self.confirmations.iter().any(|c| c.owner == owner)
    }

    /// Checks invariants a well-formed relay feed upholds.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.confirmations_required == 0 {
            return Err(FeedError::ZeroThreshold);
        }
        if self.confirmations.len() as u64 > self.confirmations_required {
            return Err(FeedError::TooManyConfirmations {
                got: self.confirmations.len(),
                required: self.confirmations_required,
            });
        }
        if let Some(data) = self.data.as_deref() {
            let stripped = data.strip_prefix("0x").unwrap_or(data);
            if !stripped.is_empty() && hex::decode(stripped).is_err() {
                return Err(FeedError::MalformedData(data.to_string()));
            }
        }
        Ok(())
    }
}

/// A history feed entry, tagged by the relay with `txType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "txType")]
pub enum HistoryTransaction {
    /// An incoming transfer executed directly on chain.
    #[serde(rename = "ETHEREUM_TRANSACTION", rename_all = "camelCase")]
    Ethereum {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<Address>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tx_hash: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_date: Option<String>,
        #[serde(default)]
        transfers: Vec<Transfer>,
    },
    /// A multisig transaction, executed or rejected.
    #[serde(rename = "MULTISIG_TRANSACTION")]
    Multisig(MultisigTransaction),
    /// A transaction executed through an enabled module.
    #[serde(rename = "MODULE_TRANSACTION", rename_all = "camelCase")]
    Module {
        module: Address,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_date: Option<String>,
        #[serde(default)]
        transfers: Vec<Transfer>,
    },
}

impl HistoryTransaction {
    pub fn transfers(&self) -> &[Transfer] {
        match self {
            Self::Ethereum { transfers, .. } => transfers,
            Self::Multisig(tx) => &tx.transfers,
            Self::Module { transfers, .. } => transfers,
        }
    }
}

/// Safe metadata as served by `/api/v1/safes/{address}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeInfo {
    pub address: Address,
    pub nonce: u64,
    pub threshold: u64,
    pub owners: Vec<Address>,
    #[serde(default)]
    pub modules: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_handler: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl SafeInfo {
    /// A threshold of one lets a single owner propose-and-execute without
    /// collecting further signatures.
    pub fn owner_can_skip_proposal(&self) -> bool {
        self.threshold == 1
    }
}

/// An address authorized to propose on behalf of a safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeDelegate {
    pub delegate: Address,
    pub delegator: Address,
    #[serde(default)]
    pub label: String,
}

/// Token metadata from `/api/v1/tokens/{address}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Paginated relay response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn owner() -> Address {
        "0x1111111111111111111111111111111111111111".parse().unwrap()
    }

    #[test]
    fn deserializes_pending_transaction() {
        let tx: MultisigTransaction = serde_json::from_value(json!({
            "safe": "0x2222222222222222222222222222222222222222",
            "to": "0xd057604a14982fe8d88c5fc25aac3267ea142a08",
            "value": "0",
            "data": "0xa9059cbb",
            "operation": 0,
            "nonce": 7,
            "safeTxHash": "0xdead",
            "isExecuted": false,
            "confirmationsRequired": 2,
            "confirmations": [{"owner": "0x1111111111111111111111111111111111111111"}],
            "dataDecoded": {"method": "transfer", "parameters": []}
        }))
        .unwrap();

        assert_eq!(tx.nonce, 7);
        assert_eq!(tx.confirmations_required, 2);
        assert!(tx.signed_by(owner()));
        assert_eq!(tx.data_bytes(), Some(vec![0xa9, 0x05, 0x9c, 0xbb]));
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_threshold() {
        let tx: MultisigTransaction = serde_json::from_value(json!({
            "safe": "0x2222222222222222222222222222222222222222",
            "to": "0x2222222222222222222222222222222222222222",
            "value": "0",
            "nonce": 0,
            "confirmationsRequired": 0
        }))
        .unwrap();

        assert_eq!(tx.validate(), Err(FeedError::ZeroThreshold));
    }

    #[test]
    fn validate_rejects_overfull_confirmations() {
        let tx: MultisigTransaction = serde_json::from_value(json!({
            "safe": "0x2222222222222222222222222222222222222222",
            "to": "0x2222222222222222222222222222222222222222",
            "value": "0",
            "nonce": 0,
            "confirmationsRequired": 1,
            "confirmations": [
                {"owner": "0x1111111111111111111111111111111111111111"},
                {"owner": "0x3333333333333333333333333333333333333333"}
            ]
        }))
        .unwrap();

        assert!(matches!(
            tx.validate(),
            Err(FeedError::TooManyConfirmations { got: 2, required: 1 })
        ));
    }

    #[test]
    fn history_feed_dispatches_on_tx_type() {
        let page: Page<HistoryTransaction> = serde_json::from_value(json!({
            "count": 2,
            "results": [
                {
                    "txType": "ETHEREUM_TRANSACTION",
                    "from": "0x1111111111111111111111111111111111111111",
                    "transfers": [{"value": "1000000"}]
                },
                {
                    "txType": "MODULE_TRANSACTION",
                    "module": "0x683d3859dfb5a8c0f00703f9466f4cc09a6431d2",
                    "transfers": []
                }
            ]
        }))
        .unwrap();

        assert_eq!(page.results.len(), 2);
        assert!(matches!(page.results[0], HistoryTransaction::Ethereum { .. }));
        assert!(matches!(page.results[1], HistoryTransaction::Module { .. }));
    }

    #[test]
    fn empty_data_counts_as_no_data() {
        let tx: MultisigTransaction = serde_json::from_value(json!({
            "safe": "0x2222222222222222222222222222222222222222",
            "to": "0x2222222222222222222222222222222222222222",
            "value": "0",
            "data": "0x",
            "nonce": 1,
            "confirmationsRequired": 1
        }))
        .unwrap();

        assert_eq!(tx.data_bytes(), None);
    }
}
