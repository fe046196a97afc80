//! Classification of historical (executed or rejected) transactions.

use alloy_primitives::U256;

use crate::config::NATIVE_CURRENCY;
use crate::decode::decode_known_call;
use crate::format::{format_ether, format_units};
use crate::model::{HistoryTransaction, MultisigTransaction, Transfer};

/// Fields derived from one history feed entry.
///
/// `source` carries the full address as the feed serves it; display
/// layers truncate it (`format::truncate_hex`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HistoryView {
    pub source: String,
    pub currency: String,
    pub value: String,
    pub request: String,
}

/// Derives source, currency, value and request for a history entry.
///
/// Dispatches on the feed tag to one of three extraction routines; every
/// routine degrades to a fallback string instead of failing.
pub fn describe_history(tx: &HistoryTransaction) -> HistoryView {
    match tx {
        HistoryTransaction::Ethereum {
            from, transfers, ..
        } => HistoryView {
            source: from.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
            currency: transfer_currency(transfers.first(), NATIVE_CURRENCY),
            value: transfer_value(transfers.first()),
            request: "Received".to_string(),
        },
        HistoryTransaction::Multisig(tx) => HistoryView {
            source: tx
                .confirmations
                .first()
                .map(|c| c.owner.to_string())
                .unwrap_or_else(|| "-".to_string()),
            currency: transfer_currency(tx.transfers.first(), NATIVE_CURRENCY),
            // Multisig rows report the native amount of the first
            // transfer.
            value: format_ether(
                tx.transfers
                    .first()
                    .map(Transfer::amount)
                    .unwrap_or(U256::ZERO),
            ),
            request: multisig_request(tx),
        },
        HistoryTransaction::Module {
            module, transfers, ..
        } => HistoryView {
            source: "-".to_string(),
            currency: transfer_currency(transfers.first(), ""),
            value: transfer_value(transfers.first()),
            request: module.to_string(),
        },
    }
}

/// Token amount of a transfer formatted with its declared decimals,
/// defaulting to 18 when the token does not declare any.
fn transfer_value(transfer: Option<&Transfer>) -> String {
    let Some(transfer) = transfer else {
        return format_ether(U256::ZERO);
    };
    match transfer.token_address {
        // Native transfer.
        None => format_ether(transfer.amount()),
        Some(_) => {
            let decimals = transfer
                .token_info
                .as_ref()
                .and_then(|info| info.decimals)
                .unwrap_or(18);
            format_units(transfer.amount(), decimals)
        }
    }
}

fn transfer_currency(transfer: Option<&Transfer>, native_label: &str) -> String {
    match transfer.and_then(|t| t.token_address) {
        None => native_label.to_string(),
        Some(_) => transfer
            .and_then(|t| t.token_info.as_ref())
            .and_then(|info| info.symbol.clone())
            .unwrap_or_default(),
    }
}

/// Request label for an executed multisig transaction: decoded function
/// name, else "Sent" for plain value transfers, else the rejection
/// placeholder convention.
fn multisig_request(tx: &MultisigTransaction) -> String {
    if let Some(data) = tx.data_bytes() {
        return match decode_known_call(&data) {
            Some(name) => name.to_string(),
            None => "Could not decode".to_string(),
        };
    }
    if tx.amount() > U256::ZERO {
        "Sent".to_string()
    } else {
        // No data and no value is the rejection placeholder shape.
        "Rejection".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn ethereum_token_transfer_uses_declared_decimals() {
        let tx: HistoryTransaction = serde_json::from_value(json!({
            "txType": "ETHEREUM_TRANSACTION",
            "from": "0x1111111111111111111111111111111111111111",
            "transfers": [{
                "value": "1000000",
                "tokenAddress": "0x4ecaba5870353805a9f068101a40e0f32ed605c6",
                "tokenInfo": {"symbol": "USDT", "decimals": 6}
            }]
        }))
        .unwrap();

        let view = describe_history(&tx);
        assert_eq!(view.value, "1.0");
        assert_eq!(view.currency, "USDT");
        assert_eq!(view.request, "Received");
        // The sender passes through untruncated.
        assert_eq!(
            view.source.to_lowercase(),
            "0x1111111111111111111111111111111111111111"
        );
    }

    #[test]
    fn ethereum_native_transfer_reports_xdai() {
        let tx: HistoryTransaction = serde_json::from_value(json!({
            "txType": "ETHEREUM_TRANSACTION",
            "from": "0x1111111111111111111111111111111111111111",
            "transfers": [{"value": "1500000000000000000"}]
        }))
        .unwrap();

        let view = describe_history(&tx);
        assert_eq!(view.value, "1.5");
        assert_eq!(view.currency, "xDai");
    }

    #[test]
    fn token_without_decimals_defaults_to_eighteen() {
        let tx: HistoryTransaction = serde_json::from_value(json!({
            "txType": "ETHEREUM_TRANSACTION",
            "transfers": [{
                "value": "1000000000000000000",
                "tokenAddress": "0xd4fdec44db9d44b8f2b6d529620f9c0c7066a2c1",
                "tokenInfo": {"symbol": "wxHOPR"}
            }]
        }))
        .unwrap();

        let view = describe_history(&tx);
        assert_eq!(view.value, "1.0");
        assert_eq!(view.source, "-");
    }

    #[test]
    fn multisig_history_decodes_request() {
        let transfer_data = crate::calldata::unwrap(
            &crate::config::Addresses::default(),
            alloy_primitives::U256::from(1u64),
        );
        let tx: HistoryTransaction = serde_json::from_value(json!({
            "txType": "MULTISIG_TRANSACTION",
            "safe": "0x2222222222222222222222222222222222222222",
            "to": "0xd4fdec44db9d44b8f2b6d529620f9c0c7066a2c1",
            "value": "0",
            "data": format!("0x{}", hex::encode(&transfer_data)),
            "nonce": 3,
            "confirmationsRequired": 1,
            "confirmations": [{"owner": "0x1111111111111111111111111111111111111111"}]
        }))
        .unwrap();

        let view = describe_history(&tx);
        assert_eq!(view.request, "transfer");
        assert_eq!(view.currency, "xDai");
        assert_eq!(view.value, "0.0");
    }

    #[test]
    fn multisig_history_without_data_is_sent_or_rejection() {
        let mut base = json!({
            "txType": "MULTISIG_TRANSACTION",
            "safe": "0x2222222222222222222222222222222222222222",
            "to": "0x2222222222222222222222222222222222222222",
            "value": "5",
            "nonce": 3,
            "confirmationsRequired": 1
        });

        let sent: HistoryTransaction = serde_json::from_value(base.clone()).unwrap();
        assert_eq!(describe_history(&sent).request, "Sent");

        base["value"] = json!("0");
        let rejection: HistoryTransaction = serde_json::from_value(base).unwrap();
        assert_eq!(describe_history(&rejection).request, "Rejection");
    }

    #[test]
    fn module_history_passes_module_through() {
        let module: Address = "0x683d3859dfb5a8c0f00703f9466f4cc09a6431d2".parse().unwrap();
        let tx: HistoryTransaction = serde_json::from_value(json!({
            "txType": "MODULE_TRANSACTION",
            "module": module.to_string(),
            "transfers": [{
                "value": "2000000",
                "tokenAddress": "0x4ecaba5870353805a9f068101a40e0f32ed605c6",
                "tokenInfo": {"symbol": "USDT", "decimals": 6}
            }]
        }))
        .unwrap();

        let view = describe_history(&tx);
        assert_eq!(view.source, "-");
        assert_eq!(view.value, "2.0");
        assert_eq!(view.currency, "USDT");
        assert_eq!(view.request, module.to_string());
    }
}
