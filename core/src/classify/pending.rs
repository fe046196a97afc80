//! Classification of pending (not yet executed) multisig transactions.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::config::Addresses;
use crate::decode::decode_known_call;
use crate::format::truncate_address;
use crate::model::MultisigTransaction;
use crate::{calldata, format};

/// The next step the viewing owner has to take for a pending
/// transaction, relative to their own address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserAction {
    Sign,
    Execute,
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sign => write!(f, "SIGN"),
            Self::Execute => write!(f, "EXECUTE"),
        }
    }
}

/// Safe-level context needed to recognize module-configuration payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeContext {
    pub safe_address: Option<Address>,
    pub module_address: Option<Address>,
}

/// Derives the action `owner` must take for `tx`, or `None` when there
/// is nothing for them to do.
///
/// When exactly one signature is missing the answer is `Execute` rather
/// than `Sign`: the owner's forthcoming signature satisfies the
/// threshold, so they can sign and execute in one step.
pub fn user_action(tx: &MultisigTransaction, owner: Option<Address>) -> Option<UserAction> {
    let owner = owner?;

    if tx.confirmations.len() as u64 >= tx.confirmations_required {
        return Some(UserAction::Execute);
    }

    if tx.signed_by(owner) {
        // Under threshold and already signed; wait for the others.
        return None;
    }

    if tx.confirmations_required - tx.confirmations.len() as u64 == 1 {
        return Some(UserAction::Execute);
    }

    Some(UserAction::Sign)
}

/// Human-readable explanation of what a pending transaction will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestLabel {
    /// xHOPR `transferAndCall` into the wrapper with no extra data.
    WrapToWxHopr,
    /// wxHOPR `transfer` back to the wrapper.
    UnwrapToXHopr,
    /// Registering the safe's recipient interface in the ERC-1820
    /// registry.
    AddSafeToErc1820Registry,
    /// The module-configuration batch for one of the safe's delegate
    /// nodes, matched byte-for-byte against the reconstructed payload.
    ConfigureModuleForNode(Address),
    /// Fallback ABI decode against the known interface set succeeded.
    Decoded(String),
    /// No call data, non-zero native value.
    Sent,
    /// Self-addressed, zero value, no data. By relay convention this is
    /// a rejection placeholder; the shape is a heuristic, not a tag, so
    /// it stays a distinct variant callers can treat as inferred.
    Rejection,
    CouldNotDecode,
    Unknown,
}

impl fmt::Display for RequestLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrapToWxHopr => write!(f, "Wrap to wxHOPR"),
            Self::UnwrapToXHopr => write!(f, "Unwrap to xHOPR"),
            Self::AddSafeToErc1820Registry => write!(f, "Add Safe to ERC1820 Registry"),
            Self::ConfigureModuleForNode(node) => {
                write!(f, "Node onboarding: Configure module for the {node} node")
            }
            Self::Decoded(name) => write!(f, "{name}"),
            Self::Sent => write!(f, "Sent"),
            Self::Rejection => write!(f, "Rejection"),
            Self::CouldNotDecode => write!(f, "Could not decode"),
            Self::Unknown => write!(f, "-"),
        }
    }
}

/// Derives the request label for a pending transaction.
///
/// Special-case pattern matches run first, in order; each requires exact
/// equality of specific decoded parameter values against the address
/// book or reconstructed payloads. Only when none match does the generic
/// ABI fallback run.
pub fn pending_request(
    tx: &MultisigTransaction,
    safe_ctx: Option<&SafeContext>,
    delegates: &[Address],
    book: &Addresses,
) -> RequestLabel {
    if let Some(data) = tx.data_bytes() {
        if let Some(label) = match_wrapper(tx, book) {
            return label;
        }
        if let Some(label) = match_erc1820(tx, book) {
            return label;
        }
        if let Some(label) = match_node_config(tx, &data, safe_ctx, delegates, book) {
            return label;
        }
        return match decode_known_call(&data) {
            Some(name) => RequestLabel::Decoded(name.to_string()),
            None => RequestLabel::CouldNotDecode,
        };
    }

    if tx.amount() > U256::ZERO {
        return RequestLabel::Sent;
    }
    if tx.to == tx.safe && tx.amount() == U256::ZERO {
        return RequestLabel::Rejection;
    }
    RequestLabel::Unknown
}

/// Source label: the first confirmer's truncated address, or `-` when no
/// one has signed yet (a delegate proposed it).
pub fn pending_source(tx: &MultisigTransaction) -> String {
    match tx.confirmations.first() {
        Some(confirmation) => truncate_address(&confirmation.owner),
        None => "-".to_string(),
    }
}

fn match_wrapper(tx: &MultisigTransaction, book: &Addresses) -> Option<RequestLabel> {
    let decoded = tx.data_decoded.as_ref()?;

    if decoded.method == "transferAndCall"
        && decoded.address_param(0) == Some(book.wxhopr_wrapper)
        && decoded.str_param(2) == Some("0x")
    {
        return Some(RequestLabel::WrapToWxHopr);
    }

    if decoded.method == "transfer" && decoded.address_param(0) == Some(book.wxhopr_wrapper) {
        return Some(RequestLabel::UnwrapToXHopr);
    }

    None
}

fn match_erc1820(tx: &MultisigTransaction, book: &Addresses) -> Option<RequestLabel> {
    let decoded = tx.data_decoded.as_ref()?;
    if decoded.method != "setInterfaceImplementer" {
        return None;
    }

    let hash_matches = decoded
        .str_param(1)
        .map(|h| h.eq_ignore_ascii_case(&book.erc1820_interface_hash.to_string()))
        .unwrap_or(false);

    if decoded.address_param(0) == Some(tx.safe)
        && hash_matches
        && decoded.address_param(2) == Some(book.erc1820_implementer)
    {
        Some(RequestLabel::AddSafeToErc1820Registry)
    } else {
        None
    }
}

fn match_node_config(
    tx: &MultisigTransaction,
    data: &[u8],
    safe_ctx: Option<&SafeContext>,
    delegates: &[Address],
    book: &Addresses,
) -> Option<RequestLabel> {
    let module = safe_ctx?.module_address?;

    delegates
        .iter()
        .find(|&&delegate| {
            calldata::node_config(module, delegate, book.announcement).as_ref() == data
        })
        .map(|&delegate| RequestLabel::ConfigureModuleForNode(delegate))
}

/// Normalized native value of a pending transaction, for display.
pub fn pending_value(tx: &MultisigTransaction) -> String {
    format::format_ether(tx.amount())
}
