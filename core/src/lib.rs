//! Core types and pure logic for the Staking Hub.
//!
//! This crate holds everything that does not perform I/O: the serde data
//! model for the Safe transaction-relay service, the per-environment
//! contract address book, calldata builders for the hub's known flows,
//! selector-based decoding against a fixed set of contract interfaces,
//! and the classification functions that turn raw transaction records
//! into display-ready rows (request label, source, required user action).
//!
//! Classification is a pure projection: it is recomputed from the raw
//! record on every read and never stored alongside it.

pub mod calldata;
pub mod classify;
pub mod config;
pub mod decode;
pub mod format;
pub mod model;

pub use classify::{
    describe_history, pending_request, pending_source, pending_value, user_action, HistoryView,
    RequestLabel, SafeContext, UserAction,
};
pub use config::{Addresses, Environment};
pub use model::{
    Confirmation, DataDecoded, DecodedParameter, FeedError, HistoryTransaction,
    MultisigTransaction, Page, SafeDelegate, SafeInfo, TokenDetails, TokenInfo, Transfer,
};
