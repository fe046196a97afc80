//! I/O side of the Staking Hub: the transaction-relay REST client, thin
//! JSON-RPC chain reads, the normalized in-memory store, and the polling
//! watcher that keeps the store fresh.
//!
//! Every fetched list lives in a [`store::Slot`] guarded by fetch
//! tickets, so overlapping polls cannot let a stale response overwrite a
//! fresher one. Classification stays in `stakinghub-core` and is applied
//! on read, never persisted.

pub mod chain;
pub mod client;
pub mod store;
pub mod watcher;

pub use chain::{ChainClient, ChainError};
pub use client::{ProposedTransaction, RelayClient, RelayError};
pub use store::{
    Balance, FetchTicket, HistoryFeed, HistoryRow, HubState, HubStore, NodeStatus, PendingRow,
    SafeBalances, SelectedSafe, Slot,
};
pub use watcher::{Watcher, WatcherHandle};
