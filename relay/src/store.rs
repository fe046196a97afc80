//! Normalized in-memory state for one dashboard session.
//!
//! Raw relay responses are stored as fetched; classification is a pure
//! projection applied when a view is read, so a rules change can never
//! leave stale derived fields behind.
//!
//! Each fetched section is a [`Slot`] with fetch sequencing: `begin`
//! hands out a monotonically increasing ticket, and `commit` only
//! accepts tickets newer than the last committed one. Two overlapping
//! polls therefore resolve deterministically; the later-issued fetch
//! wins, regardless of response arrival order.

use std::sync::RwLock;

use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{debug, warn};

use stakinghub_core::{
    describe_history, pending_request, pending_source, pending_value, user_action, Addresses,
    HistoryTransaction, MultisigTransaction, Page, SafeContext, SafeDelegate, SafeInfo,
    UserAction,
};

/// Ticket identifying one in-flight fetch of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// One fetched section: data, fetch-in-progress count, and sequencing.
#[derive(Debug)]
pub struct Slot<T> {
    data: Option<T>,
    issued: u64,
    committed: u64,
    in_flight: u32,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            data: None,
            issued: 0,
            committed: 0,
            in_flight: 0,
        }
    }
}

impl<T> Slot<T> {
    /// Starts a fetch, returning its ticket.
    pub fn begin(&mut self) -> FetchTicket {
        self.issued += 1;
        self.in_flight += 1;
        FetchTicket(self.issued)
    }

    /// Commits a fetched value. Returns false (and drops the value) when
    /// a newer fetch already committed.
    pub fn commit(&mut self, ticket: FetchTicket, value: T) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket.0 <= self.committed {
            debug!(ticket = ticket.0, committed = self.committed, "stale fetch dropped");
            return false;
        }
        self.committed = ticket.0;
        self.data = Some(value);
        true
    }

    /// Abandons a fetch that failed; existing data stays in place.
    pub fn abort(&mut self, _ticket: FetchTicket) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }

    pub fn get(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }
}

/// The safe the session is operating on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectedSafe {
    pub safe_address: Address,
    pub module_address: Option<Address>,
}

/// A balance in raw and display form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub value: String,
    pub formatted: String,
}

impl Balance {
    pub fn from_raw(raw: U256, decimals: u8) -> Self {
        Self {
            value: raw.to_string(),
            formatted: stakinghub_core::format::format_units(raw, decimals),
        }
    }
}

/// Safe balances shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SafeBalances {
    pub native: Balance,
    pub xhopr: Balance,
    pub wxhopr: Balance,
}

/// Registry standing of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeStatus {
    pub node_address: Address,
    pub included_in_module: bool,
    pub registered_in_safe_registry: bool,
    pub balance: Option<Balance>,
}

/// The merged history feed with pagination bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct HistoryFeed {
    pub results: Vec<HistoryTransaction>,
    pub count: u64,
    pub next_offset: Option<u64>,
}

impl HistoryFeed {
    /// Merges one relay page at `offset`: offset zero replaces the feed,
    /// a continuation offset appends to it.
    pub fn merge_page(&mut self, offset: u64, page: Page<HistoryTransaction>) {
        if offset == 0 {
            self.results = page.results;
        } else {
            self.results.extend(page.results);
        }
        self.count = page.count;
        self.next_offset = if (self.results.len() as u64) < page.count {
            Some(self.results.len() as u64)
        } else {
            None
        };
    }
}

/// One classified pending-transaction row, computed on read.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRow {
    pub safe_tx_hash: Option<String>,
    pub nonce: u64,
    pub request: String,
    pub source: String,
    pub value: String,
    pub confirmations: usize,
    pub confirmations_required: u64,
    pub user_action: Option<UserAction>,
}

/// One classified history row, computed on read.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub source: String,
    pub currency: String,
    pub value: String,
    pub request: String,
}

#[derive(Debug, Default)]
pub struct HubState {
    pub selected_safe: Option<SelectedSafe>,
    pub safes_by_owner: Slot<Vec<Address>>,
    pub pending: Slot<Page<MultisigTransaction>>,
    pub history: Slot<HistoryFeed>,
    pub info: Slot<SafeInfo>,
    pub delegates: Slot<Vec<SafeDelegate>>,
    pub balances: Slot<SafeBalances>,
    pub nodes: Slot<Vec<NodeStatus>>,
}

/// Shared dashboard state. Writers go through the ticket protocol;
/// readers get classified projections.
#[derive(Debug, Default)]
pub struct HubStore {
    book: Addresses,
    state: RwLock<HubState>,
}

impl HubStore {
    pub fn new(book: Addresses) -> Self {
        Self {
            book,
            state: RwLock::new(HubState::default()),
        }
    }

    pub fn book(&self) -> &Addresses {
        &self.book
    }

    /// Runs `f` with mutable access to the state. Lock poisoning is not
    /// recoverable here; the process should die with the panicking
    /// writer.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut HubState) -> R) -> R {
        let mut guard = self.state.write().expect("hub state lock poisoned");
        f(&mut guard)
    }

    pub fn read_state<R>(&self, f: impl FnOnce(&HubState) -> R) -> R {
        let guard = self.state.read().expect("hub state lock poisoned");
        f(&guard)
    }

    /// Selects the safe the session operates on, clearing per-safe
    /// sections fetched for the previous selection.
    pub fn select_safe(&self, safe_address: Address, module_address: Option<Address>) {
        self.with_state(|state| {
            state.selected_safe = Some(SelectedSafe {
                safe_address,
                module_address,
            });
            state.pending.clear();
            state.history.clear();
            state.info.clear();
            state.delegates.clear();
            state.balances.clear();
            state.nodes.clear();
        });
    }

    pub fn selected_safe(&self) -> Option<SelectedSafe> {
        self.read_state(|state| state.selected_safe)
    }

    /// Commits a fetched pending page, dropping records that fail
    /// validation. Every ingest path goes through here so malformed
    /// feed rows are logged and skipped instead of reaching
    /// classification.
    pub fn commit_pending(&self, ticket: FetchTicket, mut page: Page<MultisigTransaction>) -> bool {
        page.results.retain(|tx| match tx.validate() {
            Ok(()) => true,
            Err(err) => {
                warn!(nonce = tx.nonce, error = %err, "dropping malformed pending transaction");
                false
            }
        });
        self.with_state(|state| state.pending.commit(ticket, page))
    }

    /// Classified pending rows for the viewing owner.
    pub fn pending_view(&self, owner: Option<Address>) -> Vec<PendingRow> {
        self.read_state(|state| {
            let ctx = state.selected_safe.map(|selected| SafeContext {
                safe_address: Some(selected.safe_address),
                module_address: selected.module_address,
            });
            let delegates: Vec<Address> = state
                .delegates
                .get()
                .map(|list| list.iter().map(|d| d.delegate).collect())
                .unwrap_or_default();

            state
                .pending
                .get()
                .map(|page| {
                    page.results
                        .iter()
                        .map(|tx| PendingRow {
                            safe_tx_hash: tx.safe_tx_hash.clone(),
                            nonce: tx.nonce,
                            request: pending_request(tx, ctx.as_ref(), &delegates, &self.book)
                                .to_string(),
                            source: pending_source(tx),
                            value: pending_value(tx),
                            confirmations: tx.confirmations.len(),
                            confirmations_required: tx.confirmations_required,
                            user_action: user_action(tx, owner),
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Classified history rows.
    pub fn history_view(&self) -> Vec<HistoryRow> {
        self.read_state(|state| {
            state
                .history
                .get()
                .map(|feed| {
                    feed.results
                        .iter()
                        .map(|tx| {
                            let view = describe_history(tx);
                            HistoryRow {
                                source: stakinghub_core::format::truncate_hex(&view.source),
                                currency: view.currency,
                                value: view.value,
                                request: view.request,
                            }
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
    }
}
