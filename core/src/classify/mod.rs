//! Pure classification of relay transaction records.
//!
//! Given a raw record (and, for pending transactions, the viewing
//! owner's address) these functions derive display-ready fields: a
//! human-readable request label, a source label, the action the owner
//! must take next, and normalized value/currency strings. Nothing here
//! performs I/O or mutates state; a decoding failure degrades to a
//! fallback label rather than an error, because an undecodable
//! transaction must still render a row.

mod history;
mod pending;

pub use history::{describe_history, HistoryView};
pub use pending::{
    pending_request, pending_source, pending_value, user_action, RequestLabel, SafeContext,
    UserAction,
};
