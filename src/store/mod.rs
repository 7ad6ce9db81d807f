//! Store Core: one authoritative snapshot with pure-updater writes and
//! synchronous change notification.
//!
//! # Write path
//!
//! ```text
//! set(updater) ──→ next = updater(&current) ──→ swap snapshot ──→ notify subscribers
//!                                                                      │
//!        writes issued while notifying are queued and applied here ◄───┘
//! ```
//!
//! - Each write completes (swap + every notification) before the next starts.
//! - A failed updater leaves the snapshot untouched.
//! - Subscribers take no arguments; they re-read with [`Store::get`].

mod handle;
mod subscription;

pub(crate) use handle::Effect;
pub use handle::{Store, WriteOutcome};
pub use subscription::Subscription;
