//! # chat-core
//!
//! Pure logic for chatsync: the state tracker, the entity cache, the
//! difference reconciler, and the message renderer. No I/O happens here.
//! The actual backend calls are performed by chat-client, which feeds the
//! typed responses into this crate. This enables instant unit testing
//! without network mocks.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cache;
mod reconcile;
mod render;
mod tracker;

pub use cache::EntityCache;
pub use reconcile::{apply_difference, apply_state, next_action, ReconcileError, ReconcileOutcome, SyncAction};
pub use render::render;
pub use tracker::{CursorPatch, StateTracker};
