//! # chat-types
//!
//! Wire format types for the chatsync incremental difference protocol.
//!
//! This crate provides the foundational types used across all chatsync crates:
//! - [`PeerId`], [`AccessHash`] - Identity types
//! - [`SyncCursor`], [`ServerState`] - The four-field sync position and the
//!   full state payload the backend returns
//! - [`User`], [`Chat`], [`Channel`] - Entity snapshots
//! - [`DiffResponse`], [`StateResponse`], [`ContactsResponse`] - The tagged
//!   response families of the difference protocol
//! - [`ProtocolError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cursor;
mod entities;
mod error;
mod ids;
mod responses;

pub use cursor::{ServerState, SyncCursor};
pub use entities::{Channel, Chat, ChatItem, User};
pub use error::ProtocolError;
pub use ids::{AccessHash, PeerId};
pub use responses::{
    Contact, ContactList, ContactsResponse, DiffResponse, Difference, MessageEvent, Peer,
    StateResponse, TextMessage, UpdateRecord,
};
