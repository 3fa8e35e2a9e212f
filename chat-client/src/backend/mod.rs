//! Backend abstraction for chatsync.
//!
//! The backend is the external collaborator that owns the wire protocol,
//! the authentication handshake, and the auth-key file under the user's
//! home directory. This crate only sees its typed call surface.
//!
//! # Design
//!
//! The trait is async and call-oriented: each method corresponds to one
//! remote call and returns the typed response family for that call. Shape
//! interpretation happens in chat-core, not here.

mod mock;

pub use mock::MockBackend;

use async_trait::async_trait;
use thiserror::Error;

use chat_types::{
    AccessHash, ContactsResponse, DiffResponse, PeerId, StateResponse, SyncCursor, User,
};

/// Backend errors.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// A remote call failed.
    #[error("rpc failed: {0}")]
    Rpc(String),
}

/// The destination of an outgoing message.
///
/// Addressing a user requires the opaque access token from their cached
/// snapshot; chats are addressed by id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutgoingPeer {
    /// A direct user.
    User {
        /// The user identifier.
        id: PeerId,
        /// The user's access token.
        access_hash: AccessHash,
    },
    /// A basic group chat.
    Chat {
        /// The chat identifier.
        id: PeerId,
    },
}

/// The typed call surface of the messaging backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Establish the connection.
    async fn connect(&self) -> Result<(), BackendError>;

    /// Tear the connection down gracefully.
    async fn disconnect(&self) -> Result<(), BackendError>;

    /// Whether the connection is currently up.
    fn is_connected(&self) -> bool;

    /// Fetch the full current sync state.
    async fn fetch_state(&self) -> Result<StateResponse, BackendError>;

    /// Fetch the difference since the given cursor.
    async fn fetch_difference(&self, cursor: SyncCursor) -> Result<DiffResponse, BackendError>;

    /// Fetch the account's contact list.
    async fn fetch_contacts(&self) -> Result<ContactsResponse, BackendError>;

    /// Fetch the logged-in account's own user snapshot.
    async fn fetch_self(&self) -> Result<User, BackendError>;

    /// Send a text message. The returned payload is a difference response
    /// and is reconciled the same way a polled difference is.
    async fn send_message(
        &self,
        peer: OutgoingPeer,
        text: &str,
        random_id: i64,
    ) -> Result<DiffResponse, BackendError>;
}
