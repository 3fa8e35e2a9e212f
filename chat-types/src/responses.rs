//! The tagged response families of the difference protocol.
//!
//! Each backend call that can return more than one shape gets a closed enum,
//! exhaustively matched at the reconciler boundary. Unrecognized tags decode
//! to an explicit `Unsupported` arm instead of failing, so newer servers can
//! add shapes without breaking older clients.

use serde::{Deserialize, Serialize};

use crate::{ChatItem, PeerId, ProtocolError, ServerState, User};

/// An addressable destination for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Peer {
    /// A direct user.
    User {
        /// The user identifier.
        id: PeerId,
    },
    /// A basic group chat.
    Chat {
        /// The chat identifier.
        id: PeerId,
    },
    /// A channel or supergroup.
    Channel {
        /// The channel identifier.
        id: PeerId,
    },
}

impl Peer {
    /// The numeric identifier of the destination, whatever its kind.
    pub fn id(&self) -> PeerId {
        match self {
            Peer::User { id } | Peer::Chat { id } | Peer::Channel { id } => *id,
        }
    }
}

/// A plain text message carried in a difference payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    /// Message identifier.
    pub id: i32,
    /// Sender user id.
    pub from: PeerId,
    /// Destination peer.
    pub to: Peer,
    /// Unix timestamp.
    pub date: i32,
    /// Message body.
    pub text: String,
}

/// One conversational event extracted from a difference payload.
///
/// Produced transiently by reconciliation and handed to the renderer;
/// never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MessageEvent {
    /// A message with no payload. Logged only, never rendered.
    Empty,
    /// A text message.
    Text(TextMessage),
    /// A message kind this client does not understand.
    #[serde(other)]
    Unsupported,
}

/// One record of the other-updates list in a difference payload.
///
/// Message-bearing records carry their own `pts`/`pts_count` pair, which the
/// reconciler applies in preference to the envelope state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UpdateRecord {
    /// A new plain message.
    NewMessage {
        /// The message payload.
        message: MessageEvent,
        /// Record-level pts.
        pts: i32,
        /// Record-level companion counter.
        pts_count: i32,
    },
    /// A new channel-scoped message.
    NewChannelMessage {
        /// The message payload.
        message: MessageEvent,
        /// Record-level pts.
        pts: i32,
        /// Record-level companion counter.
        pts_count: i32,
    },
    /// An edit of a plain message.
    EditMessage {
        /// The edited message payload.
        message: MessageEvent,
        /// Record-level pts.
        pts: i32,
        /// Record-level companion counter.
        pts_count: i32,
    },
    /// An edit of a channel-scoped message.
    EditChannelMessage {
        /// The edited message payload.
        message: MessageEvent,
        /// Record-level pts.
        pts: i32,
        /// Record-level companion counter.
        pts_count: i32,
    },
    /// An update kind this client does not understand.
    #[serde(other)]
    Unsupported,
}

/// The common body of full and sliced difference responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Difference {
    /// The embedded state, applied wholesale as the new cursor.
    pub state: ServerState,
    /// New or changed users.
    pub users: Vec<User>,
    /// New or changed chats and channels.
    pub chats: Vec<ChatItem>,
    /// New messages.
    pub new_messages: Vec<MessageEvent>,
    /// Other update records.
    pub other_updates: Vec<UpdateRecord>,
}

/// Response to a "fetch difference since cursor" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DiffResponse {
    /// Nothing new; only `date` and `seq` advance.
    Empty {
        /// New server time.
        date: i32,
        /// New event counter.
        seq: i32,
    },
    /// Everything new since the cursor, with a final embedded state.
    Diff(Difference),
    /// A partial difference; the embedded state is an intermediate
    /// checkpoint and more data remains on the server.
    Slice(Difference),
    /// The gap is larger than the backend will enumerate; only a fresh
    /// `pts` is supplied and local history has a discontinuity.
    TooLong {
        /// The fresh pts to resume from.
        pts: i32,
    },
    /// A response shape this client does not understand.
    #[serde(other)]
    Unsupported,
}

/// Response to a "fetch current state" call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StateResponse {
    /// The full current state.
    State(ServerState),
    /// A response shape this client does not understand.
    #[serde(other)]
    Unsupported,
}

/// One entry of the account's contact list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// The contact's user id.
    pub user_id: PeerId,
    /// Whether the contact relationship is mutual.
    pub mutual: bool,
}

/// The payload of a successful contact fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactList {
    /// Snapshots for every user referenced by the contact pairs.
    pub users: Vec<User>,
    /// The contact pairs themselves.
    pub contacts: Vec<Contact>,
}

/// Response to a "fetch contacts" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContactsResponse {
    /// The contact list.
    Contacts(ContactList),
    /// A response shape this client does not understand.
    #[serde(other)]
    Unsupported,
}

impl DiffResponse {
    /// Serialize to MessagePack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        rmp_serde::to_vec(self).map_err(ProtocolError::Serialization)
    }

    /// Deserialize from MessagePack bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        rmp_serde::from_slice(bytes).map_err(ProtocolError::Deserialization)
    }
}

impl StateResponse {
    /// Serialize to MessagePack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        rmp_serde::to_vec(self).map_err(ProtocolError::Serialization)
    }

    /// Deserialize from MessagePack bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        rmp_serde::from_slice(bytes).map_err(ProtocolError::Deserialization)
    }
}

impl ContactsResponse {
    /// Serialize to MessagePack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        rmp_serde::to_vec(self).map_err(ProtocolError::Serialization)
    }

    /// Deserialize from MessagePack bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        rmp_serde::from_slice(bytes).map_err(ProtocolError::Deserialization)
    }
}
