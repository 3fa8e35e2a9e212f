//! Entity snapshots held in the local mirror.

use serde::{Deserialize, Serialize};

use crate::{AccessHash, PeerId};

/// A user snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: PeerId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Public handle, if the user has one.
    pub username: Option<String>,
    /// Phone number, if visible to this account.
    pub phone: Option<String>,
    /// Opaque token required to address this user in outgoing calls.
    pub access_hash: AccessHash,
}

/// A basic group chat snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Chat identifier.
    pub id: PeerId,
    /// Chat title.
    pub title: String,
}

/// A broadcast channel or supergroup snapshot.
///
/// Same shape as [`Chat`] but the backend manages its id space separately,
/// so the two are cached in separate namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel identifier.
    pub id: PeerId,
    /// Channel title.
    pub title: String,
}

/// One item of the chats list in a difference payload.
///
/// The backend mixes chats and channels in a single list and distinguishes
/// them by tag; unrecognized tags decode to [`ChatItem::Unsupported`] and are
/// skipped by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChatItem {
    /// A basic group chat.
    Chat(Chat),
    /// A channel or supergroup.
    Channel(Channel),
    /// A chat kind this client does not understand.
    #[serde(other)]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_item_dispatches_by_tag() {
        let json = r#"{"type":"Channel","id":9,"title":"news"}"#;
        let item: ChatItem = serde_json::from_str(json).unwrap();
        assert!(matches!(item, ChatItem::Channel(Channel { id, .. }) if id == PeerId::new(9)));
    }

    #[test]
    fn unknown_chat_tag_decodes_to_unsupported() {
        let json = r#"{"type":"Forum","id":1,"title":"x"}"#;
        let item: ChatItem = serde_json::from_str(json).unwrap();
        assert_eq!(item, ChatItem::Unsupported);
    }
}
