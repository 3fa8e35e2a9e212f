//! The entity cache: a local mirror of user, chat, and channel snapshots.
//!
//! Three namespaces keyed by the shared numeric id type. A later snapshot
//! for the same id always overwrites the earlier one in place; there is no
//! merging of partial fields and no removal, because the protocol in scope
//! never deletes entities.

use std::collections::HashMap;

use chat_types::{Channel, Chat, Peer, PeerId, User};

/// In-memory mirror of the remote entities this session has seen.
#[derive(Debug, Clone, Default)]
pub struct EntityCache {
    users: HashMap<PeerId, User>,
    chats: HashMap<PeerId, Chat>,
    channels: HashMap<PeerId, Channel>,
}

impl EntityCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a user snapshot.
    pub fn upsert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert or overwrite a chat snapshot.
    pub fn upsert_chat(&mut self, chat: Chat) {
        self.chats.insert(chat.id, chat);
    }

    /// Insert or overwrite a channel snapshot.
    pub fn upsert_channel(&mut self, channel: Channel) {
        self.channels.insert(channel.id, channel);
    }

    /// Look up a user by id.
    pub fn get_user(&self, id: PeerId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Look up a chat by id.
    pub fn get_chat(&self, id: PeerId) -> Option<&Chat> {
        self.chats.get(&id)
    }

    /// Look up a channel by id.
    pub fn get_channel(&self, id: PeerId) -> Option<&Channel> {
        self.channels.get(&id)
    }

    /// Resolve an id across all three namespaces.
    ///
    /// The id spaces are not guaranteed disjoint in every protocol version,
    /// so the lookup order is fixed: user first, then chat, then channel,
    /// first match wins.
    pub fn find_peer(&self, id: PeerId) -> Option<Peer> {
        if self.users.contains_key(&id) {
            Some(Peer::User { id })
        } else if self.chats.contains_key(&id) {
            Some(Peer::Chat { id })
        } else if self.channels.contains_key(&id) {
            Some(Peer::Channel { id })
        } else {
            None
        }
    }

    /// Number of cached users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of cached chats.
    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    /// Number of cached channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Whether the cache holds no entities at all.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.chats.is_empty() && self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_types::AccessHash;

    fn user(id: i32, first: &str) -> User {
        User {
            id: PeerId::new(id),
            first_name: first.to_string(),
            last_name: String::new(),
            username: None,
            phone: None,
            access_hash: AccessHash::new(0),
        }
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let mut cache = EntityCache::new();
        cache.upsert_user(user(7, "Ann"));
        cache.upsert_user(user(7, "Anna"));

        assert_eq!(cache.user_count(), 1);
        assert_eq!(cache.get_user(PeerId::new(7)).unwrap().first_name, "Anna");
    }

    #[test]
    fn namespaces_are_independent() {
        let mut cache = EntityCache::new();
        cache.upsert_chat(Chat {
            id: PeerId::new(7),
            title: "team".into(),
        });
        cache.upsert_channel(Channel {
            id: PeerId::new(7),
            title: "news".into(),
        });

        assert!(cache.get_user(PeerId::new(7)).is_none());
        assert_eq!(cache.get_chat(PeerId::new(7)).unwrap().title, "team");
        assert_eq!(cache.get_channel(PeerId::new(7)).unwrap().title, "news");
    }

    #[test]
    fn find_peer_misses_on_empty_cache() {
        let cache = EntityCache::new();
        assert_eq!(cache.find_peer(PeerId::new(1)), None);
    }

    #[test]
    fn find_peer_prefers_user_then_chat_then_channel() {
        let mut cache = EntityCache::new();
        let id = PeerId::new(5);
        cache.upsert_channel(Channel {
            id,
            title: "c".into(),
        });
        assert_eq!(cache.find_peer(id), Some(Peer::Channel { id }));

        cache.upsert_chat(Chat {
            id,
            title: "g".into(),
        });
        assert_eq!(cache.find_peer(id), Some(Peer::Chat { id }));

        cache.upsert_user(user(5, "Eve"));
        assert_eq!(cache.find_peer(id), Some(Peer::User { id }));
    }
}
