//! Identity types for chatsync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric identifier for a user, chat, or channel.
///
/// The protocol uses signed 32-bit identifiers. The three entity namespaces
/// share this key type even though their id spaces are managed separately by
/// the backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PeerId(i32);

impl PeerId {
    /// Create a new PeerId with the given value.
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// Get the numeric value of this PeerId.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.0)
    }
}

impl From<i32> for PeerId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// An opaque access token required to address a user in outgoing calls.
///
/// Assigned by the backend; the client never interprets it, only echoes it
/// back when sending to that user.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct AccessHash(i64);

impl AccessHash {
    /// Create an AccessHash from its raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value of this AccessHash.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for AccessHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Opaque credential material, keep it out of logs.
        write!(f, "AccessHash(REDACTED)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_id_value_roundtrip() {
        let id = PeerId::new(-42);
        assert_eq!(id.value(), -42);
        assert_eq!(id, PeerId::from(-42));
    }

    #[test]
    fn peer_id_display() {
        assert_eq!(PeerId::new(7).to_string(), "7");
    }

    #[test]
    fn access_hash_debug_redacts_value() {
        let hash = AccessHash::new(0x1122_3344_5566_7788);
        let debug = format!("{:?}", hash);
        assert_eq!(debug, "AccessHash(REDACTED)");
        assert!(!debug.contains("1122"));
    }
}
