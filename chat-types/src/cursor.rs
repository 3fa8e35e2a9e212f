//! Sync position types for chatsync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four-field position marker used to request "what changed since here".
///
/// - `pts`: persistent-state-sequence position in the per-account event
///   stream, monotonically non-decreasing except for explicit recovery
/// - `qts`: secret-chat / out-of-band sequence, tracked separately
/// - `date`: seconds-since-epoch of the last known server time
/// - `seq`: event counter used to detect gaps
///
/// Held in memory for the life of a session, never persisted.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SyncCursor {
    /// Persistent-state-sequence position.
    pub pts: i32,
    /// Out-of-band sequence.
    pub qts: i32,
    /// Last known server time (unix seconds).
    pub date: i32,
    /// Event counter.
    pub seq: i32,
}

impl SyncCursor {
    /// Create a cursor from its four fields.
    pub fn new(pts: i32, qts: i32, date: i32, seq: i32) -> Self {
        Self {
            pts,
            qts,
            date,
            seq,
        }
    }
}

impl fmt::Debug for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SyncCursor(pts={}, qts={}, date={}, seq={})",
            self.pts, self.qts, self.date, self.seq
        )
    }
}

/// The full state payload the backend returns from a state fetch or embeds
/// in a difference response.
///
/// Carries the four cursor fields plus `unread_count`, a companion counter
/// the protocol transports alongside the cursor. The counter is not part of
/// the sync position but the difference processing updates it from
/// per-record values, so it travels with the state object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerState {
    /// Persistent-state-sequence position.
    pub pts: i32,
    /// Out-of-band sequence.
    pub qts: i32,
    /// Server time (unix seconds).
    pub date: i32,
    /// Event counter.
    pub seq: i32,
    /// Companion unread counter.
    pub unread_count: i32,
}

impl ServerState {
    /// The cursor portion of this state.
    pub fn cursor(&self) -> SyncCursor {
        SyncCursor::new(self.pts, self.qts, self.date, self.seq)
    }
}
