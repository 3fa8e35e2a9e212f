//! Cursor tracking for chatsync.
//!
//! The tracker holds the four-field sync cursor the backend uses to decide
//! what has changed since the last sync, plus the companion unread counter
//! that travels with the cursor in the wire state object. It performs no
//! validation of its own: deciding which patches are legal is the
//! reconciler's job, the tracker just overwrites whatever fields a patch
//! carries. It cannot fail.

use chat_types::{ServerState, SyncCursor};

/// A partial cursor update. Fields set to `Some` overwrite the
/// corresponding tracker field; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorPatch {
    /// New pts, if any.
    pub pts: Option<i32>,
    /// New qts, if any.
    pub qts: Option<i32>,
    /// New date, if any.
    pub date: Option<i32>,
    /// New seq, if any.
    pub seq: Option<i32>,
    /// New unread counter, if any.
    pub unread_count: Option<i32>,
}

impl CursorPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pts field.
    pub fn with_pts(mut self, pts: i32) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Set the qts field.
    pub fn with_qts(mut self, qts: i32) -> Self {
        self.qts = Some(qts);
        self
    }

    /// Set the date field.
    pub fn with_date(mut self, date: i32) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the seq field.
    pub fn with_seq(mut self, seq: i32) -> Self {
        self.seq = Some(seq);
        self
    }

    /// Set the unread counter.
    pub fn with_unread_count(mut self, unread_count: i32) -> Self {
        self.unread_count = Some(unread_count);
        self
    }
}

/// Holds the sync cursor for one session.
///
/// The cursor is absent until the first successful state fetch or
/// difference application, and lives only in memory.
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    cursor: Option<SyncCursor>,
    unread_count: i32,
}

impl StateTracker {
    /// Create a tracker with no cursor yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current cursor, if a baseline has been established.
    pub fn current(&self) -> Option<SyncCursor> {
        self.cursor
    }

    /// The companion unread counter.
    pub fn unread_count(&self) -> i32 {
        self.unread_count
    }

    /// Replace the whole cursor with an embedded state payload.
    ///
    /// Used when a difference response carries a full state: the embedded
    /// state wins outright, no field-by-field merging.
    pub fn replace(&mut self, state: &ServerState) {
        self.cursor = Some(state.cursor());
        self.unread_count = state.unread_count;
    }

    /// Overwrite the fields present in the patch.
    ///
    /// If no cursor is held yet the patch applies on top of a zero cursor,
    /// establishing one.
    pub fn apply(&mut self, patch: CursorPatch) {
        let mut cursor = self.cursor.unwrap_or_default();
        if let Some(pts) = patch.pts {
            cursor.pts = pts;
        }
        if let Some(qts) = patch.qts {
            cursor.qts = qts;
        }
        if let Some(date) = patch.date {
            cursor.date = date;
        }
        if let Some(seq) = patch.seq {
            cursor.seq = seq;
        }
        if let Some(unread_count) = patch.unread_count {
            self.unread_count = unread_count;
        }
        self.cursor = Some(cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_starts_without_cursor() {
        let tracker = StateTracker::new();
        assert_eq!(tracker.current(), None);
        assert_eq!(tracker.unread_count(), 0);
    }

    #[test]
    fn replace_sets_cursor_wholesale() {
        let mut tracker = StateTracker::new();
        tracker.replace(&ServerState {
            pts: 100,
            qts: 5,
            date: 1000,
            seq: 10,
            unread_count: 2,
        });
        assert_eq!(tracker.current(), Some(SyncCursor::new(100, 5, 1000, 10)));
        assert_eq!(tracker.unread_count(), 2);
    }

    #[test]
    fn partial_patch_leaves_other_fields_untouched() {
        let mut tracker = StateTracker::new();
        tracker.replace(&ServerState {
            pts: 100,
            qts: 5,
            date: 1000,
            seq: 10,
            unread_count: 0,
        });

        tracker.apply(CursorPatch::new().with_date(1010).with_seq(11));

        assert_eq!(tracker.current(), Some(SyncCursor::new(100, 5, 1010, 11)));
    }

    #[test]
    fn empty_patch_is_a_noop_on_fields() {
        let mut tracker = StateTracker::new();
        tracker.replace(&ServerState {
            pts: 1,
            qts: 2,
            date: 3,
            seq: 4,
            unread_count: 5,
        });

        tracker.apply(CursorPatch::new());

        assert_eq!(tracker.current(), Some(SyncCursor::new(1, 2, 3, 4)));
        assert_eq!(tracker.unread_count(), 5);
    }

    #[test]
    fn patch_on_empty_tracker_establishes_cursor() {
        let mut tracker = StateTracker::new();
        tracker.apply(CursorPatch::new().with_pts(500));
        assert_eq!(tracker.current(), Some(SyncCursor::new(500, 0, 0, 0)));
    }

    #[test]
    fn unread_count_patches_independently_of_cursor() {
        let mut tracker = StateTracker::new();
        tracker.replace(&ServerState::default());

        tracker.apply(CursorPatch::new().with_pts(42).with_unread_count(7));

        assert_eq!(tracker.current().unwrap().pts, 42);
        assert_eq!(tracker.unread_count(), 7);
    }
}
