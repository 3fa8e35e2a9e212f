//! The difference reconciler.
//!
//! Given the connection state and the current cursor, [`next_action`]
//! decides the next protocol call; [`apply_state`] and [`apply_difference`]
//! interpret the backend's typed responses, updating the tracker and the
//! cache and extracting the conversational events carried by the payload.
//!
//! The response families are closed tagged enums; every match here carries
//! an explicit default arm that logs and ignores shapes this client does not
//! understand. During bootstrap that tolerance does not apply: a session
//! cannot proceed without a baseline cursor, so a state fetch that returns
//! anything but a full state payload is an error for the caller to treat as
//! fatal.

use thiserror::Error;
use tracing::{debug, warn};

use chat_types::{
    ChatItem, DiffResponse, Difference, MessageEvent, StateResponse, SyncCursor, UpdateRecord,
};

use crate::cache::EntityCache;
use crate::tracker::{CursorPatch, StateTracker};

/// Errors from reconciliation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    /// The state fetch did not return a full state payload. Without a
    /// baseline cursor the session cannot sync at all.
    #[error("cannot establish sync baseline: state response is not a full state payload")]
    MissingBaseline,
}

/// The next protocol call to make on a polling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// No cursor is held yet; the only legal call is a full state fetch.
    FetchState,
    /// A cursor is held; fetch the difference since it.
    FetchDifference(SyncCursor),
}

/// Decide the next protocol action for one polling tick.
///
/// Returns `None` while disconnected: there is nothing to do until the
/// backend connection is back.
pub fn next_action(connected: bool, tracker: &StateTracker) -> Option<SyncAction> {
    if !connected {
        return None;
    }
    match tracker.current() {
        None => Some(SyncAction::FetchState),
        Some(cursor) => Some(SyncAction::FetchDifference(cursor)),
    }
}

/// Apply the response of a bootstrap state fetch.
///
/// On success the tracker transitions from "no cursor" to tracking the
/// returned state.
pub fn apply_state(tracker: &mut StateTracker, response: StateResponse) -> Result<(), ReconcileError> {
    match response {
        StateResponse::State(state) => {
            tracker.replace(&state);
            debug!(pts = state.pts, seq = state.seq, "sync baseline established");
            Ok(())
        }
        StateResponse::Unsupported => Err(ReconcileError::MissingBaseline),
    }
}

/// What one reconciliation pass produced.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// Conversational events extracted from the payload, in arrival order.
    pub events: Vec<MessageEvent>,
    /// Whether the response was a slice, i.e. more data remains on the
    /// server. The caller issues at most one fetch per tick; catching up
    /// after a long gap simply takes several ticks.
    pub more_available: bool,
}

/// Apply one difference response to the tracker and the cache.
///
/// Never fails: shapes the client does not understand are logged and
/// ignored so that steady-state polling can wait for the next tick.
pub fn apply_difference(
    tracker: &mut StateTracker,
    cache: &mut EntityCache,
    response: DiffResponse,
) -> ReconcileOutcome {
    match response {
        DiffResponse::Empty { date, seq } => {
            tracker.apply(CursorPatch::new().with_date(date).with_seq(seq));
            ReconcileOutcome::default()
        }
        DiffResponse::Diff(diff) => ReconcileOutcome {
            events: apply_payload(tracker, cache, diff),
            more_available: false,
        },
        DiffResponse::Slice(diff) => {
            debug!("difference slice received, more data remains on the server");
            ReconcileOutcome {
                events: apply_payload(tracker, cache, diff),
                more_available: true,
            }
        }
        DiffResponse::TooLong { pts } => {
            // Only pts is authoritative here; qts/date/seq stay as they
            // were and local message history has a discontinuity. This
            // client does not attempt backfill.
            warn!(pts, "difference gap too long, local history is discontinuous");
            tracker.apply(CursorPatch::new().with_pts(pts));
            ReconcileOutcome::default()
        }
        DiffResponse::Unsupported => {
            debug!("ignoring difference response shape this client does not understand");
            ReconcileOutcome::default()
        }
    }
}

/// Apply the body shared by full and sliced differences.
///
/// Stage order matters: users, then chats and channels, then messages, then
/// other update records. Later stages may rely on entities upserted by
/// earlier stages of the same payload.
fn apply_payload(
    tracker: &mut StateTracker,
    cache: &mut EntityCache,
    diff: Difference,
) -> Vec<MessageEvent> {
    tracker.replace(&diff.state);

    for user in diff.users {
        cache.upsert_user(user);
    }

    for item in diff.chats {
        match item {
            ChatItem::Chat(chat) => cache.upsert_chat(chat),
            ChatItem::Channel(channel) => cache.upsert_channel(channel),
            ChatItem::Unsupported => {
                debug!("ignoring chat item kind this client does not understand");
            }
        }
    }

    let mut events = diff.new_messages;

    for record in diff.other_updates {
        match record {
            UpdateRecord::NewMessage {
                message,
                pts,
                pts_count,
            }
            | UpdateRecord::NewChannelMessage {
                message,
                pts,
                pts_count,
            }
            | UpdateRecord::EditMessage {
                message,
                pts,
                pts_count,
            }
            | UpdateRecord::EditChannelMessage {
                message,
                pts,
                pts_count,
            } => {
                // The per-record counters are fresher than the envelope
                // state applied above, so they win.
                tracker.apply(
                    CursorPatch::new()
                        .with_pts(pts)
                        .with_unread_count(pts_count),
                );
                events.push(message);
            }
            UpdateRecord::Unsupported => {
                debug!("ignoring update record kind this client does not understand");
            }
        }
    }

    events
}
