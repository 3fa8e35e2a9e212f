//! Turning conversational events into human-readable lines.
//!
//! Rendering is a pure function over one event and the cache. It never
//! fails: missing cache entries degrade to placeholder text rather than
//! dropping or aborting the event.

use chrono::{TimeZone, Utc};
use tracing::debug;

use chat_types::{MessageEvent, Peer, PeerId, TextMessage, User};

use crate::cache::EntityCache;

/// Render one event to a display line.
///
/// `Empty` and unrecognized events produce no visible line, only a log
/// entry. Text messages render as
/// `"<date> <msg-id> <sender> to|in <destination>: <body>"` with `to` for
/// direct peers and `in` for chats and channels.
pub fn render(event: &MessageEvent, cache: &EntityCache) -> Option<String> {
    match event {
        MessageEvent::Empty => {
            debug!("empty message, nothing to render");
            None
        }
        MessageEvent::Unsupported => {
            debug!("ignoring message kind this client does not understand");
            None
        }
        MessageEvent::Text(message) => Some(render_text(message, cache)),
    }
}

fn render_text(message: &TextMessage, cache: &EntityCache) -> String {
    let date = format_date(message.date);
    let sender = nickname(message.from, cache);

    match message.to {
        Peer::User { id } => {
            let peer = nickname(id, cache);
            format!("{} {} {} to {}: {}", date, message.id, sender, peer, message.text)
        }
        Peer::Chat { id } => {
            let title = cache
                .get_chat(id)
                .map(|chat| chat.title.clone())
                .unwrap_or_else(|| {
                    debug!(%id, "can't find chat");
                    "unknown chat".to_string()
                });
            format!(
                "{} {} {} in {}({}): {}",
                date, message.id, sender, title, id, message.text
            )
        }
        Peer::Channel { id } => {
            let title = cache
                .get_channel(id)
                .map(|channel| channel.title.clone())
                .unwrap_or_else(|| {
                    debug!(%id, "can't find channel");
                    "unknown channel".to_string()
                });
            format!(
                "{} {} {} in {}({}): {}",
                date, message.id, sender, title, id, message.text
            )
        }
    }
}

/// A user's display name in one of two formats:
/// `<id> <First name> @<Username> <Last name>` if the user has a handle,
/// `<id> <First name> <Last name>` otherwise. Empty name parts are skipped.
/// An id the cache has never seen renders as `<id> unknown user`.
fn nickname(id: PeerId, cache: &EntityCache) -> String {
    match cache.get_user(id) {
        Some(user) => known_nickname(user),
        None => {
            debug!(%id, "can't find user");
            format!("{} unknown user", id)
        }
    }
}

fn known_nickname(user: &User) -> String {
    let mut parts = vec![user.id.to_string()];
    if !user.first_name.is_empty() {
        parts.push(user.first_name.clone());
    }
    if let Some(username) = user.username.as_deref().filter(|u| !u.is_empty()) {
        parts.push(format!("@{}", username));
    }
    if !user.last_name.is_empty() {
        parts.push(user.last_name.clone());
    }
    parts.join(" ")
}

/// Unix timestamp to an RFC822-style calendar string, always in UTC so the
/// output does not depend on locale or host timezone.
fn format_date(date: i32) -> String {
    match Utc.timestamp_opt(i64::from(date), 0).single() {
        Some(ts) => ts.format("%d %b %y %H:%M UTC").to_string(),
        None => format!("@{}", date),
    }
}
