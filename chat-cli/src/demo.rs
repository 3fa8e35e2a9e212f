//! Canned demo backend.
//!
//! Seeds a [`MockBackend`] with a small account so the binary can be run
//! end to end without a wire transport: a logged-in user, two contacts,
//! one incoming message, and enough queued send acknowledgements for a
//! short interactive session.

use chat_client::MockBackend;
use chat_types::{
    AccessHash, Contact, ContactList, ContactsResponse, DiffResponse, Difference, MessageEvent,
    Peer, PeerId, ServerState, StateResponse, TextMessage, User,
};

const DEMO_DATE: i32 = 1_700_000_000;

fn user(id: i32, first: &str, last: &str, username: Option<&str>) -> User {
    User {
        id: PeerId::new(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        username: username.map(str::to_string),
        phone: None,
        access_hash: AccessHash::new(i64::from(id) * 1000 + 7),
    }
}

/// Build the seeded backend.
pub fn backend() -> MockBackend {
    let backend = MockBackend::new();

    backend.queue_self(User {
        phone: Some("+15550100".to_string()),
        ..user(1, "Demo", "User", Some("demo"))
    });

    backend.queue_state(StateResponse::State(ServerState {
        pts: 100,
        qts: 0,
        date: DEMO_DATE,
        seq: 1,
        unread_count: 0,
    }));

    // One incoming message waiting on the first real poll.
    backend.queue_difference(DiffResponse::Diff(Difference {
        state: ServerState {
            pts: 101,
            qts: 0,
            date: DEMO_DATE + 5,
            seq: 2,
            unread_count: 1,
        },
        users: vec![user(7, "Ann", "Lee", Some("ann"))],
        chats: vec![],
        new_messages: vec![MessageEvent::Text(TextMessage {
            id: 1,
            from: PeerId::new(7),
            to: Peer::User { id: PeerId::new(1) },
            date: DEMO_DATE + 5,
            text: "welcome to the demo".to_string(),
        })],
        other_updates: vec![],
    }));

    // Quiet ticks after that.
    for n in 0..30 {
        backend.queue_difference(DiffResponse::Empty {
            date: DEMO_DATE + 10 + n,
            seq: 2,
        });
    }

    let contacts = ContactsResponse::Contacts(ContactList {
        users: vec![
            user(7, "Ann", "Lee", Some("ann")),
            user(8, "Bob", "", None),
        ],
        contacts: vec![
            Contact {
                user_id: PeerId::new(7),
                mutual: true,
            },
            Contact {
                user_id: PeerId::new(8),
                mutual: false,
            },
        ],
    });
    // Startup consumes one; the rest serve \contacts commands.
    for _ in 0..8 {
        backend.queue_contacts(contacts.clone());
    }

    // Send acknowledgements for a handful of outgoing messages.
    for n in 0..8 {
        backend.queue_send(DiffResponse::Empty {
            date: DEMO_DATE + 10 + n,
            seq: 2,
        });
    }

    backend
}
