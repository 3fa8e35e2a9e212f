//! The session: one account's live mirror of remote state.
//!
//! A [`Session`] owns the backend handle, the state tracker, and the entity
//! cache, and is only ever driven from the single-consumer event loop in
//! [`crate::SessionDriver`] — no locking is needed as long as that holds.

use thiserror::Error;
use tracing::{debug, info, warn};

use chat_core::{
    apply_difference, apply_state, next_action, EntityCache, ReconcileError, StateTracker,
    SyncAction,
};
use chat_types::{ContactsResponse, DiffResponse, PeerId, User};

use crate::backend::{Backend, BackendError, OutgoingPeer};
use crate::command::{help_text, Command};

/// Session-level errors.
///
/// Whether an error is fatal depends on when it happens: backend errors
/// during startup (connect, first state fetch, contact load) abort the
/// program, the same errors during steady-state polling are logged and
/// retried on the next tick. Baseline errors are always fatal — without a
/// cursor the session cannot sync.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend call failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The bootstrap state fetch did not yield a usable baseline.
    #[error(transparent)]
    Baseline(#[from] ReconcileError),

    /// The contact fetch returned a shape this client cannot use.
    #[error("rpc returned an unexpected contacts shape")]
    ContactsShape,
}

/// Errors from dispatching one user command. Reported to the operator
/// inline; the loop continues and no state is mutated.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command name is not recognized.
    #[error("unknown command: {0}. Try \\help to see all commands")]
    Unknown(String),

    /// A peer id and a message body are both required.
    #[error("not enough arguments: peer id and message required")]
    MissingArguments,

    /// The peer id argument is not numeric.
    #[error("wrong arguments: {0} isn't a number")]
    NotANumber(String),

    /// The command reached the backend and failed there.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What a dispatched command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Text to show the operator.
    Output(String),
    /// Rendered message lines extracted from the command's response.
    Lines(Vec<String>),
    /// The operator asked to quit.
    Quit,
}

/// One account's session over an abstract backend.
pub struct Session<B: Backend> {
    backend: B,
    tracker: StateTracker,
    cache: EntityCache,
    self_id: Option<PeerId>,
}

impl<B: Backend> Session<B> {
    /// Create a session over the given backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tracker: StateTracker::new(),
            cache: EntityCache::new(),
            self_id: None,
        }
    }

    /// Connect the backend.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        self.backend.connect().await?;
        info!("connected to backend");
        Ok(())
    }

    /// Disconnect the backend.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        self.backend.disconnect().await?;
        info!("disconnected from backend");
        Ok(())
    }

    /// Whether the backend connection is up.
    pub fn is_connected(&self) -> bool {
        self.backend.is_connected()
    }

    /// The entity cache (for inspection).
    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// The state tracker (for inspection).
    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    /// The logged-in account's id, once known.
    pub fn self_id(&self) -> Option<PeerId> {
        self.self_id
    }

    /// Perform one polling tick: establish the baseline if there is none
    /// yet, otherwise fetch and reconcile one difference. Returns the
    /// rendered lines of any new messages.
    ///
    /// Exactly one fetch per call; after a long gap the backend returns
    /// slices and catching up simply takes several ticks.
    pub async fn poll(&mut self) -> Result<Vec<String>, SessionError> {
        match next_action(self.backend.is_connected(), &self.tracker) {
            None => Ok(Vec::new()),
            Some(SyncAction::FetchState) => {
                debug!("no cursor yet, fetching current state");
                let response = self.backend.fetch_state().await?;
                apply_state(&mut self.tracker, response)?;
                Ok(Vec::new())
            }
            Some(SyncAction::FetchDifference(cursor)) => {
                let response = self.backend.fetch_difference(cursor).await?;
                Ok(self.absorb(response))
            }
        }
    }

    /// Reconcile one difference response and render its events.
    fn absorb(&mut self, response: DiffResponse) -> Vec<String> {
        let outcome = apply_difference(&mut self.tracker, &mut self.cache, response);
        if outcome.more_available {
            debug!("more differences remain, next tick will continue catching up");
        }
        outcome
            .events
            .iter()
            .filter_map(|event| chat_core::render(event, &self.cache))
            .collect()
    }

    /// Fetch and cache the logged-in account's own snapshot.
    pub async fn current_user(&mut self) -> Result<User, SessionError> {
        let user = self.backend.fetch_self().await?;
        self.self_id = Some(user.id);
        self.cache.upsert_user(user.clone());
        Ok(user)
    }

    /// Fetch the contact list and upsert every referenced user into the
    /// cache. Returns the number of users loaded.
    pub async fn load_contacts(&mut self) -> Result<usize, SessionError> {
        match self.backend.fetch_contacts().await? {
            ContactsResponse::Contacts(list) => {
                let count = list.users.len();
                for user in list.users {
                    self.cache.upsert_user(user);
                }
                info!(count, "contacts loaded");
                Ok(count)
            }
            ContactsResponse::Unsupported => Err(SessionError::ContactsShape),
        }
    }

    /// Fetch the contact list and format it as an aligned table.
    pub async fn contacts_table(&mut self) -> Result<String, SessionError> {
        let list = match self.backend.fetch_contacts().await? {
            ContactsResponse::Contacts(list) => list,
            ContactsResponse::Unsupported => return Err(SessionError::ContactsShape),
        };

        for user in &list.users {
            self.cache.upsert_user(user.clone());
        }

        let mut table = format!(
            "{:>10}    {:>10}    {:<30}    {:<20}",
            "id", "mutual", "name", "username"
        );
        for contact in &list.contacts {
            let (name, username) = match self.cache.get_user(contact.user_id) {
                Some(user) => (
                    format!("{} {}", user.first_name, user.last_name),
                    user.username.clone().unwrap_or_default(),
                ),
                None => ("unknown user".to_string(), String::new()),
            };
            table.push_str(&format!(
                "\n{:>10}    {:>10}    {:<30}    {:<20}",
                contact.user_id, contact.mutual, name, username
            ));
        }
        Ok(table)
    }

    /// Send a text message to a user by id.
    ///
    /// The user must already be cache-resolvable: addressing a user needs
    /// the access token from their snapshot. An unknown id is reported as
    /// an outcome, not an error, and no call is issued.
    pub async fn send_to_user(
        &mut self,
        id: PeerId,
        text: &str,
    ) -> Result<CommandOutcome, SessionError> {
        let access_hash = match self.cache.get_user(id) {
            Some(user) => user.access_hash,
            None => {
                info!(%id, "can't find user");
                return Ok(CommandOutcome::Output(format!(
                    "Can't find user with id: {}",
                    id
                )));
            }
        };

        let response = self
            .backend
            .send_message(OutgoingPeer::User { id, access_hash }, text, rand::random())
            .await?;
        Ok(CommandOutcome::Lines(self.absorb(response)))
    }

    /// Send a text message to a chat by id. Chats are addressed by id
    /// alone, so no cache lookup is required.
    pub async fn send_to_chat(
        &mut self,
        id: PeerId,
        text: &str,
    ) -> Result<CommandOutcome, SessionError> {
        let response = self
            .backend
            .send_message(OutgoingPeer::Chat { id }, text, rand::random())
            .await?;
        Ok(CommandOutcome::Lines(self.absorb(response)))
    }

    /// Dispatch one parsed command.
    pub async fn dispatch(&mut self, command: &Command) -> Result<CommandOutcome, CommandError> {
        match command.name.as_str() {
            "me" => {
                let user = self.current_user().await.map_err(CommandError::Session)?;
                Ok(CommandOutcome::Output(account_summary(&user)))
            }
            "contacts" => {
                let table = self.contacts_table().await.map_err(CommandError::Session)?;
                Ok(CommandOutcome::Output(table))
            }
            "umsg" => {
                let (id, text) = parse_peer_arguments(&command.arguments)?;
                Ok(self.send_to_user(id, text).await?)
            }
            "cmsg" => {
                let (id, text) = parse_peer_arguments(&command.arguments)?;
                Ok(self.send_to_chat(id, text).await?)
            }
            "help" => Ok(CommandOutcome::Output(help_text().to_string())),
            "quit" => {
                if let Err(error) = self.disconnect().await {
                    warn!(%error, "disconnect on quit failed");
                }
                Ok(CommandOutcome::Quit)
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Split a `<id> <message>` argument string.
fn parse_peer_arguments(arguments: &str) -> Result<(PeerId, &str), CommandError> {
    if arguments.is_empty() {
        return Err(CommandError::MissingArguments);
    }
    let (id, text) = arguments
        .split_once(' ')
        .ok_or(CommandError::MissingArguments)?;
    let id = id
        .parse::<i32>()
        .map_err(|_| CommandError::NotANumber(id.to_string()))?;
    Ok((PeerId::new(id), text))
}

/// The `\me` account summary.
fn account_summary(user: &User) -> String {
    let handle = user.username.as_deref().unwrap_or_default();
    let phone = user.phone.as_deref().unwrap_or_default();
    format!(
        "You are logged in as: {} @{} {}\nId: {}\nPhone: {}",
        user.first_name, handle, user.last_name, user.id, phone
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use chat_types::{
        AccessHash, Contact, ContactList, Difference, MessageEvent, Peer, ServerState,
        StateResponse, SyncCursor, TextMessage,
    };

    fn user(id: i32, first: &str) -> User {
        User {
            id: PeerId::new(id),
            first_name: first.to_string(),
            last_name: String::new(),
            username: None,
            phone: None,
            access_hash: AccessHash::new(id as i64 * 100),
        }
    }

    fn state(pts: i32, qts: i32, date: i32, seq: i32) -> ServerState {
        ServerState {
            pts,
            qts,
            date,
            seq,
            unread_count: 0,
        }
    }

    fn text(id: i32, from: i32, to: Peer, date: i32, body: &str) -> MessageEvent {
        MessageEvent::Text(TextMessage {
            id,
            from: PeerId::new(from),
            to,
            date,
            text: body.to_string(),
        })
    }

    async fn connected_session() -> (Session<MockBackend>, MockBackend) {
        let backend = MockBackend::new();
        let handle = backend.clone();
        let mut session = Session::new(backend);
        session.connect().await.unwrap();
        (session, handle)
    }

    #[tokio::test]
    async fn first_poll_establishes_baseline() {
        let (mut session, backend) = connected_session().await;
        backend.queue_state(StateResponse::State(state(100, 5, 1000, 10)));

        let lines = session.poll().await.unwrap();

        assert!(lines.is_empty());
        assert_eq!(
            session.tracker().current(),
            Some(SyncCursor::new(100, 5, 1000, 10))
        );
        // No difference call was made on the bootstrap tick.
        assert!(backend.difference_calls().is_empty());
    }

    #[tokio::test]
    async fn bootstrap_shape_mismatch_is_fatal() {
        let (mut session, backend) = connected_session().await;
        backend.queue_state(StateResponse::Unsupported);

        let result = session.poll().await;

        assert!(matches!(result, Err(SessionError::Baseline(_))));
        assert_eq!(session.tracker().current(), None);
    }

    #[tokio::test]
    async fn poll_renders_new_messages() {
        let (mut session, backend) = connected_session().await;
        backend.queue_state(StateResponse::State(state(100, 5, 1000, 10)));
        backend.queue_difference(DiffResponse::Diff(Difference {
            state: state(105, 5, 1010, 11),
            users: vec![user(7, "Ann")],
            chats: vec![],
            new_messages: vec![text(1, 7, Peer::User { id: PeerId::new(7) }, 1010, "hi")],
            other_updates: vec![],
        }));

        session.poll().await.unwrap();
        let lines = session.poll().await.unwrap();

        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("Ann to 7 Ann: hi"), "got: {}", lines[0]);
        assert_eq!(
            session.tracker().current(),
            Some(SyncCursor::new(105, 5, 1010, 11))
        );
        // The difference was requested with the baseline cursor.
        assert_eq!(
            backend.difference_calls(),
            vec![SyncCursor::new(100, 5, 1000, 10)]
        );
    }

    #[tokio::test]
    async fn failed_poll_leaves_cursor_unchanged() {
        let (mut session, backend) = connected_session().await;
        backend.queue_state(StateResponse::State(state(100, 5, 1000, 10)));
        session.poll().await.unwrap();

        backend.fail_next_difference("timeout");
        let result = session.poll().await;

        assert!(matches!(result, Err(SessionError::Backend(_))));
        assert_eq!(
            session.tracker().current(),
            Some(SyncCursor::new(100, 5, 1000, 10))
        );
    }

    #[tokio::test]
    async fn poll_while_disconnected_does_nothing() {
        let backend = MockBackend::new();
        let mut session = Session::new(backend);

        let lines = session.poll().await.unwrap();

        assert!(lines.is_empty());
        assert_eq!(session.tracker().current(), None);
    }

    #[tokio::test]
    async fn umsg_to_unknown_id_issues_no_rpc() {
        let (mut session, backend) = connected_session().await;

        let outcome = session
            .dispatch(&Command {
                name: "umsg".into(),
                arguments: "42 hello".into(),
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Output("Can't find user with id: 42".into())
        );
        assert!(backend.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn umsg_to_cached_user_sends_with_access_hash() {
        let (mut session, backend) = connected_session().await;
        backend.queue_state(StateResponse::State(state(1, 0, 1, 1)));
        backend.queue_difference(DiffResponse::Diff(Difference {
            state: state(2, 0, 2, 2),
            users: vec![user(42, "Bob")],
            chats: vec![],
            new_messages: vec![],
            other_updates: vec![],
        }));
        session.poll().await.unwrap();
        session.poll().await.unwrap();

        backend.queue_send(DiffResponse::Empty { date: 3, seq: 3 });
        let outcome = session
            .dispatch(&Command {
                name: "umsg".into(),
                arguments: "42 hello".into(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Lines(vec![]));
        let sent = backend.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].0,
            OutgoingPeer::User {
                id: PeerId::new(42),
                access_hash: AccessHash::new(4200),
            }
        );
        assert_eq!(sent[0].1, "hello");
        // The send response advanced the cursor like any other difference.
        assert_eq!(session.tracker().current(), Some(SyncCursor::new(2, 0, 3, 3)));
    }

    #[tokio::test]
    async fn cmsg_sends_without_cache_lookup() {
        let (mut session, backend) = connected_session().await;
        backend.queue_send(DiffResponse::Empty { date: 1, seq: 1 });

        session
            .dispatch(&Command {
                name: "cmsg".into(),
                arguments: "10 hi all".into(),
            })
            .await
            .unwrap();

        let sent = backend.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, OutgoingPeer::Chat { id: PeerId::new(10) });
        assert_eq!(sent[0].1, "hi all");
    }

    #[tokio::test]
    async fn unknown_command_is_an_error_and_no_state_changes() {
        let (mut session, backend) = connected_session().await;

        let result = session
            .dispatch(&Command {
                name: "foo".into(),
                arguments: String::new(),
            })
            .await;

        assert!(matches!(result, Err(CommandError::Unknown(name)) if name == "foo"));
        assert!(session.cache().is_empty());
        assert_eq!(session.tracker().current(), None);
        assert!(backend.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn message_commands_validate_arguments() {
        let (mut session, _backend) = connected_session().await;

        let missing = session
            .dispatch(&Command {
                name: "umsg".into(),
                arguments: String::new(),
            })
            .await;
        assert!(matches!(missing, Err(CommandError::MissingArguments)));

        let no_body = session
            .dispatch(&Command {
                name: "umsg".into(),
                arguments: "42".into(),
            })
            .await;
        assert!(matches!(no_body, Err(CommandError::MissingArguments)));

        let bad_id = session
            .dispatch(&Command {
                name: "cmsg".into(),
                arguments: "abc hello".into(),
            })
            .await;
        assert!(matches!(bad_id, Err(CommandError::NotANumber(s)) if s == "abc"));
    }

    #[tokio::test]
    async fn me_caches_self_and_summarizes() {
        let (mut session, backend) = connected_session().await;
        backend.queue_self(User {
            id: PeerId::new(1),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            username: Some("ann".into()),
            phone: Some("555".into()),
            access_hash: AccessHash::new(1),
        });

        let outcome = session
            .dispatch(&Command {
                name: "me".into(),
                arguments: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(session.self_id(), Some(PeerId::new(1)));
        assert!(session.cache().get_user(PeerId::new(1)).is_some());
        match outcome {
            CommandOutcome::Output(summary) => {
                assert!(summary.contains("You are logged in as: Ann @ann Lee"));
                assert!(summary.contains("Id: 1"));
                assert!(summary.contains("Phone: 555"));
            }
            other => panic!("expected output, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn contacts_table_lists_pairs() {
        let (mut session, backend) = connected_session().await;
        backend.queue_contacts(ContactsResponse::Contacts(ContactList {
            users: vec![user(7, "Ann"), user(8, "Bob")],
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
        }));

        let outcome = session
            .dispatch(&Command {
                name: "contacts".into(),
                arguments: String::new(),
            })
            .await
            .unwrap();

        match outcome {
            CommandOutcome::Output(table) => {
                assert!(table.contains("id"));
                assert!(table.contains("Ann"));
                assert!(table.contains("Bob"));
                assert!(table.contains("true"));
                assert!(table.contains("false"));
            }
            other => panic!("expected output, got {:?}", other),
        }
        assert_eq!(session.cache().user_count(), 2);
    }

    #[tokio::test]
    async fn load_contacts_shape_mismatch_is_an_error() {
        let (mut session, backend) = connected_session().await;
        backend.queue_contacts(ContactsResponse::Unsupported);

        let result = session.load_contacts().await;
        assert!(matches!(result, Err(SessionError::ContactsShape)));
    }

    #[tokio::test]
    async fn quit_disconnects() {
        let (mut session, backend) = connected_session().await;

        let outcome = session
            .dispatch(&Command {
                name: "quit".into(),
                arguments: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Quit);
        assert!(!backend.is_connected());
    }
}
