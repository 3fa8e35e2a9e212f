//! Mock backend for testing.
//!
//! Allows queueing typed responses per call and capturing sent messages
//! for verification.

use super::{Backend, BackendError, OutgoingPeer};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chat_types::{ContactsResponse, DiffResponse, StateResponse, SyncCursor, User};

/// Mock backend for testing.
///
/// Each call pops its own response queue; an empty queue reads as a closed
/// connection. Clones share state so tests can hold a handle while the
/// session owns the backend.
#[derive(Debug, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockBackendInner>>,
}

#[derive(Debug, Default)]
struct MockBackendInner {
    connected: bool,
    state_queue: VecDeque<StateResponse>,
    diff_queue: VecDeque<DiffResponse>,
    contacts_queue: VecDeque<ContactsResponse>,
    self_queue: VecDeque<User>,
    send_queue: VecDeque<DiffResponse>,
    sent_messages: Vec<(OutgoingPeer, String, i64)>,
    difference_calls: Vec<SyncCursor>,
    fail_next_connect: Option<String>,
    fail_next_difference: Option<String>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `fetch_state` call.
    pub fn queue_state(&self, response: StateResponse) {
        self.inner.lock().unwrap().state_queue.push_back(response);
    }

    /// Queue a response for the next `fetch_difference` call.
    pub fn queue_difference(&self, response: DiffResponse) {
        self.inner.lock().unwrap().diff_queue.push_back(response);
    }

    /// Queue a response for the next `fetch_contacts` call.
    pub fn queue_contacts(&self, response: ContactsResponse) {
        self.inner.lock().unwrap().contacts_queue.push_back(response);
    }

    /// Queue a response for the next `fetch_self` call.
    pub fn queue_self(&self, user: User) {
        self.inner.lock().unwrap().self_queue.push_back(user);
    }

    /// Queue a response for the next `send_message` call.
    pub fn queue_send(&self, response: DiffResponse) {
        self.inner.lock().unwrap().send_queue.push_back(response);
    }

    /// All messages sent so far, as (peer, text, random_id) triples.
    pub fn sent_messages(&self) -> Vec<(OutgoingPeer, String, i64)> {
        self.inner.lock().unwrap().sent_messages.clone()
    }

    /// The cursors passed to `fetch_difference` so far.
    pub fn difference_calls(&self) -> Vec<SyncCursor> {
        self.inner.lock().unwrap().difference_calls.clone()
    }

    /// Cause the next `connect` to fail with the given error.
    pub fn fail_next_connect(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_connect = Some(error.to_string());
    }

    /// Cause the next `fetch_difference` to fail with the given error.
    pub fn fail_next_difference(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_difference = Some(error.to_string());
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn connect(&self) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_connect.take() {
            return Err(BackendError::ConnectionFailed(error));
        }
        inner.connected = true;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BackendError> {
        self.inner.lock().unwrap().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().unwrap().connected
    }

    async fn fetch_state(&self) -> Result<StateResponse, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected {
            return Err(BackendError::NotConnected);
        }
        inner
            .state_queue
            .pop_front()
            .ok_or(BackendError::ConnectionClosed)
    }

    async fn fetch_difference(&self, cursor: SyncCursor) -> Result<DiffResponse, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected {
            return Err(BackendError::NotConnected);
        }
        inner.difference_calls.push(cursor);
        if let Some(error) = inner.fail_next_difference.take() {
            return Err(BackendError::Rpc(error));
        }
        inner
            .diff_queue
            .pop_front()
            .ok_or(BackendError::ConnectionClosed)
    }

    async fn fetch_contacts(&self) -> Result<ContactsResponse, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected {
            return Err(BackendError::NotConnected);
        }
        inner
            .contacts_queue
            .pop_front()
            .ok_or(BackendError::ConnectionClosed)
    }

    async fn fetch_self(&self) -> Result<User, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected {
            return Err(BackendError::NotConnected);
        }
        inner
            .self_queue
            .pop_front()
            .ok_or(BackendError::ConnectionClosed)
    }

    async fn send_message(
        &self,
        peer: OutgoingPeer,
        text: &str,
        random_id: i64,
    ) -> Result<DiffResponse, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.connected {
            return Err(BackendError::NotConnected);
        }
        inner.sent_messages.push((peer, text.to_string(), random_id));
        inner
            .send_queue
            .pop_front()
            .ok_or(BackendError::ConnectionClosed)
    }
}
