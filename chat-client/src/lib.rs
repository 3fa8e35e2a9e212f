//! # chat-client
//!
//! The session layer of chatsync. [`Session`] owns the entity cache and the
//! state tracker and talks to an abstract [`Backend`]; [`SessionDriver`]
//! runs the single-consumer event loop that interleaves periodic polling,
//! user commands, and shutdown.
//!
//! # Architecture
//!
//! ```text
//! Terminal → SessionDriver → Session → Backend → Network
//!                               ↓
//!                          chat-core (pure reconciliation logic)
//! ```
//!
//! The real wire transport (handshake, encryption, RPC framing) lives
//! behind the [`Backend`] trait; [`MockBackend`] ships for tests and demos.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod command;
mod driver;
mod session;

pub use backend::{Backend, BackendError, MockBackend, OutgoingPeer};
pub use command::{help_text, parse_command, Command};
pub use driver::{DriverHandle, SessionDriver};
pub use session::{CommandError, CommandOutcome, Session, SessionError};
