//! Player session tracking for Skirmish.
//!
//! This crate answers two questions for the layers above it:
//!
//! 1. **Who is online?**: connect, disconnect, reconnect within a grace
//!    period, expiry ([`SessionManager`]).
//! 2. **What is each player doing?**: idle, waiting in a queue, playing,
//!    or spectating ([`Activity`]). A player can only be doing one of
//!    these at a time, which is what stops a player from queueing twice or
//!    joining a queue mid-match.
//!
//! # How it fits in the stack
//!
//! ```text
//! Orchestrator (skirmish)  ← marks players Queued / Playing / Idle
//!     ↕
//! Session Layer (this crate)  ← online set + activity per player
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId, MatchId, QueueId
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Activity, ConnectionState, PlayerSession, SessionConfig};
