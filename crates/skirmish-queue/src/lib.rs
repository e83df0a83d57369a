//! Admission queues for Skirmish.
//!
//! A queue collects [`QueueRequest`]s and, once its [`AdmissionPolicy`] is
//! satisfied, turns the chosen entries into a
//! [`MatchRequest`](skirmish_match::MatchRequest): teams, a random arena
//! from its [`ArenaPool`], and the queue's context and loadout.
//!
//! # Policies
//!
//! - [`DuelPolicy`]: solo players, FIFO, two teams of `team_size`
//! - [`RankedPolicy`]: rated 1v1 with a band that widens as players wait
//! - [`PartyPolicy`]: two pre-formed parties of a fixed size

mod arena_pool;
mod entry;
mod error;
mod policy;
mod queue;

pub use arena_pool::ArenaPool;
pub use entry::{QueueEntry, QueueRequest};
pub use error::QueueError;
pub use policy::{AdmissionPolicy, DuelPolicy, Formation, PartyPolicy, RankedPolicy};
pub use queue::{MatchQueue, Queue};
