//! Admission rejects.

use skirmish_protocol::{PlayerId, QueueId};

/// Why a queue refused a request. Returned synchronously from
/// [`MatchQueue::enqueue`](crate::MatchQueue::enqueue).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("player {0} is already queued")]
    AlreadyQueued(PlayerId),

    #[error("request has no requesters")]
    EmptyRequest,

    /// The same identity listed twice in one request.
    #[error("player {0} listed twice in one request")]
    DuplicateRequester(PlayerId),

    #[error("expected a group of {expected}, got {got}")]
    GroupSize { expected: usize, got: usize },

    /// Rated queues need a rating on every request.
    #[error("player {0} has no rating")]
    MissingRating(PlayerId),

    #[error("request for mode {requested:?} sent to a {mode:?} queue")]
    ModeMismatch { mode: String, requested: String },

    #[error("queue {0} not found")]
    NotFound(QueueId),
}
