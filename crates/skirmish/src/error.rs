//! Unified error type for the Skirmish facade.

use skirmish_match::MatchError;
use skirmish_protocol::PresentationError;
use skirmish_queue::QueueError;
use skirmish_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SkirmishError {
    /// The host refused or couldn't deliver an instruction.
    #[error(transparent)]
    Presentation(#[from] PresentationError),

    /// A player session error (unknown, offline, busy).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A match error (not found, wrong state, invalid roster).
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A queue admission error.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The orchestrator task has stopped.
    #[error("orchestrator is not running")]
    Unavailable,
}
