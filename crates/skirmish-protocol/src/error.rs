//! Error types for the host capability layer.
//!
//! Every instruction the core sends to the host is fire-and-forget from
//! the core's point of view. The host still reports failures so the core
//! can log them; the core never aborts a match because of one.

use crate::PlayerId;

/// Errors a host reports when an instruction can't be carried out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresentationError {
    /// The player is offline or their connection is gone.
    ///
    /// This is the common case: an observer logged out between the
    /// moment the audience was computed and the moment the packet was sent.
    #[error("player {0} is unreachable")]
    Unreachable(PlayerId),

    /// The host refused the instruction for another reason
    /// (world unloaded, entity limit reached, etc.).
    #[error("host rejected instruction: {0}")]
    Rejected(String),
}
