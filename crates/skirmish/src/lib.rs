//! # Skirmish
//!
//! Session orchestration for competitive multiplayer matches.
//!
//! Skirmish takes players from a queue into a match, runs the match
//! through `Starting → Active → Ending → Ended`, turns eliminated players
//! into spectators, and puts the arena back the way it was afterwards.
//! Rendering, movement and combat belong to the host; Skirmish only tells
//! it what to do through the capability traits in [`skirmish_protocol`].
//!
//! ## Layers
//!
//! ```text
//! OrchestratorHandle ──▶ actor (runtime) ──▶ Orchestrator
//!                                              ├─ SessionManager (who is online, doing what)
//!                                              ├─ MatchQueue × n  (admission)
//!                                              ├─ MatchManager    (sessions, spectators, arena)
//!                                              └─ OutcomeSink     (results)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skirmish::prelude::*;
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .queue(Queue::new(
//!         QueueId(1),
//!         DuelPolicy::one_v_one(),
//!         MatchContext::casual("1v1"),
//!         Loadout::new("sword"),
//!         ArenaPool::new([arena]),
//!     ))
//!     .build(my_host);
//! let (handle, _task) = skirmish::spawn(orchestrator);
//! handle.connect(PlayerId(1)).await?;
//! handle.enqueue(QueueId(1), QueueRequest::solo(PlayerId(1))).await?;
//! ```

mod error;
mod orchestrator;
mod outcome;
mod runtime;

pub use error::SkirmishError;
pub use orchestrator::{Orchestrator, OrchestratorBuilder, QueueSummary};
pub use outcome::{LogOutcomes, OutcomeSink};
pub use runtime::{OrchestratorHandle, spawn};

// Re-export sub-crates for advanced usage.
pub use skirmish_match;
pub use skirmish_protocol;
pub use skirmish_queue;
pub use skirmish_session;
pub use skirmish_tick;

/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default
/// `info`). For binaries; libraries never call this.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Convenience re-exports for the common case.
pub mod prelude {
    pub use crate::{
        LogOutcomes, Orchestrator, OrchestratorBuilder, OrchestratorHandle,
        OutcomeSink, SkirmishError, spawn,
    };
    pub use skirmish_match::{
        Arena, EndReason, Loadout, MatchConfig, MatchContext, MatchOutcome,
        MatchState, MatchSummary,
    };
    pub use skirmish_protocol::{
        BlockPos, Host, Location, MatchId, PlayerId, QueueId, TeamColor,
    };
    pub use skirmish_queue::{
        ArenaPool, DuelPolicy, MatchQueue, PartyPolicy, Queue, QueueRequest,
        RankedPolicy,
    };
    pub use skirmish_session::{Activity, SessionConfig};
    pub use skirmish_tick::TickConfig;
}
