//! Actor runtime: one task owns the [`Orchestrator`] and is the only thing
//! that ever touches match state.
//!
//! ```text
//! OrchestratorHandle ──cmd──▶ ┌──────────────────────────┐
//! OrchestratorHandle ──cmd──▶ │  actor task              │
//!                             │  select! {               │
//!                             │    cmd  => apply         │
//!                             │    tick => orchestrator  │
//!                             │  }                       │
//!                             └──────────────────────────┘
//! ```
//!
//! Commands and ticks are serialized by the `select!` loop, so nothing
//! needs a lock.

use skirmish_protocol::{BlockPos, Host, MatchId, PlayerId, QueueId, TeamColor};
use skirmish_queue::QueueRequest;
use skirmish_tick::TickScheduler;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::{Orchestrator, SkirmishError};

/// Command channel capacity.
const COMMAND_BUFFER: usize = 256;

type Reply<T> = oneshot::Sender<Result<T, SkirmishError>>;
type Inspector<H> = Box<dyn FnOnce(&mut Orchestrator<H>) + Send>;

enum Command<H: Host> {
    Connect {
        player: PlayerId,
        reply: Reply<()>,
    },
    Reconnect {
        player: PlayerId,
        reply: Reply<()>,
    },
    Disconnect {
        player: PlayerId,
        reply: Reply<()>,
    },
    Enqueue {
        queue_id: QueueId,
        request: QueueRequest,
        reply: Reply<()>,
    },
    Dequeue {
        player: PlayerId,
        reply: Reply<Vec<PlayerId>>,
    },
    Eliminate {
        player: PlayerId,
        by: Option<PlayerId>,
        reply: Reply<MatchId>,
    },
    Spectate {
        player: PlayerId,
        match_id: MatchId,
        reply: Reply<()>,
    },
    StopSpectating {
        player: PlayerId,
        reply: Reply<MatchId>,
    },
    Forfeit {
        match_id: MatchId,
        team: TeamColor,
        reply: Reply<()>,
    },
    Abort {
        match_id: MatchId,
        reply: Reply<()>,
    },
    BlockChanged {
        match_id: MatchId,
        pos: BlockPos,
    },
    Inspect(Inspector<H>),
    Pause,
    Resume,
    Shutdown,
}

/// Cloneable handle to a running orchestrator.
///
/// Every method is a message to the actor; none of them touch state
/// directly. Once the actor has stopped they all return
/// [`SkirmishError::Unavailable`].
pub struct OrchestratorHandle<H: Host> {
    sender: mpsc::Sender<Command<H>>,
}

impl<H: Host> Clone for OrchestratorHandle<H> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<H: Host + Send + 'static> OrchestratorHandle<H> {
    async fn send(&self, command: Command<H>) -> Result<(), SkirmishError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| SkirmishError::Unavailable)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command<H>,
    ) -> Result<T, SkirmishError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx)).await?;
        reply_rx.await.map_err(|_| SkirmishError::Unavailable)?
    }

    pub async fn connect(&self, player: PlayerId) -> Result<(), SkirmishError> {
        self.request(|reply| Command::Connect { player, reply }).await
    }

    pub async fn reconnect(&self, player: PlayerId) -> Result<(), SkirmishError> {
        self.request(|reply| Command::Reconnect { player, reply }).await
    }

    pub async fn disconnect(&self, player: PlayerId) -> Result<(), SkirmishError> {
        self.request(|reply| Command::Disconnect { player, reply }).await
    }

    pub async fn enqueue(
        &self,
        queue_id: QueueId,
        request: QueueRequest,
    ) -> Result<(), SkirmishError> {
        self.request(|reply| Command::Enqueue {
            queue_id,
            request,
            reply,
        })
        .await
    }

    pub async fn dequeue(&self, player: PlayerId) -> Result<Vec<PlayerId>, SkirmishError> {
        self.request(|reply| Command::Dequeue { player, reply }).await
    }

    pub async fn eliminate(
        &self,
        player: PlayerId,
        by: Option<PlayerId>,
    ) -> Result<MatchId, SkirmishError> {
        self.request(|reply| Command::Eliminate { player, by, reply })
            .await
    }

    pub async fn spectate(
        &self,
        player: PlayerId,
        match_id: MatchId,
    ) -> Result<(), SkirmishError> {
        self.request(|reply| Command::Spectate {
            player,
            match_id,
            reply,
        })
        .await
    }

    pub async fn stop_spectating(&self, player: PlayerId) -> Result<MatchId, SkirmishError> {
        self.request(|reply| Command::StopSpectating { player, reply })
            .await
    }

    pub async fn forfeit(&self, match_id: MatchId, team: TeamColor) -> Result<(), SkirmishError> {
        self.request(|reply| Command::Forfeit {
            match_id,
            team,
            reply,
        })
        .await
    }

    pub async fn abort(&self, match_id: MatchId) -> Result<(), SkirmishError> {
        self.request(|reply| Command::Abort { match_id, reply }).await
    }

    /// Fire-and-forget: gameplay reports block changes far more often than
    /// anyone needs an answer.
    pub async fn block_changed(&self, match_id: MatchId, pos: BlockPos) -> Result<(), SkirmishError> {
        self.send(Command::BlockChanged { match_id, pos }).await
    }

    /// Runs `f` on the actor, between ticks, and returns its result.
    pub async fn inspect<R, F>(&self, f: F) -> Result<R, SkirmishError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Orchestrator<H>) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let inspector: Inspector<H> = Box::new(move |orchestrator| {
            let _ = reply_tx.send(f(orchestrator));
        });
        self.send(Command::Inspect(inspector)).await?;
        reply_rx.await.map_err(|_| SkirmishError::Unavailable)
    }

    /// Freezes every match: no tick fires until [`resume`](Self::resume).
    /// Commands are still applied.
    pub async fn pause(&self) -> Result<(), SkirmishError> {
        self.send(Command::Pause).await
    }

    pub async fn resume(&self) -> Result<(), SkirmishError> {
        self.send(Command::Resume).await
    }

    /// Asks the actor to stop. Commands already queued ahead of this one
    /// are still applied.
    pub async fn shutdown(&self) -> Result<(), SkirmishError> {
        self.send(Command::Shutdown).await
    }
}

/// Starts the actor that owns `orchestrator`.
///
/// The join handle yields the orchestrator back once the actor stops,
/// either on [`OrchestratorHandle::shutdown`] or when every handle is
/// dropped.
pub fn spawn<H: Host + Send + 'static>(
    orchestrator: Orchestrator<H>,
) -> (OrchestratorHandle<H>, JoinHandle<Orchestrator<H>>) {
    let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
    let actor = Actor {
        scheduler: TickScheduler::new(orchestrator.tick_config().clone()),
        orchestrator,
        receiver,
    };
    let task = tokio::spawn(actor.run());
    (OrchestratorHandle { sender }, task)
}

struct Actor<H: Host> {
    orchestrator: Orchestrator<H>,
    scheduler: TickScheduler,
    receiver: mpsc::Receiver<Command<H>>,
}

impl<H: Host + Send + 'static> Actor<H> {
    async fn run(mut self) -> Orchestrator<H> {
        tracing::info!(
            tick_rate_hz = self.scheduler.tick_rate_hz(),
            "orchestrator running"
        );

        loop {
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                info = self.scheduler.wait_for_tick() => {
                    self.orchestrator.tick();
                    self.scheduler.record_tick_end();
                    if info.ticks_skipped > 0 {
                        tracing::debug!(
                            tick = info.tick,
                            skipped = info.ticks_skipped,
                            "authority fell behind"
                        );
                    }
                }
            }
        }

        tracing::info!(
            ticks = self.scheduler.tick_count(),
            "orchestrator stopped"
        );
        self.orchestrator
    }

    fn apply(&mut self, command: Command<H>) {
        let o = &mut self.orchestrator;
        match command {
            Command::Connect { player, reply } => {
                let _ = reply.send(o.connect(player));
            }
            Command::Reconnect { player, reply } => {
                let _ = reply.send(o.reconnect(player));
            }
            Command::Disconnect { player, reply } => {
                let _ = reply.send(o.disconnect(player));
            }
            Command::Enqueue {
                queue_id,
                request,
                reply,
            } => {
                let _ = reply.send(o.enqueue(queue_id, request));
            }
            Command::Dequeue { player, reply } => {
                let _ = reply.send(o.dequeue(player));
            }
            Command::Eliminate { player, by, reply } => {
                let _ = reply.send(o.eliminate(player, by));
            }
            Command::Spectate {
                player,
                match_id,
                reply,
            } => {
                let _ = reply.send(o.spectate(player, match_id));
            }
            Command::StopSpectating { player, reply } => {
                let _ = reply.send(o.stop_spectating(player));
            }
            Command::Forfeit {
                match_id,
                team,
                reply,
            } => {
                let _ = reply.send(o.forfeit(match_id, team));
            }
            Command::Abort { match_id, reply } => {
                let _ = reply.send(o.abort(match_id));
            }
            Command::BlockChanged { match_id, pos } => {
                if let Err(e) = o.record_block_change(match_id, pos) {
                    tracing::debug!(%match_id, error = %e, "block change dropped");
                }
            }
            Command::Inspect(f) => f(o),
            Command::Pause => self.scheduler.pause(),
            Command::Resume => self.scheduler.resume(),
            // Handled by the loop.
            Command::Shutdown => {}
        }
    }
}
