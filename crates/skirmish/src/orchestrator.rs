//! The tick authority: sessions, queues and matches wired together.

use serde::Serialize;
use skirmish_match::{
    MatchConfig, MatchEvent, MatchManager, MatchRequest, MatchSummary,
};
use skirmish_protocol::{BlockPos, Host, MatchId, PlayerId, QueueId, TeamColor};
use skirmish_queue::{MatchQueue, QueueEntry, QueueError, QueueRequest};
use skirmish_session::{Activity, SessionConfig, SessionManager};
use skirmish_tick::TickConfig;

use crate::{LogOutcomes, OutcomeSink, SkirmishError};

/// Read-only view of one queue for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSummary {
    pub id: QueueId,
    pub policy: &'static str,
    pub mode: String,
    pub ranked: bool,
    pub waiting: Vec<QueueEntry>,
}

/// Owns every piece of mutable match state and applies all changes to it.
///
/// Everything here is synchronous. Exactly one owner drives it: either a
/// test calling [`tick`](Self::tick) by hand, or the actor started by
/// [`spawn`](crate::spawn), which ticks it on a fixed-rate clock.
pub struct Orchestrator<H: Host> {
    host: H,
    sessions: SessionManager,
    queues: Vec<Box<dyn MatchQueue>>,
    matches: MatchManager,
    outcomes: Box<dyn OutcomeSink>,
    tick_config: TickConfig,
}

impl<H: Host> Orchestrator<H> {
    // ---------------------------------------------------------------------
    // Presence
    // ---------------------------------------------------------------------

    /// Starts a fresh session for `player`.
    ///
    /// A player whose previous session dropped out of a match that hasn't
    /// been torn down yet stays attached to it until teardown releases them.
    pub fn connect(&mut self, player: PlayerId) -> Result<(), SkirmishError> {
        self.sessions.connect(player)?;
        if let Some(match_id) = self.matches.match_of(player) {
            self.sessions.set_activity(player, Activity::Spectating(match_id));
        }
        Ok(())
    }

    pub fn reconnect(&mut self, player: PlayerId) -> Result<(), SkirmishError> {
        self.sessions.reconnect(player)?;
        Ok(())
    }

    /// Marks `player` offline and pulls them out of whatever they were
    /// doing. A queued party leaves the queue together.
    pub fn disconnect(&mut self, player: PlayerId) -> Result<(), SkirmishError> {
        match self.sessions.disconnect(player)? {
            Activity::Idle => {}
            Activity::Queued(queue_id) => {
                let left = self.queue_mut(queue_id)?.dequeue(player);
                for member in left {
                    self.sessions.release(member);
                }
            }
            Activity::Playing(_) | Activity::Spectating(_) => {
                if let Err(e) = self.matches.disconnect(player, &mut self.host) {
                    tracing::debug!(%player, error = %e, "no match to leave");
                }
                // Roster members stay attached until teardown releases them.
                if self.matches.match_of(player).is_none() {
                    self.sessions.release(player);
                }
                self.process_events();
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Queues
    // ---------------------------------------------------------------------

    /// Puts a solo player or a party into `queue_id`.
    ///
    /// Every requester must be online and idle. Nothing changes if any of
    /// them isn't.
    pub fn enqueue(
        &mut self,
        queue_id: QueueId,
        request: QueueRequest,
    ) -> Result<(), SkirmishError> {
        let requesters = request.requesters.clone();
        self.queue_mut(queue_id)?.enqueue(request)?;

        for (n, &player) in requesters.iter().enumerate() {
            if let Err(e) = self.sessions.begin(player, Activity::Queued(queue_id)) {
                self.queue_mut(queue_id)?.dequeue(player);
                for &earlier in &requesters[..n] {
                    self.sessions.release(earlier);
                }
                return Err(e.into());
            }
        }
        tracing::info!(
            %queue_id,
            leader = %requesters[0],
            size = requesters.len(),
            "queued"
        );
        Ok(())
    }

    /// Takes `player` (and their party) out of their queue. Returns who
    /// left, empty if `player` wasn't queued.
    pub fn dequeue(&mut self, player: PlayerId) -> Result<Vec<PlayerId>, SkirmishError> {
        let Some(Activity::Queued(queue_id)) = self.sessions.activity(&player) else {
            return Ok(Vec::new());
        };
        let left = self.queue_mut(queue_id)?.dequeue(player);
        for &member in &left {
            self.sessions.release(member);
        }
        Ok(left)
    }

    fn queue_mut(
        &mut self,
        queue_id: QueueId,
    ) -> Result<&mut Box<dyn MatchQueue>, QueueError> {
        self.queues
            .iter_mut()
            .find(|q| q.id() == queue_id)
            .ok_or(QueueError::NotFound(queue_id))
    }

    // ---------------------------------------------------------------------
    // Matches
    // ---------------------------------------------------------------------

    /// Reports that `player` was knocked out, optionally by `by`.
    pub fn eliminate(
        &mut self,
        player: PlayerId,
        by: Option<PlayerId>,
    ) -> Result<MatchId, SkirmishError> {
        let match_id = self.matches.eliminate(player, by, &mut self.host)?;
        self.sessions.set_activity(player, Activity::Spectating(match_id));
        self.process_events();
        Ok(match_id)
    }

    /// Lets an idle player watch `match_id`.
    pub fn spectate(
        &mut self,
        player: PlayerId,
        match_id: MatchId,
    ) -> Result<(), SkirmishError> {
        self.sessions.begin(player, Activity::Spectating(match_id))?;
        let online = self.sessions.online();
        if let Err(e) = self.matches.spectate(match_id, player, &online, &mut self.host) {
            self.sessions.release(player);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn stop_spectating(&mut self, player: PlayerId) -> Result<MatchId, SkirmishError> {
        let online = self.sessions.online();
        let match_id = self.matches.stop_spectating(player, &online, &mut self.host)?;
        self.sessions.release(player);
        Ok(match_id)
    }

    pub fn forfeit(&mut self, match_id: MatchId, team: TeamColor) -> Result<(), SkirmishError> {
        self.matches.forfeit(match_id, team, &mut self.host)?;
        self.process_events();
        Ok(())
    }

    pub fn abort(&mut self, match_id: MatchId) -> Result<(), SkirmishError> {
        self.matches.abort(match_id, &mut self.host)?;
        self.process_events();
        Ok(())
    }

    /// Records an arena cell changed by gameplay so teardown can clear it.
    pub fn record_block_change(
        &mut self,
        match_id: MatchId,
        pos: BlockPos,
    ) -> Result<bool, SkirmishError> {
        Ok(self.matches.record_block_change(match_id, pos)?)
    }

    // ---------------------------------------------------------------------
    // Tick
    // ---------------------------------------------------------------------

    /// One step of the authority.
    ///
    /// Queues get first pick so a match formed this tick starts its
    /// countdown on the same tick. Then every match advances, results are
    /// delivered, and stale sessions expire.
    pub fn tick(&mut self) {
        let formed: Vec<MatchRequest> =
            self.queues.iter_mut().filter_map(|q| q.tick()).collect();
        for request in formed {
            self.start_match(request);
        }

        let online = self.sessions.online();
        self.matches.tick(&online, &mut self.host);
        self.process_events();

        let expired = self.sessions.expire_stale();
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "sessions expired");
            self.sessions.cleanup_expired();
        }
    }

    fn start_match(&mut self, request: MatchRequest) {
        let players: Vec<PlayerId> =
            request.teams.iter().flat_map(|t| t.player_ids()).collect();
        let origin = request.origin;

        match self.matches.create_match(request, &mut self.host) {
            Ok(match_id) => {
                for player in players {
                    self.sessions.set_activity(player, Activity::Playing(match_id));
                }
            }
            Err(e) => {
                tracing::warn!(
                    queue_id = %origin,
                    error = %e,
                    "match could not start, players released"
                );
                for player in players {
                    self.sessions.release(player);
                }
            }
        }
    }

    fn process_events(&mut self) {
        for event in self.matches.drain_events() {
            match event {
                MatchEvent::Started { .. } => {}
                MatchEvent::Ended(outcome) => self.outcomes.record(&outcome),
                MatchEvent::Released { match_id, players } => {
                    tracing::debug!(%match_id, players = players.len(), "players released");
                    for player in players {
                        self.sessions.release(player);
                    }
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn activity(&self, player: PlayerId) -> Option<Activity> {
        self.sessions.activity(&player)
    }

    /// Running matches, ordered by id.
    pub fn matches(&self) -> Vec<MatchSummary> {
        self.matches.matches()
    }

    pub fn match_manager(&self) -> &MatchManager {
        &self.matches
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Every queue with its waiting entries, in registration order.
    pub fn queues(&self) -> Vec<QueueSummary> {
        self.queues
            .iter()
            .map(|q| QueueSummary {
                id: q.id(),
                policy: q.policy_name(),
                mode: q.context().mode.clone(),
                ranked: q.context().ranked,
                waiting: q.list_active(),
            })
            .collect()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn tick_config(&self) -> &TickConfig {
        &self.tick_config
    }
}

/// Builder for an [`Orchestrator`].
///
/// # Example
///
/// ```rust,ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .queue(Queue::new(QueueId(1), DuelPolicy::one_v_one(), context, loadout, arenas))
///     .outcome_sink(rewards)
///     .build(host);
/// ```
pub struct OrchestratorBuilder {
    match_config: MatchConfig,
    session_config: SessionConfig,
    tick_config: TickConfig,
    queues: Vec<Box<dyn MatchQueue>>,
    outcomes: Option<Box<dyn OutcomeSink>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            match_config: MatchConfig::default(),
            session_config: SessionConfig::default(),
            tick_config: TickConfig::default(),
            queues: Vec::new(),
            outcomes: None,
        }
    }

    pub fn match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the clock. Match timings follow its rate.
    pub fn tick_config(mut self, config: TickConfig) -> Self {
        self.tick_config = config;
        self
    }

    /// Registers a queue. Ids must be unique; a later queue with a taken
    /// id is dropped.
    pub fn queue(mut self, queue: impl MatchQueue + 'static) -> Self {
        if self.queues.iter().any(|q| q.id() == queue.id()) {
            tracing::warn!(queue_id = %queue.id(), "duplicate queue id, ignored");
            return self;
        }
        self.queues.push(Box::new(queue));
        self
    }

    pub fn outcome_sink(mut self, sink: impl OutcomeSink + 'static) -> Self {
        self.outcomes = Some(Box::new(sink));
        self
    }

    pub fn build<H: Host>(self, host: H) -> Orchestrator<H> {
        let tick_config = self.tick_config.validated();
        let mut match_config = self.match_config;
        match_config.ticks_per_second = tick_config.tick_rate_hz;

        tracing::debug!(
            queues = self.queues.len(),
            tick_rate_hz = tick_config.tick_rate_hz,
            "orchestrator built"
        );
        Orchestrator {
            host,
            sessions: SessionManager::new(self.session_config),
            queues: self.queues,
            matches: MatchManager::new(match_config),
            outcomes: self.outcomes
                .unwrap_or_else(|| Box::new(LogOutcomes) as Box<dyn OutcomeSink>),
            tick_config,
        }
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
