//! Match manager: creates, tracks, and routes players to matches.

use std::collections::HashMap;

use skirmish_protocol::{BlockPos, Host, MatchId, PlayerId, TeamColor};
use skirmish_tick::DeferredTasks;

use crate::{
    MatchConfig, MatchError, MatchOutcome, MatchRequest, MatchSession,
    MatchSummary, SpectateOrigin,
};

/// Work a match schedules for a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTask {
    /// Second half of an elimination transition.
    SettleSpectator { player: PlayerId },
    /// `Ending` → `Ended`.
    Teardown,
}

/// The deferred-task queue shared by every match of one manager.
pub type MatchTasks = DeferredTasks<MatchId, MatchTask>;

/// Things that happened to matches, for the layer above to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    Started {
        match_id: MatchId,
        players: Vec<PlayerId>,
    },
    /// A result was decided. Teardown follows after the configured delay.
    Ended(MatchOutcome),
    /// The match is gone; these identities are free again.
    Released {
        match_id: MatchId,
        players: Vec<PlayerId>,
    },
}

/// Owns every running match and the tasks they scheduled.
///
/// All methods run on the tick authority. Nothing here is shared across
/// threads; the runtime wraps the manager in a single actor.
pub struct MatchManager {
    config: MatchConfig,
    matches: HashMap<MatchId, MatchSession>,

    /// Maps each player to the match they're in (as combatant or
    /// spectator). A player can be in at most ONE match at a time.
    player_matches: HashMap<PlayerId, MatchId>,

    tasks: MatchTasks,
    events: Vec<MatchEvent>,
    next_id: u64,
}

impl MatchManager {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            matches: HashMap::new(),
            player_matches: HashMap::new(),
            tasks: MatchTasks::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Creates a match from a queue's request and starts its countdown.
    ///
    /// Enforces the "one match at a time" invariant for every member.
    pub fn create_match(
        &mut self,
        request: MatchRequest,
        host: &mut impl Host,
    ) -> Result<MatchId, MatchError> {
        for team in &request.teams {
            for player in team.player_ids() {
                if let Some(current) = self.player_matches.get(&player) {
                    return Err(MatchError::AlreadyInMatch(player, *current));
                }
            }
        }

        let match_id = MatchId(self.next_id);
        let mut session = MatchSession::new(match_id, request, self.config.clone())?;
        self.next_id += 1;

        session.start(host);
        let players = session.everyone();
        for &player in &players {
            self.player_matches.insert(player, match_id);
        }
        tracing::info!(%match_id, players = players.len(), "match created");

        self.matches.insert(match_id, session);
        self.events.push(MatchEvent::Started { match_id, players });
        Ok(match_id)
    }

    /// Reports that `player` was knocked out, optionally by `by`.
    pub fn eliminate(
        &mut self,
        player: PlayerId,
        by: Option<PlayerId>,
        host: &mut impl Host,
    ) -> Result<MatchId, MatchError> {
        let match_id = self.require_match_of(player)?;
        let session = self
            .matches
            .get_mut(&match_id)
            .ok_or(MatchError::NotFound(match_id))?;

        if let Some(outcome) = session.eliminate(player, by, host, &mut self.tasks)? {
            self.on_ended(outcome);
        }
        Ok(match_id)
    }

    /// Reports that `player` lost their connection.
    pub fn disconnect(
        &mut self,
        player: PlayerId,
        host: &mut impl Host,
    ) -> Result<MatchId, MatchError> {
        let match_id = self.require_match_of(player)?;
        let session = self
            .matches
            .get_mut(&match_id)
            .ok_or(MatchError::NotFound(match_id))?;

        let ended = session.disconnect(player, host)?;
        // Roster members stay indexed until teardown; spectators leave now.
        if !session.roster().contains(player) {
            self.player_matches.remove(&player);
        }
        if let Some(outcome) = ended {
            self.on_ended(outcome);
        }
        Ok(match_id)
    }

    /// Lets `player` watch `match_id`.
    pub fn spectate(
        &mut self,
        match_id: MatchId,
        player: PlayerId,
        online: &[PlayerId],
        host: &mut impl Host,
    ) -> Result<(), MatchError> {
        if let Some(current) = self.player_matches.get(&player) {
            if *current != match_id {
                return Err(MatchError::AlreadyInMatch(player, *current));
            }
        }
        let session = self
            .matches
            .get_mut(&match_id)
            .ok_or(MatchError::NotFound(match_id))?;

        session.add_spectator(
            player,
            SpectateOrigin::Voluntary,
            online,
            host,
            &mut self.tasks,
        )?;
        self.player_matches.insert(player, match_id);
        Ok(())
    }

    /// Takes a voluntary spectator back out of their match.
    pub fn stop_spectating(
        &mut self,
        player: PlayerId,
        online: &[PlayerId],
        host: &mut impl Host,
    ) -> Result<MatchId, MatchError> {
        let match_id = self.require_match_of(player)?;
        let session = self
            .matches
            .get_mut(&match_id)
            .ok_or(MatchError::NotFound(match_id))?;

        session.stop_spectating(player, online, host)?;
        self.player_matches.remove(&player);
        Ok(match_id)
    }

    /// Concedes the match for `team`. No-op if the result is decided.
    pub fn forfeit(
        &mut self,
        match_id: MatchId,
        team: TeamColor,
        host: &mut impl Host,
    ) -> Result<(), MatchError> {
        let session = self
            .matches
            .get_mut(&match_id)
            .ok_or(MatchError::NotFound(match_id))?;

        if let Some(outcome) = session.forfeit(team, host)? {
            self.on_ended(outcome);
        }
        Ok(())
    }

    /// Stops the match without a winner. No-op if the result is decided.
    pub fn abort(
        &mut self,
        match_id: MatchId,
        host: &mut impl Host,
    ) -> Result<(), MatchError> {
        let session = self
            .matches
            .get_mut(&match_id)
            .ok_or(MatchError::NotFound(match_id))?;

        if let Some(outcome) = session.abort(host) {
            self.on_ended(outcome);
        }
        Ok(())
    }

    /// Records an arena cell changed by gameplay in `match_id`.
    pub fn record_block_change(
        &mut self,
        match_id: MatchId,
        pos: BlockPos,
    ) -> Result<bool, MatchError> {
        let session = self
            .matches
            .get_mut(&match_id)
            .ok_or(MatchError::NotFound(match_id))?;
        Ok(session.record_block_change(pos))
    }

    /// Advances every match by one tick.
    ///
    /// Due deferred tasks run first, then each match's own clock, in match
    /// id order. `online` is everyone connected, used to make released
    /// spectators visible again at teardown.
    pub fn tick(&mut self, online: &[PlayerId], host: &mut impl Host) {
        for due in self.tasks.advance() {
            match due.task {
                MatchTask::SettleSpectator { player } => {
                    if let Some(session) = self.matches.get_mut(&due.owner) {
                        session.settle_spectator(player, host);
                    }
                }
                MatchTask::Teardown => self.teardown(due.owner, online, host),
            }
        }

        let mut ids: Vec<MatchId> = self.matches.keys().copied().collect();
        ids.sort();
        for match_id in ids {
            let ended = self
                .matches
                .get_mut(&match_id)
                .and_then(|session| session.tick(host));
            if let Some(outcome) = ended {
                self.on_ended(outcome);
            }
        }
    }

    fn on_ended(&mut self, outcome: MatchOutcome) {
        let match_id = outcome.match_id;
        self.tasks.schedule(
            match_id,
            u64::from(self.config.teardown_delay_ticks),
            MatchTask::Teardown,
        );
        self.events.push(MatchEvent::Ended(outcome));
    }

    fn teardown(&mut self, match_id: MatchId, online: &[PlayerId], host: &mut impl Host) {
        let Some(mut session) = self.matches.remove(&match_id) else {
            return;
        };
        let players = session.teardown(online, host);
        let cancelled = self.tasks.cancel_owner(&match_id);
        self.player_matches.retain(|_, m| *m != match_id);

        tracing::info!(%match_id, cancelled_tasks = cancelled, "match removed");
        self.events.push(MatchEvent::Released { match_id, players });
    }

    /// Takes every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    fn require_match_of(&self, player: PlayerId) -> Result<MatchId, MatchError> {
        self.match_of(player).ok_or(MatchError::NotInAnyMatch(player))
    }

    /// Returns the match a player is currently in, if any.
    pub fn match_of(&self, player: PlayerId) -> Option<MatchId> {
        self.player_matches.get(&player).copied()
    }

    pub fn get(&self, match_id: MatchId) -> Option<&MatchSession> {
        self.matches.get(&match_id)
    }

    /// Summaries of every running match, ordered by id.
    pub fn matches(&self) -> Vec<MatchSummary> {
        let mut summaries: Vec<MatchSummary> =
            self.matches.values().map(MatchSession::summary).collect();
        summaries.sort_by_key(|s| s.id);
        summaries
    }

    /// Deferred tasks still pending for `match_id`.
    pub fn pending_tasks(&self, match_id: MatchId) -> usize {
        self.tasks.pending_for(&match_id)
    }

    /// Returns the number of running matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl Default for MatchManager {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}
