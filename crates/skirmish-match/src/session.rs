//! One match: roster, lifecycle, spectators, and the arena record.
//!
//! A `MatchSession` is plain data driven by its owner (the
//! [`MatchManager`](crate::MatchManager)). It never spawns tasks or reads
//! the clock; every call that changes the world receives the host
//! explicitly, and every delayed step goes through the owner's
//! [`DeferredTasks`](skirmish_tick::DeferredTasks).

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Serialize;
use skirmish_protocol::{
    BlockPos, Host, MatchId, PlayerControl, PlayerId, PresentationError,
    QueueId, SoundTag, TeamColor,
};
use tracing::{debug, info, warn};

use crate::{
    Arena, ArenaSnapshot, EndReason, GameTeam, Loadout, MatchConfig,
    MatchContext, MatchError, MatchRequest, MatchState, Roster, TeamMember,
};

/// The decided result of a match, handed to outcome consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub match_id: MatchId,
    pub origin: QueueId,
    pub context: MatchContext,
    /// `None` is a draw (or an aborted match).
    pub winner: Option<TeamColor>,
    pub reason: EndReason,
    /// Members of the winning team, alive or not.
    pub winners: Vec<PlayerId>,
    /// Every other roster member.
    pub losers: Vec<PlayerId>,
    /// Ticks from creation to the end of combat.
    pub duration_ticks: u64,
}

/// Read-only snapshot of a match for listings and admin views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub id: MatchId,
    pub state: MatchState,
    pub mode: String,
    pub arena: String,
    pub teams: Vec<TeamSummary>,
    pub spectators: usize,
    pub elapsed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub color: TeamColor,
    pub alive: usize,
    pub size: usize,
}

/// Logs a failed host instruction and carries on.
///
/// A player who left mid-transition makes some instructions fail; the
/// match keeps going without them.
pub(crate) fn report<T>(
    result: Result<T, PresentationError>,
    action: &'static str,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(action, error = %e, "host instruction failed");
            None
        }
    }
}

pub struct MatchSession {
    pub(crate) id: MatchId,
    context: MatchContext,
    loadout: Loadout,
    arena: Arena,
    arena_copy: Option<Arena>,
    origin: QueueId,
    pub(crate) roster: Roster,
    pub(crate) config: MatchConfig,
    state: MatchState,
    /// Ticks since creation.
    ticks: u64,
    countdown_remaining: u32,
    active_ticks: u64,
    /// Eliminated members and voluntary watchers.
    pub(crate) spectators: BTreeSet<PlayerId>,
    /// Eliminated members whose settle step hasn't run yet.
    pub(crate) settling: BTreeSet<PlayerId>,
    snapshot: ArenaSnapshot,
    outcome: Option<MatchOutcome>,
}

impl MatchSession {
    /// Builds a session in `Starting`. Nothing is sent to the host until
    /// [`start`](Self::start).
    pub fn new(
        id: MatchId,
        request: MatchRequest,
        config: MatchConfig,
    ) -> Result<Self, MatchError> {
        let roster = Roster::new(request.teams)?;
        let arena_copy = config
            .isolate_arena
            .then(|| request.arena.isolated_copy(&id.to_string()));

        Ok(Self {
            id,
            context: request.context,
            loadout: request.loadout,
            arena: request.arena,
            arena_copy,
            origin: request.origin,
            roster,
            countdown_remaining: config.countdown_ticks,
            config,
            state: MatchState::Starting,
            ticks: 0,
            active_ticks: 0,
            spectators: BTreeSet::new(),
            settling: BTreeSet::new(),
            snapshot: ArenaSnapshot::new(),
            outcome: None,
        })
    }

    /// Places every team at its spawn and announces the countdown.
    pub fn start(&mut self, host: &mut impl Host) {
        let placements: Vec<(PlayerId, _)> = self
            .roster
            .teams()
            .iter()
            .enumerate()
            .flat_map(|(index, team)| {
                let spawn = self.working_arena().spawn_for(index);
                team.player_ids().map(move |p| (p, spawn))
            })
            .collect();

        for (player, spawn) in placements {
            report(host.reset(player), "reset");
            report(host.teleport(player, spawn), "teleport");
        }

        let teams = self
            .roster
            .teams()
            .iter()
            .map(|t| t.color().to_string())
            .collect::<Vec<_>>()
            .join(" vs ");
        self.broadcast_message(
            &format!(
                "{} on {}: {teams} ({})",
                self.context,
                self.working_arena().name,
                self.loadout.name
            ),
            host,
        );
        self.announce_countdown(host);
        info!(match_id = %self.id, arena = %self.working_arena().name, "match starting");
    }

    // -- lifecycle ----------------------------------------------------------

    /// Moves to `target` if it is exactly one step ahead.
    ///
    /// Asking for a state that is already reached (or passed) is a no-op
    /// returning `Ok(false)`. Asking to skip a state is an error.
    pub fn advance_to(&mut self, target: MatchState) -> Result<bool, MatchError> {
        if target <= self.state {
            return Ok(false);
        }
        if !self.state.can_transition_to(target) {
            return Err(MatchError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }
        let from = self.state;
        self.state = target;
        info!(match_id = %self.id, %from, to = %target, "match state changed");
        Ok(true)
    }

    /// Internal transitions are always one step; a failure here is a bug.
    fn step(&mut self, target: MatchState) {
        if let Err(e) = self.advance_to(target) {
            debug_assert!(false, "{e}");
            warn!(match_id = %self.id, error = %e, "transition ignored");
        }
    }

    /// Advances the countdown or the combat clock by one tick.
    ///
    /// Returns the outcome if the match ended during this tick.
    pub fn tick(&mut self, host: &mut impl Host) -> Option<MatchOutcome> {
        self.ticks += 1;
        match self.state {
            MatchState::Starting => {
                self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
                if self.countdown_remaining == 0 {
                    return self.activate(host);
                }
                if self.countdown_remaining % self.ticks_per_second() == 0 {
                    self.announce_countdown(host);
                }
                None
            }
            MatchState::Active => {
                self.active_ticks += 1;
                self.check_end(host)
            }
            MatchState::Ending | MatchState::Ended => None,
        }
    }

    fn announce_countdown(&self, host: &mut impl Host) {
        let seconds = self.countdown_remaining / self.ticks_per_second();
        if seconds == 0 {
            return;
        }
        self.broadcast_message(&format!("Match starts in {seconds}..."), host);
        self.broadcast_sound(&SoundTag::COUNTDOWN, host);
    }

    fn activate(&mut self, host: &mut impl Host) -> Option<MatchOutcome> {
        self.step(MatchState::Active);
        self.broadcast_message("Fight!", host);
        self.broadcast_sound(&SoundTag::MATCH_START, host);
        // Someone may have left during the countdown.
        self.check_end(host)
    }

    /// Ends the match if its end condition holds.
    ///
    /// Elimination is checked before the time limit, so a team wiped out
    /// on the last tick still loses.
    pub(crate) fn check_end(&mut self, host: &mut impl Host) -> Option<MatchOutcome> {
        if self.state != MatchState::Active {
            return None;
        }

        let standing: Vec<TeamColor> =
            self.roster.standing_teams().map(GameTeam::color).collect();
        if standing.len() <= 1 {
            return self.end(standing.first().copied(), EndReason::Elimination, host);
        }

        if let Some(limit) = self.config.time_limit_ticks {
            if self.active_ticks >= limit {
                let leader = self.leading_team();
                return self.end(leader, EndReason::TimeLimit, host);
            }
        }
        None
    }

    /// The team with strictly the most members alive.
    fn leading_team(&self) -> Option<TeamColor> {
        let best = self.roster.teams().iter().map(GameTeam::alive_count).max()?;
        let mut leaders = self
            .roster
            .teams()
            .iter()
            .filter(|t| t.alive_count() == best);
        match (leaders.next(), leaders.next()) {
            (Some(team), None) => Some(team.color()),
            _ => None,
        }
    }

    /// Decides the result, moves to `Ending`, and broadcasts it to players
    /// and spectators. No-op once a result exists.
    fn end(
        &mut self,
        winner: Option<TeamColor>,
        reason: EndReason,
        host: &mut impl Host,
    ) -> Option<MatchOutcome> {
        if !self.state.is_live() {
            return None;
        }
        self.step(MatchState::Active);
        self.step(MatchState::Ending);

        let (winners, losers): (Vec<PlayerId>, Vec<PlayerId>) =
            self.roster.teams().iter().fold(
                (Vec::new(), Vec::new()),
                |(mut winners, mut losers), team| {
                    if Some(team.color()) == winner {
                        winners.extend(team.player_ids());
                    } else {
                        losers.extend(team.player_ids());
                    }
                    (winners, losers)
                },
            );

        let outcome = MatchOutcome {
            match_id: self.id,
            origin: self.origin,
            context: self.context.clone(),
            winner,
            reason,
            winners,
            losers,
            duration_ticks: self.ticks,
        };

        let text = match winner {
            Some(color) => format!("{color} team wins! ({reason}, {})", self.elapsed_time()),
            None => format!("Draw ({reason}, {})", self.elapsed_time()),
        };
        self.broadcast_message_all(&text, host);
        self.broadcast_sound_all(&SoundTag::MATCH_END, host);

        info!(
            match_id = %self.id,
            winner = ?winner,
            %reason,
            duration_ticks = self.ticks,
            "match ended"
        );
        self.outcome = Some(outcome.clone());
        Some(outcome)
    }

    /// Ends the match in favor of the other side.
    ///
    /// With more than two teams the win only goes to a team if exactly one
    /// other team is still standing. Forfeiting a decided match is a no-op.
    pub fn forfeit(
        &mut self,
        team: TeamColor,
        host: &mut impl Host,
    ) -> Result<Option<MatchOutcome>, MatchError> {
        if self.roster.team(team).is_none() {
            return Err(MatchError::UnknownTeam(team, self.id));
        }
        if !self.state.is_live() {
            return Ok(None);
        }
        let others: Vec<TeamColor> = self
            .roster
            .standing_teams()
            .map(GameTeam::color)
            .filter(|c| *c != team)
            .collect();
        let winner = match others.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        Ok(self.end(winner, EndReason::Forfeit { team }, host))
    }

    /// Stops the match without a winner.
    pub fn abort(&mut self, host: &mut impl Host) -> Option<MatchOutcome> {
        self.end(None, EndReason::Aborted, host)
    }

    /// Handles a combatant being knocked out.
    pub fn eliminate(
        &mut self,
        player: PlayerId,
        by: Option<PlayerId>,
        host: &mut impl Host,
        tasks: &mut crate::MatchTasks,
    ) -> Result<Option<MatchOutcome>, MatchError> {
        if !self.state.accepts_eliminations() {
            return Err(MatchError::InvalidState {
                match_id: self.id,
                state: self.state,
                action: "eliminate",
            });
        }
        let member = self
            .roster
            .find_member(player)
            .ok_or(MatchError::NotInMatch(player, self.id))?;
        if !member.alive {
            return Err(MatchError::AlreadyEliminated(player));
        }

        let text = match by {
            Some(killer) => format!("{player} was eliminated by {killer}."),
            None => format!("{player} was eliminated."),
        };
        self.broadcast_message(&text, host);
        self.add_spectator(
            player,
            crate::SpectateOrigin::Elimination,
            &[],
            host,
            tasks,
        )?;
        Ok(self.check_end(host))
    }

    /// Handles a player's connection dropping.
    ///
    /// A live combatant is marked out without the elimination flourish.
    /// A spectator simply leaves the spectator set.
    pub fn disconnect(
        &mut self,
        player: PlayerId,
        host: &mut impl Host,
    ) -> Result<Option<MatchOutcome>, MatchError> {
        let live = self.state.is_live();
        if let Some(member) = self.roster.find_member_mut(player) {
            let was_alive = member.alive;
            if live {
                member.alive = false;
            }
            self.settling.remove(&player);
            self.spectators.remove(&player);

            if was_alive && live {
                debug!(match_id = %self.id, %player, "combatant disconnected");
                self.broadcast_message(&format!("{player} disconnected."), host);
                return Ok(self.check_end(host));
            }
            return Ok(None);
        }

        if self.spectators.remove(&player) {
            debug!(match_id = %self.id, %player, "spectator disconnected");
            return Ok(None);
        }
        Err(MatchError::NotInMatch(player, self.id))
    }

    /// Finishes the match: `Ending` → `Ended`, arena restored, every
    /// participant released. Returns the released identities.
    ///
    /// Voluntary spectators were hidden from everyone in `online` when they
    /// joined, so they are shown to all of them again here.
    ///
    /// Calling it again after `Ended` does nothing.
    pub fn teardown(&mut self, online: &[PlayerId], host: &mut impl Host) -> Vec<PlayerId> {
        match self.state {
            MatchState::Ended => return Vec::new(),
            MatchState::Starting | MatchState::Active => {
                debug_assert!(false, "teardown of {} before it ended", self.id);
                warn!(match_id = %self.id, state = %self.state, "teardown ignored");
                return Vec::new();
            }
            MatchState::Ending => {}
        }

        self.step(MatchState::Ended);
        let restored = self.clear_arena_mutations(host);
        self.settling.clear();

        let released = self.audience();
        for &player in &released {
            report(host.clear_modifiers(player), "clear modifiers");
            report(host.set_flight(player, false, false), "flight");
            for &other in &released {
                if other != player {
                    report(host.show(player, other), "show");
                }
            }
        }
        for player in released.iter().filter(|p| !self.roster.contains(**p)) {
            for &other in online.iter().filter(|p| !released.contains(*p)) {
                report(host.show(other, *player), "show");
                report(host.show(*player, other), "show");
            }
        }

        info!(
            match_id = %self.id,
            restored_cells = restored,
            released = released.len(),
            "match torn down"
        );
        released
    }

    // -- arena --------------------------------------------------------------

    /// Records an arena cell changed by gameplay. Ignored once `Ended`.
    pub fn record_block_change(&mut self, pos: BlockPos) -> bool {
        if self.state.is_terminal() {
            warn!(match_id = %self.id, %pos, "block change after match ended");
            return false;
        }
        self.snapshot.record(pos)
    }

    /// Restores every recorded cell to empty. Safe to call repeatedly.
    pub fn clear_arena_mutations(&mut self, host: &mut impl Host) -> usize {
        self.snapshot.restore(host)
    }

    pub fn snapshot(&self) -> &ArenaSnapshot {
        &self.snapshot
    }

    // -- broadcasts ---------------------------------------------------------

    /// Sends `text` to every team member, alive or not.
    pub fn broadcast_message(&self, text: &str, host: &mut impl PlayerControl) {
        for player in self.everyone() {
            report(host.send_message(player, text), "message");
        }
    }

    /// Plays `sound` for every team member, alive or not.
    pub fn broadcast_sound(&self, sound: &SoundTag, host: &mut impl PlayerControl) {
        for player in self.everyone() {
            report(host.play_sound(player, sound), "sound");
        }
    }

    /// Like [`broadcast_message`](Self::broadcast_message), plus
    /// voluntary spectators.
    pub fn broadcast_message_all(&self, text: &str, host: &mut impl PlayerControl) {
        for player in self.audience() {
            report(host.send_message(player, text), "message");
        }
    }

    pub fn broadcast_sound_all(&self, sound: &SoundTag, host: &mut impl PlayerControl) {
        for player in self.audience() {
            report(host.play_sound(player, sound), "sound");
        }
    }

    // -- queries ------------------------------------------------------------

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn context(&self) -> &MatchContext {
        &self.context
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn origin(&self) -> QueueId {
        self.origin
    }

    /// The arena template the match was created from.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_copy(&self) -> Option<&Arena> {
        self.arena_copy.as_ref()
    }

    /// The arena actually played on: the isolated copy if there is one.
    pub fn working_arena(&self) -> &Arena {
        self.arena_copy.as_ref().unwrap_or(&self.arena)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn teams(&self) -> &[GameTeam] {
        self.roster.teams()
    }

    pub fn find_team(&self, player: PlayerId) -> Option<&GameTeam> {
        self.roster.find_team(player)
    }

    pub fn find_opposing_team(&self, player: PlayerId) -> Option<&GameTeam> {
        self.roster.find_opposing_team(player)
    }

    pub fn opposing_team_of(&self, color: TeamColor) -> Option<&GameTeam> {
        self.roster.opposing_team_of(color)
    }

    /// Every roster member, in team order.
    pub fn members(&self) -> impl Iterator<Item = &TeamMember> + '_ {
        self.roster.members()
    }

    /// Every roster member's identity, alive or not.
    pub fn everyone(&self) -> Vec<PlayerId> {
        self.roster.members().map(|m| m.player_id).collect()
    }

    /// Members still in the fight.
    pub fn alive_members(&self) -> Vec<PlayerId> {
        self.roster
            .members()
            .filter(|m| m.alive && !self.spectators.contains(&m.player_id))
            .map(|m| m.player_id)
            .collect()
    }

    /// Roster members followed by voluntary spectators.
    pub fn audience(&self) -> Vec<PlayerId> {
        let mut audience = self.everyone();
        audience.extend(
            self.spectators
                .iter()
                .copied()
                .filter(|p| !self.roster.contains(*p)),
        );
        audience
    }

    pub fn spectators(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.spectators.iter().copied()
    }

    pub fn is_spectator(&self, player: PlayerId) -> bool {
        self.spectators.contains(&player)
    }

    /// Whether `player`'s elimination transition is still waiting for its
    /// settle step.
    pub fn is_settling(&self, player: PlayerId) -> bool {
        self.settling.contains(&player)
    }

    /// Whether `player` is on the roster or spectating.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.roster.contains(player) || self.spectators.contains(&player)
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.ticks * 1000 / u64::from(self.ticks_per_second()))
    }

    /// Time since creation as `mm:ss`.
    pub fn elapsed_time(&self) -> String {
        let secs = self.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            id: self.id,
            state: self.state,
            mode: self.context.to_string(),
            arena: self.working_arena().name.clone(),
            teams: self
                .roster
                .teams()
                .iter()
                .map(|t| TeamSummary {
                    color: t.color(),
                    alive: t.alive_count(),
                    size: t.len(),
                })
                .collect(),
            spectators: self.spectators.len(),
            elapsed: self.elapsed_time(),
        }
    }

    fn ticks_per_second(&self) -> u32 {
        self.config.ticks_per_second.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_protocol::{Location, RecordingHost};

    fn pid(n: u64) -> PlayerId {
        PlayerId(n)
    }

    fn request() -> MatchRequest {
        MatchRequest {
            context: MatchContext::casual("1v1"),
            loadout: Loadout::new("sword"),
            arena: Arena::new("canyon", Location::new(0.0, 80.0, 0.0)).with_spawns([
                Location::new(-20.0, 64.0, 0.0),
                Location::new(20.0, 64.0, 0.0),
            ]),
            origin: QueueId(1),
            teams: vec![
                GameTeam::new(TeamColor::Red, [pid(1)]),
                GameTeam::new(TeamColor::Blue, [pid(2)]),
            ],
        }
    }

    fn session(config: MatchConfig) -> MatchSession {
        MatchSession::new(MatchId(1), request(), config).expect("valid request")
    }

    fn quick() -> MatchConfig {
        MatchConfig {
            countdown_ticks: 40,
            ..MatchConfig::default()
        }
    }

    #[test]
    fn test_new_session_starts_in_starting() {
        let session = session(quick());
        assert_eq!(session.state(), MatchState::Starting);
        assert_eq!(session.everyone(), vec![pid(1), pid(2)]);
        assert_eq!(session.alive_members(), vec![pid(1), pid(2)]);
        assert!(session.arena_copy().is_none());
    }

    #[test]
    fn test_advance_to_same_state_is_noop() {
        let mut session = session(quick());
        assert_eq!(session.advance_to(MatchState::Starting), Ok(false));
        assert_eq!(session.advance_to(MatchState::Active), Ok(true));
        assert_eq!(session.advance_to(MatchState::Active), Ok(false));
        assert_eq!(session.advance_to(MatchState::Starting), Ok(false));
        assert_eq!(session.state(), MatchState::Active);
    }

    #[test]
    fn test_advance_to_skipping_state_fails() {
        let mut session = session(quick());
        let result = session.advance_to(MatchState::Ended);
        assert_eq!(
            result,
            Err(MatchError::InvalidTransition {
                from: MatchState::Starting,
                to: MatchState::Ended
            })
        );
        assert_eq!(session.state(), MatchState::Starting);
    }

    #[test]
    fn test_start_places_teams_at_their_spawns() {
        let mut host = RecordingHost::new();
        let mut session = session(quick());
        session.start(&mut host);

        assert!(host.calls().contains(&skirmish_protocol::HostCall::Teleport {
            player: pid(2),
            to: Location::new(20.0, 64.0, 0.0),
        }));
        assert!(host.messages_for(pid(1)).contains(&"Match starts in 2..."));
    }

    #[test]
    fn test_countdown_activates_after_configured_ticks() {
        let mut host = RecordingHost::new();
        let mut session = session(quick());
        session.start(&mut host);

        for _ in 0..39 {
            assert!(session.tick(&mut host).is_none());
        }
        assert_eq!(session.state(), MatchState::Starting);
        assert!(host.messages_for(pid(2)).contains(&"Match starts in 1..."));

        session.tick(&mut host);
        assert_eq!(session.state(), MatchState::Active);
        assert_eq!(host.messages_for(pid(1)).last(), Some(&"Fight!"));
    }

    #[test]
    fn test_time_limit_with_tied_teams_is_draw() {
        let mut host = RecordingHost::new();
        let mut session = session(MatchConfig {
            countdown_ticks: 1,
            time_limit_ticks: Some(5),
            ..MatchConfig::default()
        });
        session.start(&mut host);

        let mut outcome = None;
        for _ in 0..10 {
            if let Some(o) = session.tick(&mut host) {
                outcome = Some(o);
                break;
            }
        }

        let outcome = outcome.expect("time limit reached");
        assert_eq!(outcome.reason, EndReason::TimeLimit);
        assert_eq!(outcome.winner, None);
        assert_eq!(session.state(), MatchState::Ending);
    }

    #[test]
    fn test_forfeit_awards_other_team() {
        let mut host = RecordingHost::new();
        let mut session = session(quick());

        let outcome = session
            .forfeit(TeamColor::Red, &mut host)
            .expect("known team")
            .expect("match was live");

        assert_eq!(outcome.winner, Some(TeamColor::Blue));
        assert_eq!(outcome.winners, vec![pid(2)]);
        assert_eq!(outcome.losers, vec![pid(1)]);
        assert_eq!(session.state(), MatchState::Ending);

        // Second forfeit is a no-op.
        assert_eq!(session.forfeit(TeamColor::Blue, &mut host), Ok(None));
    }

    #[test]
    fn test_forfeit_unknown_team_fails() {
        let mut host = RecordingHost::new();
        let mut session = session(quick());
        assert_eq!(
            session.forfeit(TeamColor::Green, &mut host),
            Err(MatchError::UnknownTeam(TeamColor::Green, MatchId(1)))
        );
    }

    #[test]
    fn test_disconnect_during_countdown_ends_on_activation() {
        let mut host = RecordingHost::new();
        let mut session = session(MatchConfig {
            countdown_ticks: 2,
            ..MatchConfig::default()
        });
        session.start(&mut host);

        assert_eq!(session.disconnect(pid(1), &mut host), Ok(None));
        session.tick(&mut host);
        let outcome = session.tick(&mut host).expect("ends on activation");

        assert_eq!(outcome.reason, EndReason::Elimination);
        assert_eq!(outcome.winner, Some(TeamColor::Blue));
    }

    #[test]
    fn test_disconnect_unknown_player_fails() {
        let mut host = RecordingHost::new();
        let mut session = session(quick());
        assert_eq!(
            session.disconnect(pid(9), &mut host),
            Err(MatchError::NotInMatch(pid(9), MatchId(1)))
        );
    }

    #[test]
    fn test_teardown_restores_arena_and_is_idempotent() {
        let mut host = RecordingHost::new();
        let mut session = session(quick());
        let pos = BlockPos::new(3, 65, 3);
        host.set_cell(pos, "cobblestone");
        assert!(session.record_block_change(pos));

        session.abort(&mut host);
        let released = session.teardown(&[], &mut host);

        assert_eq!(released, vec![pid(1), pid(2)]);
        assert_eq!(session.state(), MatchState::Ended);
        assert_eq!(host.cell(pos), None);
        assert!(session.snapshot().is_empty());
        assert!(session.teardown(&[], &mut host).is_empty());
        assert!(!session.record_block_change(pos));
    }

    #[test]
    fn test_isolated_arena_gets_copy() {
        let session = session(MatchConfig {
            isolate_arena: true,
            ..MatchConfig::default()
        });
        let copy = session.arena_copy().expect("isolated");
        assert_eq!(copy.name, "canyon#M-1");
        assert_eq!(session.working_arena().name, "canyon#M-1");
        assert_eq!(session.arena().name, "canyon");
    }

    #[test]
    fn test_elapsed_time_formats_minutes_and_seconds() {
        let mut host = RecordingHost::new();
        let mut session = session(MatchConfig {
            countdown_ticks: 1,
            time_limit_ticks: None,
            ..MatchConfig::default()
        });
        assert_eq!(session.elapsed_time(), "00:00");
        for _ in 0..(20 * 75) {
            session.tick(&mut host);
        }
        assert_eq!(session.elapsed_time(), "01:15");
    }

    #[test]
    fn test_summary_reports_teams() {
        let session = session(quick());
        let summary = session.summary();
        assert_eq!(summary.state, MatchState::Starting);
        assert_eq!(summary.mode, "1v1");
        assert_eq!(summary.teams.len(), 2);
        assert_eq!(summary.teams[0].alive, 1);
    }
}
