//! Turning a player into a spectator.
//!
//! Two entry points share one spectator set:
//!
//! - **Elimination**: the player was knocked out. Everyone else watches a
//!   lightning strike and a defeated impostor at the spot where it
//!   happened, while the real player is held in place. `settle_ticks`
//!   later the settle step hides them from the survivors and gives them
//!   spectator movement.
//! - **Voluntary**: someone outside the fight asked to watch. They are
//!   moved to the arena's vantage point, made invisible to everyone, and
//!   shown the surviving combatants.
//!
//! A player whose elimination has not settled yet can't be converted
//! again.

use skirmish_protocol::{
    EffectTag, Host, ModifierKind, PlayerId, SoundTag, StatusModifier,
};
use tracing::{debug, warn};

use crate::session::report;
use crate::{MatchError, MatchSession, MatchTask, MatchTasks};

/// Why a player is becoming a spectator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectateOrigin {
    /// Knocked out of the fight.
    Elimination,
    /// Asked to watch.
    Voluntary,
}

impl MatchSession {
    /// Converts `player` into a spectator of this match.
    ///
    /// `online` is every identity currently on the server; voluntary
    /// spectators are hidden from all of them and vice versa.
    pub fn add_spectator(
        &mut self,
        player: PlayerId,
        origin: SpectateOrigin,
        online: &[PlayerId],
        host: &mut impl Host,
        tasks: &mut MatchTasks,
    ) -> Result<(), MatchError> {
        if self.state().is_terminal() {
            return Err(MatchError::InvalidState {
                match_id: self.id,
                state: self.state(),
                action: "add a spectator",
            });
        }
        if self.settling.contains(&player) {
            return Err(MatchError::TransitionInProgress(player));
        }
        if self.spectators.contains(&player) {
            return Err(MatchError::AlreadySpectating(player));
        }

        match origin {
            SpectateOrigin::Elimination => {
                let Some(member) = self.roster.find_member_mut(player) else {
                    debug_assert!(false, "elimination of {player} outside the roster");
                    warn!(match_id = %self.id, %player, "elimination outside the roster");
                    return Err(MatchError::NotInMatch(player, self.id));
                };
                member.alive = false;
                self.spectators.insert(player);
                self.play_elimination(player, host, tasks);
            }
            SpectateOrigin::Voluntary => {
                match self.roster.find_member(player) {
                    Some(member) if member.alive => {
                        return Err(MatchError::StillCompeting(player));
                    }
                    Some(_) => {}
                    None if !self.config.allow_spectators => {
                        return Err(MatchError::SpectatorsDisabled(self.id));
                    }
                    None => {}
                }
                self.spectators.insert(player);
                self.place_watcher(player, online, host);
            }
        }

        debug!(match_id = %self.id, %player, ?origin, "spectator added");
        Ok(())
    }

    /// Immediate half of the elimination transition.
    fn play_elimination(
        &mut self,
        player: PlayerId,
        host: &mut impl Host,
        tasks: &mut MatchTasks,
    ) {
        let observers: Vec<PlayerId> = self
            .audience()
            .into_iter()
            .filter(|p| *p != player)
            .collect();

        // No last position means nowhere to stage the flourish.
        let impostor = match host.location(player) {
            Some(at) => {
                let mut audience = observers.clone();
                audience.push(player);
                report(
                    host.dispatch_effect(at, &EffectTag::LIGHTNING, &SoundTag::THUNDER, &audience),
                    "elimination effect",
                );
                report(host.spawn_impostor(player, at), "spawn impostor")
            }
            None => {
                debug!(match_id = %self.id, %player, "no location, skipping elimination effect");
                None
            }
        };
        for &observer in &observers {
            report(host.remove_listing(observer, player), "remove listing");
            if let Some(impostor) = impostor {
                report(host.show_impostor(observer, impostor), "show impostor");
                report(host.mark_defeated(observer, impostor), "mark defeated");
            }
        }

        report(host.set_walk_speed(player, 0.0), "walk speed");
        report(
            host.apply_modifier(
                player,
                StatusModifier::permanent(
                    ModifierKind::Jump,
                    self.config.freeze_jump_amplifier,
                ),
            ),
            "freeze",
        );

        self.settling.insert(player);
        tasks.schedule(
            self.id,
            u64::from(self.config.settle_ticks),
            MatchTask::SettleSpectator { player },
        );
    }

    /// Deferred half of the elimination transition.
    ///
    /// Returns `false` if there was nothing to settle (the player left, or
    /// the match was torn down in between).
    pub fn settle_spectator(&mut self, player: PlayerId, host: &mut impl Host) -> bool {
        if !self.settling.remove(&player) {
            return false;
        }

        for alive in self.alive_members() {
            report(host.hide(alive, player), "hide");
        }
        report(host.clear_modifiers(player), "clear modifiers");
        report(host.set_fly_speed(player, self.config.spectator_fly_speed), "fly speed");
        report(
            host.set_walk_speed(player, self.config.spectator_walk_speed),
            "walk speed",
        );
        report(host.set_flight(player, true, false), "flight");

        debug!(match_id = %self.id, %player, "spectator settled");
        true
    }

    fn place_watcher(&self, player: PlayerId, online: &[PlayerId], host: &mut impl Host) {
        report(host.reset(player), "reset");
        if !host.has_staff_role(player) {
            self.broadcast_message(&format!("{player} is now spectating the match."), host);
        }
        report(host.teleport(player, self.working_arena().vantage), "teleport");
        report(host.set_flight(player, true, true), "flight");

        for &other in online.iter().filter(|p| **p != player) {
            report(host.hide(other, player), "hide");
            report(host.hide(player, other), "hide");
        }
        for alive in self.alive_members() {
            report(host.show(player, alive), "show");
        }
    }

    /// Takes a voluntary spectator back out of the match and makes them
    /// visible again. Eliminated combatants stay until teardown.
    pub fn stop_spectating(
        &mut self,
        player: PlayerId,
        online: &[PlayerId],
        host: &mut impl Host,
    ) -> Result<(), MatchError> {
        if self.roster.contains(player) || !self.spectators.remove(&player) {
            return Err(MatchError::NotSpectating(player));
        }

        for &other in online.iter().filter(|p| **p != player) {
            report(host.show(other, player), "show");
            report(host.show(player, other), "show");
        }
        report(host.set_flight(player, false, false), "flight");
        report(host.reset(player), "reset");

        debug!(match_id = %self.id, %player, "spectator left");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_protocol::{HostCall, Location, MatchId, QueueId, RecordingHost, TeamColor};

    use crate::{Arena, GameTeam, Loadout, MatchConfig, MatchContext, MatchRequest, MatchState};

    fn pid(n: u64) -> PlayerId {
        PlayerId(n)
    }

    fn active_match(teams: Vec<GameTeam>) -> MatchSession {
        let request = MatchRequest {
            context: MatchContext::casual("test"),
            loadout: Loadout::new("kit"),
            arena: Arena::new("pit", Location::new(0.0, 90.0, 0.0)),
            origin: QueueId(1),
            teams,
        };
        let mut session =
            MatchSession::new(MatchId(7), request, MatchConfig::default()).expect("valid");
        session.advance_to(MatchState::Active).expect("one step");
        session
    }

    fn two_v_one() -> MatchSession {
        active_match(vec![
            GameTeam::new(TeamColor::Red, [pid(1), pid(3)]),
            GameTeam::new(TeamColor::Blue, [pid(2)]),
        ])
    }

    #[test]
    fn test_elimination_plays_effect_for_everyone_and_freezes_player() {
        let mut host = RecordingHost::new();
        let spot = Location::new(4.0, 64.0, -2.0).facing(90.0, 10.0);
        host.place(pid(1), spot);
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();

        session
            .add_spectator(pid(1), SpectateOrigin::Elimination, &[], &mut host, &mut tasks)
            .expect("member");

        let calls = host.calls();
        assert_eq!(
            calls[0],
            HostCall::Effect {
                at: spot,
                effect: EffectTag::LIGHTNING,
                sound: SoundTag::THUNDER,
                audience: vec![pid(3), pid(2), pid(1)],
            }
        );
        assert!(calls.contains(&HostCall::SpawnImpostor {
            template: pid(1),
            at: spot,
            impostor: skirmish_protocol::ImpostorId(1),
        }));
        assert!(calls.contains(&HostCall::WalkSpeed { player: pid(1), speed: 0.0 }));
        assert!(calls.contains(&HostCall::Modifier {
            player: pid(1),
            modifier: StatusModifier::permanent(ModifierKind::Jump, -5),
        }));
        assert!(session.is_settling(pid(1)));
        assert_eq!(tasks.pending_for(&MatchId(7)), 1);
    }

    #[test]
    fn test_elimination_without_location_skips_effect_and_impostor() {
        let mut host = RecordingHost::new();
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();

        session
            .add_spectator(pid(1), SpectateOrigin::Elimination, &[], &mut host, &mut tasks)
            .expect("member");

        let calls = host.calls();
        assert!(!calls.iter().any(|c| matches!(
            c,
            HostCall::Effect { .. } | HostCall::SpawnImpostor { .. } | HostCall::ShowImpostor { .. }
        )));
        assert!(calls.contains(&HostCall::RemoveListing { observer: pid(2), subject: pid(1) }));
        assert!(calls.contains(&HostCall::WalkSpeed { player: pid(1), speed: 0.0 }));
        assert!(session.is_settling(pid(1)));
        assert_eq!(tasks.pending_for(&MatchId(7)), 1);
    }

    #[test]
    fn test_elimination_per_observer_order() {
        let mut host = RecordingHost::new();
        host.place(pid(1), Location::new(0.0, 64.0, 0.0));
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();

        session
            .add_spectator(pid(1), SpectateOrigin::Elimination, &[], &mut host, &mut tasks)
            .expect("member");

        let for_p2: Vec<&HostCall> = host
            .calls()
            .iter()
            .filter(|c| {
                matches!(c,
                    HostCall::RemoveListing { observer, .. }
                    | HostCall::ShowImpostor { observer, .. }
                    | HostCall::MarkDefeated { observer, .. } if *observer == pid(2))
            })
            .collect();
        assert!(matches!(for_p2[0], HostCall::RemoveListing { subject, .. } if *subject == pid(1)));
        assert!(matches!(for_p2[1], HostCall::ShowImpostor { .. }));
        assert!(matches!(for_p2[2], HostCall::MarkDefeated { .. }));
    }

    #[test]
    fn test_second_conversion_while_settling_is_rejected() {
        let mut host = RecordingHost::new();
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();
        session
            .add_spectator(pid(1), SpectateOrigin::Elimination, &[], &mut host, &mut tasks)
            .expect("first");
        let calls_before = host.calls().len();

        let again = session.add_spectator(
            pid(1),
            SpectateOrigin::Voluntary,
            &[pid(1), pid(2), pid(3)],
            &mut host,
            &mut tasks,
        );

        assert_eq!(again, Err(MatchError::TransitionInProgress(pid(1))));
        assert_eq!(host.calls().len(), calls_before, "no host side effects");
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_settle_hides_from_alive_and_restores_movement() {
        let mut host = RecordingHost::new();
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();
        session
            .add_spectator(pid(1), SpectateOrigin::Elimination, &[], &mut host, &mut tasks)
            .expect("member");
        host.take_calls();

        assert!(session.settle_spectator(pid(1), &mut host));

        assert!(host.is_hidden(pid(2), pid(1)));
        assert!(host.is_hidden(pid(3), pid(1)));
        let calls = host.calls();
        assert!(calls.contains(&HostCall::ClearModifiers { player: pid(1) }));
        assert!(calls.contains(&HostCall::FlySpeed { player: pid(1), speed: 0.4 }));
        assert!(calls.contains(&HostCall::WalkSpeed { player: pid(1), speed: 0.2 }));
        assert!(calls.contains(&HostCall::Flight { player: pid(1), allow: true, flying: false }));
        assert!(!session.is_settling(pid(1)));

        assert!(!session.settle_spectator(pid(1), &mut host), "second settle is stale");
    }

    #[test]
    fn test_settle_after_player_left_still_settles_for_others() {
        let mut host = RecordingHost::new();
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();
        session
            .add_spectator(pid(1), SpectateOrigin::Elimination, &[], &mut host, &mut tasks)
            .expect("member");
        host.disconnect(pid(1));

        assert!(session.settle_spectator(pid(1), &mut host));
        assert!(host.is_hidden(pid(2), pid(1)));
    }

    #[test]
    fn test_voluntary_spectator_outside_roster_keeps_alive_counts() {
        let mut host = RecordingHost::new();
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();
        let online = [pid(1), pid(2), pid(3), pid(9)];

        session
            .add_spectator(pid(9), SpectateOrigin::Voluntary, &online, &mut host, &mut tasks)
            .expect("bystander");

        assert!(session.is_spectator(pid(9)));
        assert_eq!(session.alive_members(), vec![pid(1), pid(3), pid(2)]);
        assert!(tasks.is_empty());
        assert_eq!(
            host.messages_for(pid(2)),
            vec!["P-9 is now spectating the match."]
        );
        assert!(host.calls().contains(&HostCall::Teleport {
            player: pid(9),
            to: Location::new(0.0, 90.0, 0.0),
        }));
        assert!(host.is_hidden(pid(1), pid(9)));
        // Hidden both ways, then alive members shown again.
        assert!(!host.is_hidden(pid(9), pid(1)));
        assert!(!host.is_hidden(pid(9), pid(2)));
    }

    #[test]
    fn test_voluntary_staff_spectator_is_silent() {
        let mut host = RecordingHost::new();
        host.grant_staff(pid(9));
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();

        session
            .add_spectator(pid(9), SpectateOrigin::Voluntary, &[pid(9)], &mut host, &mut tasks)
            .expect("staff");

        assert!(host.messages_for(pid(1)).is_empty());
    }

    #[test]
    fn test_voluntary_for_alive_combatant_is_rejected() {
        let mut host = RecordingHost::new();
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();

        let result =
            session.add_spectator(pid(2), SpectateOrigin::Voluntary, &[], &mut host, &mut tasks);
        assert_eq!(result, Err(MatchError::StillCompeting(pid(2))));
    }

    #[test]
    fn test_voluntary_when_disabled_is_rejected() {
        let mut host = RecordingHost::new();
        let mut tasks = MatchTasks::new();
        let request = MatchRequest {
            context: MatchContext::casual("test"),
            loadout: Loadout::new("kit"),
            arena: Arena::new("pit", Location::new(0.0, 90.0, 0.0)),
            origin: QueueId(1),
            teams: vec![
                GameTeam::new(TeamColor::Red, [pid(1)]),
                GameTeam::new(TeamColor::Blue, [pid(2)]),
            ],
        };
        let config = MatchConfig {
            allow_spectators: false,
            ..MatchConfig::default()
        };
        let mut session = MatchSession::new(MatchId(3), request, config).expect("valid");

        let result =
            session.add_spectator(pid(9), SpectateOrigin::Voluntary, &[], &mut host, &mut tasks);
        assert_eq!(result, Err(MatchError::SpectatorsDisabled(MatchId(3))));
    }

    #[test]
    fn test_stop_spectating_restores_visibility() {
        let mut host = RecordingHost::new();
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();
        let online = [pid(1), pid(9)];
        session
            .add_spectator(pid(9), SpectateOrigin::Voluntary, &online, &mut host, &mut tasks)
            .expect("bystander");

        session.stop_spectating(pid(9), &online, &mut host).expect("spectating");

        assert!(!session.is_spectator(pid(9)));
        assert!(!host.is_hidden(pid(1), pid(9)));
        assert_eq!(
            session.stop_spectating(pid(9), &online, &mut host),
            Err(MatchError::NotSpectating(pid(9)))
        );
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "outside the roster")]
    fn test_elimination_outside_roster_panics_in_debug() {
        let mut host = RecordingHost::new();
        let mut tasks = MatchTasks::new();
        let mut session = two_v_one();
        let _ = session.add_spectator(
            pid(42),
            SpectateOrigin::Elimination,
            &[],
            &mut host,
            &mut tasks,
        );
    }
}
