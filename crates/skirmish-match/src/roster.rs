//! Teams and their members.
//!
//! A [`Roster`] is fixed at match creation. Members are never added or
//! removed afterwards; only their alive flag changes. Spectators who were
//! never on a team live in the match session, not here.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use skirmish_protocol::{PlayerId, TeamColor};

use crate::MatchError;

/// One participant of a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub player_id: PlayerId,
    /// Cleared on elimination or disconnect, never set again.
    pub alive: bool,
}

impl TeamMember {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            alive: true,
        }
    }
}

/// A colored team. Member order is the order the queue formed them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTeam {
    color: TeamColor,
    members: Vec<TeamMember>,
}

impl GameTeam {
    pub fn new(
        color: TeamColor,
        players: impl IntoIterator<Item = PlayerId>,
    ) -> Self {
        Self {
            color,
            members: players.into_iter().map(TeamMember::new).collect(),
        }
    }

    pub fn color(&self) -> TeamColor {
        self.color
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    /// Looks up a member by identity.
    pub fn find(&self, player: PlayerId) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.player_id == player)
    }

    pub(crate) fn find_mut(&mut self, player: PlayerId) -> Option<&mut TeamMember> {
        self.members.iter_mut().find(|m| m.player_id == player)
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.find(player).is_some()
    }

    pub fn alive_count(&self) -> usize {
        self.members.iter().filter(|m| m.alive).count()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.members.iter().map(|m| m.player_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The teams of one match.
///
/// Built through [`Roster::new`], which guarantees at least two teams,
/// no empty team, distinct colors, and no identity on more than one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    teams: Vec<GameTeam>,
}

impl Roster {
    pub fn new(teams: Vec<GameTeam>) -> Result<Self, MatchError> {
        if teams.len() < 2 {
            return Err(MatchError::InvalidRoster(format!(
                "need at least 2 teams, got {}",
                teams.len()
            )));
        }

        let mut colors = HashSet::new();
        let mut seen = HashSet::new();
        for team in &teams {
            if team.is_empty() {
                return Err(MatchError::InvalidRoster(format!(
                    "team {} has no members",
                    team.color
                )));
            }
            if !colors.insert(team.color) {
                return Err(MatchError::InvalidRoster(format!(
                    "team color {} used twice",
                    team.color
                )));
            }
            for player in team.player_ids() {
                if !seen.insert(player) {
                    return Err(MatchError::DuplicateMember(player));
                }
            }
        }

        Ok(Self { teams })
    }

    pub fn teams(&self) -> &[GameTeam] {
        &self.teams
    }

    pub fn team(&self, color: TeamColor) -> Option<&GameTeam> {
        self.teams.iter().find(|t| t.color == color)
    }

    /// Index of the team in formation order. Used to pick spawn points.
    pub fn team_index(&self, color: TeamColor) -> Option<usize> {
        self.teams.iter().position(|t| t.color == color)
    }

    /// The team `player` belongs to.
    pub fn find_team(&self, player: PlayerId) -> Option<&GameTeam> {
        self.teams.iter().find(|t| t.contains(player))
    }

    /// The first team `player` does not belong to.
    ///
    /// `None` when `player` isn't on any team: a bystander has no
    /// opponents.
    pub fn find_opposing_team(&self, player: PlayerId) -> Option<&GameTeam> {
        let own = self.find_team(player)?.color;
        self.opposing_team_of(own)
    }

    /// The first team whose color differs from `color`.
    pub fn opposing_team_of(&self, color: TeamColor) -> Option<&GameTeam> {
        self.teams.iter().find(|t| t.color != color)
    }

    pub fn find_member(&self, player: PlayerId) -> Option<&TeamMember> {
        self.teams.iter().find_map(|t| t.find(player))
    }

    pub(crate) fn find_member_mut(
        &mut self,
        player: PlayerId,
    ) -> Option<&mut TeamMember> {
        self.teams.iter_mut().find_map(|t| t.find_mut(player))
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.find_member(player).is_some()
    }

    /// Every member of every team, alive or not, in team order.
    pub fn members(&self) -> impl Iterator<Item = &TeamMember> + '_ {
        self.teams.iter().flat_map(|t| t.members.iter())
    }

    /// Teams with at least one member still alive.
    pub fn standing_teams(&self) -> impl Iterator<Item = &GameTeam> + '_ {
        self.teams.iter().filter(|t| t.alive_count() > 0)
    }
}
