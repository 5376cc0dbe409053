//! Roster lookups.
//!
//! Team and player management lives outside the engine. The engine only
//! reads from it, through the [`Roster`] trait.

use crate::{PlayerId, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Playing role, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    #[default]
    Batsman,
    Bowler,
    AllRounder,
    WicketKeeper,
}

/// What the roster knows about a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub team: TeamId,
}

/// Resolves player ids. Implementations must not change while a match
/// is being scored.
pub trait Roster: Send + Sync {
    fn player(&self, id: &str) -> Option<&PlayerProfile>;

    /// Display name, falling back to the id for unknown players.
    fn display_name(&self, id: &str) -> String {
        self.player(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// In-memory roster built from two squads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadRoster {
    players: HashMap<PlayerId, PlayerProfile>,
}

impl SquadRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, profile: PlayerProfile) {
        self.players.insert(profile.id.clone(), profile);
    }

    pub fn with_player(
        mut self,
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        team: impl Into<TeamId>,
    ) -> Self {
        self.add(PlayerProfile {
            id: id.into(),
            name: name.into(),
            role: Role::default(),
            team: team.into(),
        });
        self
    }

    /// Players registered for a team.
    pub fn squad<'a>(&'a self, team: &'a str) -> impl Iterator<Item = &'a PlayerProfile> + 'a {
        self.players.values().filter(move |p| p.team == team)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Roster for SquadRoster {
    fn player(&self, id: &str) -> Option<&PlayerProfile> {
        self.players.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_fallback() {
        let roster = SquadRoster::new()
            .with_player("p1", "Asha", "lions")
            .with_player("p2", "Ben", "tigers");

        assert_eq!(roster.player("p1").unwrap().team, "lions");
        assert_eq!(roster.display_name("p2"), "Ben");
        assert_eq!(roster.display_name("ghost"), "ghost");
        assert_eq!(roster.squad("lions").count(), 1);
    }
}
