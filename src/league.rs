// League and member domain types.
//
// Leagues and members are created by the membership system, which is outside
// this crate's core; the transaction engine observes them and performs only
// the phase transitions tied to draft lifecycle.

use serde::{Deserialize, Serialize};

use crate::roster::slots::RosterCounts;

/// Where a league currently sits in its season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaguePhase {
    Setup,
    Drafting,
    PreWeek,
    WeekActive,
    Complete,
}

/// A season container. Mutated only by phase-transition operations; the
/// draft and trade engines read it but never write settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub id: String,
    pub name: String,
    pub num_teams: usize,
    pub current_week: u32,
    pub phase: LeaguePhase,
    pub roster_counts: RosterCounts,
    pub draft_rounds: u32,
    /// Pick-clock duration in seconds. Zero disables the clock.
    pub pick_clock_secs: u64,
}

impl League {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        num_teams: usize,
        roster_counts: RosterCounts,
        draft_rounds: u32,
        pick_clock_secs: u64,
    ) -> Self {
        League {
            id: id.into(),
            name: name.into(),
            num_teams,
            current_week: 0,
            phase: LeaguePhase::Setup,
            roster_counts,
            draft_rounds,
            pick_clock_secs,
        }
    }
}

/// A team within a league: a human (linked to a user) or a bot.
/// Immutable once created, as far as the transaction engine is concerned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub league_id: String,
    pub name: String,
    /// Identity link for humans; bots have none.
    pub user_id: Option<String>,
    pub is_bot: bool,
    pub is_commissioner: bool,
}

impl Member {
    pub fn human(
        id: impl Into<String>,
        league_id: impl Into<String>,
        name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Member {
            id: id.into(),
            league_id: league_id.into(),
            name: name.into(),
            user_id: Some(user_id.into()),
            is_bot: false,
            is_commissioner: false,
        }
    }

    pub fn bot(
        id: impl Into<String>,
        league_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Member {
            id: id.into(),
            league_id: league_id.into(),
            name: name.into(),
            user_id: None,
            is_bot: true,
            is_commissioner: false,
        }
    }

    pub fn commissioner(mut self) -> Self {
        self.is_commissioner = true;
        self
    }
}
