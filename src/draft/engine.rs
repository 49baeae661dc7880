// Draft state machine: turn order, pick recording, autopick, bot turns.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bot;
use crate::catalog::{Player, PlayerCatalog, PlayerFilter};
use crate::error::{EngineError, EngineResult};
use crate::league::Member;
use crate::rng::{self, Rng};
use crate::roster::store::RosterStore;

use super::order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Scheduled,
    InProgress,
    Completed,
}

/// An immutable record of one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    /// Global 1-based pick number across all rounds.
    pub pick_number: u32,
    pub round: u32,
    pub member_id: String,
    pub player_id: String,
}

/// What a successful pick did to the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// The clock moved to the next pick.
    Advanced,
    /// That was the final pick; the draft is now `Completed` and the caller
    /// must run roster population and flip the league phase.
    Completed,
}

/// A league's draft. Created once the league is full; linear lifecycle
/// `Scheduled -> InProgress -> Completed` with no reverse transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub id: String,
    pub league_id: String,
    pub status: DraftStatus,
    pub rounds: u32,
    /// Global 1-based pick number currently on the clock. Only increases.
    pub current_pick: u32,
    /// Permutation of member ids; index 0 picks first in round one.
    pub order: Vec<String>,
    pub picks: Vec<DraftPick>,
}

impl Draft {
    /// Create a scheduled draft with a uniformly random order.
    pub fn new(
        id: impl Into<String>,
        league_id: impl Into<String>,
        rounds: u32,
        member_ids: Vec<String>,
        rng: &mut dyn Rng,
    ) -> Self {
        let mut order = member_ids;
        rng::shuffle(rng, &mut order);
        Draft {
            id: id.into(),
            league_id: league_id.into(),
            status: DraftStatus::Scheduled,
            rounds,
            current_pick: 1,
            order,
            picks: Vec::new(),
        }
    }

    pub fn num_teams(&self) -> u32 {
        self.order.len() as u32
    }

    pub fn total_picks(&self) -> u32 {
        self.rounds * self.num_teams()
    }

    /// Round the current pick belongs to.
    pub fn current_round(&self) -> u32 {
        order::round_of(self.current_pick.min(self.total_picks()), self.num_teams())
    }

    /// Replace the order with a fresh random permutation. Only permitted
    /// while the draft is still scheduled.
    pub fn reorder(&mut self, rng: &mut dyn Rng) -> EngineResult<()> {
        if self.status != DraftStatus::Scheduled {
            return Err(EngineError::DraftNotScheduled);
        }
        rng::shuffle(rng, &mut self.order);
        Ok(())
    }

    /// Transition `Scheduled -> InProgress`. The caller is responsible for
    /// the league-full check and the league phase flip to drafting.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.status != DraftStatus::Scheduled {
            return Err(EngineError::DraftNotScheduled);
        }
        self.status = DraftStatus::InProgress;
        info!(draft_id = %self.id, teams = self.order.len(), rounds = self.rounds, "draft started");
        Ok(())
    }

    /// The member entitled to the current pick.
    pub fn on_the_clock(&self) -> EngineResult<&str> {
        if self.status != DraftStatus::InProgress {
            return Err(EngineError::DraftNotActive);
        }
        Ok(order::on_the_clock(self.current_pick, &self.order))
    }

    /// Record a human pick for the acting member.
    pub fn make_pick(
        &mut self,
        member_id: &str,
        player_id: &str,
        catalog: &PlayerCatalog,
        rosters: &RosterStore,
    ) -> EngineResult<PickOutcome> {
        if self.on_the_clock()? != member_id {
            return Err(EngineError::NotYourTurn {
                member_id: member_id.to_string(),
            });
        }
        self.ensure_selectable(player_id, catalog, rosters)?;
        Ok(self.apply_pick(member_id.to_string(), player_id.to_string()))
    }

    /// Timer-expiry fallback: select uniformly at random among available
    /// players on behalf of whoever is on the clock.
    ///
    /// Safe to race against a human pick: once the pick for the current
    /// number has landed, the clock has advanced (or the draft completed)
    /// and this path fails with a state error instead of double-picking.
    pub fn auto_pick(
        &mut self,
        catalog: &PlayerCatalog,
        rosters: &RosterStore,
        rng: &mut dyn Rng,
    ) -> EngineResult<(DraftPick, PickOutcome)> {
        let member_id = self.on_the_clock()?.to_string();
        let pool = self.available_players(catalog, rosters, &PlayerFilter::default());
        let player = rng::choose(rng, &pool).ok_or(EngineError::NoAvailablePlayers)?;
        let player_id = player.id.clone();
        debug!(draft_id = %self.id, pick = self.current_pick, member = %member_id, player = %player_id, "auto-pick");
        let outcome = self.apply_pick(member_id, player_id);
        let pick = self.picks.last().expect("apply_pick pushed a pick").clone();
        Ok((pick, outcome))
    }

    /// Process bot turns until a human is on the clock or the draft
    /// completes. Returns the picks made.
    ///
    /// Terminates because every iteration either consumes an available
    /// player (bounded by the pool) or errors: an empty pool surfaces
    /// `NoAvailablePlayers` instead of spinning.
    pub fn run_bot_turns(
        &mut self,
        members: &[Member],
        catalog: &PlayerCatalog,
        rosters: &RosterStore,
        rng: &mut dyn Rng,
    ) -> EngineResult<Vec<DraftPick>> {
        let mut made = Vec::new();
        while self.status == DraftStatus::InProgress {
            let member_id = self.on_the_clock()?.to_string();
            let is_bot = members
                .iter()
                .find(|m| m.id == member_id)
                .map(|m| m.is_bot)
                .unwrap_or(false);
            if !is_bot {
                break;
            }

            let pool = self.available_players(catalog, rosters, &PlayerFilter::default());
            let round = self.current_round();
            let player = bot::draft_selection(&pool, round, self.rounds, rng)
                .ok_or(EngineError::NoAvailablePlayers)?;
            let player_id = player.id.clone();
            self.apply_pick(member_id, player_id);
            made.push(self.picks.last().expect("apply_pick pushed a pick").clone());
        }
        Ok(made)
    }

    /// Undrafted players, additionally excluding anyone already rostered in
    /// the league (the free-agent pool is shared with concurrent activity),
    /// in best-available order. `filter` narrows by position/text/team.
    pub fn available_players<'a>(
        &self,
        catalog: &'a PlayerCatalog,
        rosters: &RosterStore,
        filter: &PlayerFilter,
    ) -> Vec<&'a Player> {
        let picked = self.picked_set();
        catalog
            .search(filter)
            .into_iter()
            .filter(|p| !picked.contains(p.id.as_str()) && !rosters.is_owned(&p.id))
            .collect()
    }

    /// Picks belonging to one member, in pick-number order.
    pub fn picks_for(&self, member_id: &str) -> Vec<&DraftPick> {
        self.picks
            .iter()
            .filter(|p| p.member_id == member_id)
            .collect()
    }

    fn picked_set(&self) -> HashSet<&str> {
        self.picks.iter().map(|p| p.player_id.as_str()).collect()
    }

    fn ensure_selectable(
        &self,
        player_id: &str,
        catalog: &PlayerCatalog,
        rosters: &RosterStore,
    ) -> EngineResult<()> {
        if catalog.get(player_id).is_none() {
            return Err(EngineError::PlayerNotFound {
                player_id: player_id.to_string(),
            });
        }
        if self.picks.iter().any(|p| p.player_id == player_id) {
            return Err(EngineError::PlayerAlreadyDrafted {
                player_id: player_id.to_string(),
            });
        }
        if rosters.is_owned(player_id) {
            return Err(EngineError::PlayerAlreadyOwned {
                player_id: player_id.to_string(),
            });
        }
        Ok(())
    }

    /// Record a validated pick and advance the clock, completing the draft
    /// when the new pick number would exceed `rounds * teams`.
    fn apply_pick(&mut self, member_id: String, player_id: String) -> PickOutcome {
        let pick = DraftPick {
            pick_number: self.current_pick,
            round: order::round_of(self.current_pick, self.num_teams()),
            member_id,
            player_id,
        };
        self.picks.push(pick);
        self.current_pick += 1;

        if self.current_pick > self.total_picks() {
            self.status = DraftStatus::Completed;
            info!(draft_id = %self.id, picks = self.picks.len(), "draft completed");
            PickOutcome::Completed
        } else {
            PickOutcome::Advanced
        }
    }
}
