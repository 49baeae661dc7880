// Multi-party trade negotiation and execution.
//
// A trade is proposed against live rosters, gathers recipient decisions, and
// executes atomically once the last recipient accepts. Terminal states
// (completed, declined, canceled) are absorbing.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::PlayerCatalog;
use crate::error::{EngineError, EngineResult};
use crate::roster::store::{AcquisitionMethod, RosterStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Proposed,
    Completed,
    Declined,
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Proposer,
    Recipient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Pending,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeParticipant {
    pub member_id: String,
    pub role: ParticipantRole,
    pub decision: Decision,
}

/// One player's movement between two participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeItem {
    pub player_id: String,
    pub from_member: String,
    pub to_member: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub league_id: String,
    pub status: TradeStatus,
    pub proposer: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<TradeParticipant>,
    pub items: Vec<TradeItem>,
}

impl Trade {
    /// Validate and create a proposal. Nothing is created on failure.
    ///
    /// Checks, in order: at least one recipient and one item, no duplicate
    /// recipients, the proposer is not a recipient, item endpoints are
    /// distinct participants, no player appears twice, every source owns its
    /// player, and every net-positive receiver has enough open bench slots.
    pub fn propose(
        id: u64,
        league_id: impl Into<String>,
        proposer: impl Into<String>,
        recipients: Vec<String>,
        items: Vec<TradeItem>,
        rosters: &RosterStore,
    ) -> EngineResult<Trade> {
        let proposer = proposer.into();

        if recipients.is_empty() {
            return Err(EngineError::NoRecipients);
        }
        if items.is_empty() {
            return Err(EngineError::NoItems);
        }

        let mut seen_recipients = HashSet::new();
        for recipient in &recipients {
            if !seen_recipients.insert(recipient.as_str()) {
                return Err(EngineError::DuplicateRecipient {
                    member_id: recipient.clone(),
                });
            }
            if *recipient == proposer {
                return Err(EngineError::ProposerIsRecipient);
            }
        }

        let mut participants: HashSet<&str> = seen_recipients;
        participants.insert(proposer.as_str());

        let mut seen_players = HashSet::new();
        for item in &items {
            if item.from_member == item.to_member {
                return Err(EngineError::ItemSourceIsDestination {
                    player_id: item.player_id.clone(),
                });
            }
            for endpoint in [&item.from_member, &item.to_member] {
                if !participants.contains(endpoint.as_str()) {
                    return Err(EngineError::ItemEndpointNotParticipant {
                        member_id: endpoint.clone(),
                    });
                }
            }
            if !seen_players.insert(item.player_id.as_str()) {
                return Err(EngineError::DuplicateItemPlayer {
                    player_id: item.player_id.clone(),
                });
            }
            match rosters.owner_of(&item.player_id) {
                Some(entry) if entry.member_id == item.from_member => {}
                _ => {
                    return Err(EngineError::NotOwner {
                        member_id: item.from_member.clone(),
                        player_id: item.player_id.clone(),
                    })
                }
            }
        }

        // Signed per-member deltas: net receivers need bench room.
        for (member_id, delta) in item_deltas(&items) {
            if delta > 0 {
                let available = rosters.open_bench_count(member_id);
                if available < delta as usize {
                    return Err(EngineError::InsufficientRosterSpace {
                        member_id: member_id.to_string(),
                        required: delta as usize,
                        available,
                    });
                }
            }
        }

        let mut trade_participants = vec![TradeParticipant {
            member_id: proposer.clone(),
            role: ParticipantRole::Proposer,
            decision: Decision::Accepted,
        }];
        trade_participants.extend(recipients.into_iter().map(|member_id| TradeParticipant {
            member_id,
            role: ParticipantRole::Recipient,
            decision: Decision::Pending,
        }));

        Ok(Trade {
            id,
            league_id: league_id.into(),
            status: TradeStatus::Proposed,
            proposer,
            created_at: Utc::now(),
            participants: trade_participants,
            items,
        })
    }

    /// Record a recipient's acceptance. Returns `true` when every recipient
    /// has now accepted, i.e. the caller must execute the trade.
    pub fn accept(&mut self, member_id: &str) -> EngineResult<bool> {
        self.record_decision(member_id, Decision::Accepted)?;
        Ok(self.all_recipients_accepted())
    }

    /// Record a decline; one decline terminates the whole trade immediately.
    pub fn decline(&mut self, member_id: &str) -> EngineResult<()> {
        self.record_decision(member_id, Decision::Declined)?;
        self.status = TradeStatus::Declined;
        info!(trade_id = self.id, member = %member_id, "trade declined");
        Ok(())
    }

    /// Proposer withdraws the trade. Only valid while still proposed.
    pub fn cancel(&mut self, member_id: &str) -> EngineResult<()> {
        if member_id != self.proposer {
            return Err(EngineError::NotProposer {
                member_id: member_id.to_string(),
                trade_id: self.id,
            });
        }
        if self.status != TradeStatus::Proposed {
            return Err(EngineError::TradeNotPending { trade_id: self.id });
        }
        self.status = TradeStatus::Canceled;
        Ok(())
    }

    /// Apply the trade to the rosters: every item's player moves to its
    /// destination's first open bench slot.
    ///
    /// All-or-nothing: items are re-validated and applied against a staged
    /// copy of the store, which only replaces the live store if the whole
    /// trade fits. A stale item (source no longer owns the player, or a
    /// destination ran out of bench room since proposal) cancels the trade
    /// and leaves every roster untouched.
    pub fn execute(
        &mut self,
        rosters: &mut RosterStore,
        catalog: &PlayerCatalog,
    ) -> EngineResult<()> {
        if self.status != TradeStatus::Proposed || !self.all_recipients_accepted() {
            return Err(EngineError::TradeNotPending { trade_id: self.id });
        }

        let mut staged = rosters.clone();
        if let Err(reason) = self.apply_items(&mut staged, catalog) {
            warn!(trade_id = self.id, %reason, "trade went stale; canceling");
            self.status = TradeStatus::Canceled;
            return Err(EngineError::StaleTrade {
                trade_id: self.id,
                reason,
            });
        }

        *rosters = staged;
        self.status = TradeStatus::Completed;
        info!(trade_id = self.id, items = self.items.len(), "trade completed");
        Ok(())
    }

    fn apply_items(&self, staged: &mut RosterStore, catalog: &PlayerCatalog) -> Result<(), String> {
        // Remove every outgoing player first so freed slots are visible to
        // the incoming placements.
        for item in &self.items {
            let entry = match staged.owner_of(&item.player_id) {
                Some(entry) if entry.member_id == item.from_member => entry.id,
                Some(entry) => {
                    return Err(format!(
                        "player `{}` now belongs to `{}`",
                        item.player_id, entry.member_id
                    ))
                }
                None => return Err(format!("player `{}` is no longer rostered", item.player_id)),
            };
            staged.remove(entry).map_err(|e| e.to_string())?;
        }

        for item in &self.items {
            let player = catalog
                .get(&item.player_id)
                .ok_or_else(|| format!("player `{}` missing from catalog", item.player_id))?;
            let slot = staged
                .first_open_bench_slot(&item.to_member)
                .ok_or_else(|| {
                    format!("no open bench slot left for `{}`", item.to_member)
                })?;
            staged
                .place(&item.to_member, player, &slot, AcquisitionMethod::Trade)
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    pub fn all_recipients_accepted(&self) -> bool {
        self.participants
            .iter()
            .filter(|p| p.role == ParticipantRole::Recipient)
            .all(|p| p.decision == Decision::Accepted)
    }

    /// Recipients still pending, in participant order. The bot cascade walks
    /// this list, so its order is the cascade's deterministic order.
    pub fn pending_recipients(&self) -> Vec<String> {
        self.participants
            .iter()
            .filter(|p| p.role == ParticipantRole::Recipient && p.decision == Decision::Pending)
            .map(|p| p.member_id.clone())
            .collect()
    }

    pub fn participant(&self, member_id: &str) -> Option<&TradeParticipant> {
        self.participants.iter().find(|p| p.member_id == member_id)
    }

    /// Player ids a member would receive.
    pub fn receiving_for(&self, member_id: &str) -> Vec<&str> {
        self.items
            .iter()
            .filter(|i| i.to_member == member_id)
            .map(|i| i.player_id.as_str())
            .collect()
    }

    /// Player ids a member would give up.
    pub fn giving_for(&self, member_id: &str) -> Vec<&str> {
        self.items
            .iter()
            .filter(|i| i.from_member == member_id)
            .map(|i| i.player_id.as_str())
            .collect()
    }

    fn record_decision(&mut self, member_id: &str, decision: Decision) -> EngineResult<()> {
        if self.status != TradeStatus::Proposed {
            return Err(EngineError::TradeNotPending { trade_id: self.id });
        }
        let trade_id = self.id;
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.member_id == member_id)
            .ok_or_else(|| EngineError::NotAParticipant {
                member_id: member_id.to_string(),
                trade_id,
            })?;
        if participant.role != ParticipantRole::Recipient
            || participant.decision != Decision::Pending
        {
            return Err(EngineError::NotPending {
                member_id: member_id.to_string(),
                trade_id,
            });
        }
        participant.decision = decision;
        Ok(())
    }
}

/// Signed incoming-minus-outgoing item counts per member.
fn item_deltas(items: &[TradeItem]) -> HashMap<&str, i64> {
    let mut deltas: HashMap<&str, i64> = HashMap::new();
    for item in items {
        *deltas.entry(item.to_member.as_str()).or_default() += 1;
        *deltas.entry(item.from_member.as_str()).or_default() -= 1;
    }
    deltas
}
