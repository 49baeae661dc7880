// The async facade over the transaction engine.
//
// Each registered league gets a room whose draft, trade book, and roster
// store sit behind their own locks, so a pick in one league never contends
// with a trade in another. Lock ordering within a room is draft -> trades ->
// rosters -> clock -> league(phase); league snapshots taken outside that
// chain are released before any engine lock is acquired.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::bot;
use crate::catalog::{Player, PlayerCatalog, PlayerFilter};
use crate::clock::PickClock;
use crate::db::Database;
use crate::draft::engine::{Draft, DraftPick, DraftStatus};
use crate::draft::populate::{populate_rosters, PopulationReport};
use crate::error::{EngineError, EngineResult};
use crate::league::{League, LeaguePhase, Member};
use crate::notify::{Notification, Notifier};
use crate::rng::Rng;
use crate::roster::slots::SlotLayout;
use crate::roster::store::{AcquisitionMethod, RosterEntry, RosterStore};
use crate::trade::{Trade, TradeItem, TradeStatus};

/// Everything a landed pick did: the pick itself (absent for the start-draft
/// call, which may only trigger bot picks), any bot picks that followed, and
/// the population report if the draft just finished.
#[derive(Debug, Clone)]
pub struct PickReport {
    pub pick: Option<DraftPick>,
    pub bot_picks: Vec<DraftPick>,
    pub completed: bool,
    pub population: Option<PopulationReport>,
}

#[derive(Default)]
struct TradeBook {
    next_id: u64,
    trades: HashMap<u64, Trade>,
}

struct LeagueRoom {
    /// Member list is fixed at registration; the engine never mutates it.
    members: Vec<Member>,
    league: Mutex<League>,
    draft: Mutex<Option<Draft>>,
    trades: Mutex<TradeBook>,
    rosters: Mutex<RosterStore>,
    clock: Mutex<Option<PickClock>>,
}

impl LeagueRoom {
    fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    fn require_member(&self, member_id: &str, league_id: &str) -> EngineResult<&Member> {
        self.member(member_id).ok_or_else(|| EngineError::NotAMember {
            member_id: member_id.to_string(),
            league_id: league_id.to_string(),
        })
    }

    fn require_commissioner(&self, member_id: &str, league_id: &str) -> EngineResult<&Member> {
        let member = self.require_member(member_id, league_id)?;
        if !member.is_commissioner {
            return Err(EngineError::NotCommissioner {
                member_id: member_id.to_string(),
            });
        }
        Ok(member)
    }
}

/// League transaction service: the single entry point callers (and the pick
/// clock) go through for drafts, trades, and roster moves.
pub struct LeagueService {
    catalog: PlayerCatalog,
    rooms: Mutex<HashMap<String, Arc<LeagueRoom>>>,
    rng: std::sync::Mutex<Box<dyn Rng>>,
    notifier: Arc<dyn Notifier>,
    db: Option<Database>,
    self_ref: Weak<LeagueService>,
}

impl LeagueService {
    pub fn new(
        catalog: PlayerCatalog,
        rng: Box<dyn Rng>,
        notifier: Arc<dyn Notifier>,
        db: Option<Database>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| LeagueService {
            catalog,
            rooms: Mutex::new(HashMap::new()),
            rng: std::sync::Mutex::new(rng),
            notifier,
            db,
            self_ref: weak.clone(),
        })
    }

    pub fn catalog(&self) -> &PlayerCatalog {
        &self.catalog
    }

    // ------------------------------------------------------------------
    // League registry
    // ------------------------------------------------------------------

    /// Register a league and its (final) member list. Membership CRUD is the
    /// membership system's problem; the engine takes the result.
    pub async fn register_league(&self, league: League, members: Vec<Member>) -> EngineResult<()> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&league.id) {
            return Err(EngineError::LeagueAlreadyExists {
                league_id: league.id.clone(),
            });
        }
        let layout = SlotLayout::from_counts(&league.roster_counts);
        let room = LeagueRoom {
            members,
            rosters: Mutex::new(RosterStore::new(layout)),
            league: Mutex::new(league.clone()),
            draft: Mutex::new(None),
            trades: Mutex::new(TradeBook::default()),
            clock: Mutex::new(None),
        };
        rooms.insert(league.id.clone(), Arc::new(room));
        info!(league_id = %league.id, "league registered");
        Ok(())
    }

    async fn room(&self, league_id: &str) -> EngineResult<Arc<LeagueRoom>> {
        self.rooms
            .lock()
            .await
            .get(league_id)
            .cloned()
            .ok_or_else(|| EngineError::LeagueNotFound {
                league_id: league_id.to_string(),
            })
    }

    pub async fn league_snapshot(&self, league_id: &str) -> EngineResult<League> {
        let room = self.room(league_id).await?;
        let league = room.league.lock().await;
        Ok(league.clone())
    }

    pub async fn members(&self, league_id: &str) -> EngineResult<Vec<Member>> {
        let room = self.room(league_id).await?;
        Ok(room.members.clone())
    }

    /// A member's roster entries, in layout order.
    pub async fn roster_snapshot(
        &self,
        league_id: &str,
        member_id: &str,
    ) -> EngineResult<Vec<RosterEntry>> {
        let room = self.room(league_id).await?;
        room.require_member(member_id, league_id)?;
        let rosters = room.rosters.lock().await;
        Ok(rosters
            .entries_for(member_id)
            .into_iter()
            .cloned()
            .collect())
    }

    // ------------------------------------------------------------------
    // Draft lifecycle
    // ------------------------------------------------------------------

    /// Create the league's draft with a randomized order. Commissioner-only;
    /// requires a full league and a roster large enough for every round.
    pub async fn schedule_draft(
        &self,
        league_id: &str,
        acting_member: &str,
    ) -> EngineResult<Draft> {
        let room = self.room(league_id).await?;
        room.require_commissioner(acting_member, league_id)?;

        let league = { room.league.lock().await.clone() };
        if room.members.len() < league.num_teams {
            return Err(EngineError::LeagueNotFull {
                league_id: league_id.to_string(),
                current: room.members.len(),
                required: league.num_teams,
            });
        }

        let mut draft_slot = room.draft.lock().await;
        if draft_slot.is_some() {
            return Err(EngineError::DraftAlreadyExists {
                league_id: league_id.to_string(),
            });
        }

        let capacity = {
            let rosters = room.rosters.lock().await;
            rosters.layout().draftable_count()
        };
        if league.draft_rounds as usize > capacity {
            return Err(EngineError::RosterTooSmall {
                rounds: league.draft_rounds,
                capacity,
            });
        }

        let draft_id = Database::generate_draft_id();
        let member_ids: Vec<String> = room.members.iter().map(|m| m.id.clone()).collect();
        let draft = {
            let mut rng = self.rng.lock().expect("rng mutex poisoned");
            Draft::new(
                draft_id.clone(),
                league_id,
                league.draft_rounds,
                member_ids,
                rng.as_mut(),
            )
        };

        if let Some(db) = &self.db {
            if let Err(err) = db.set_draft_id(league_id, &draft_id) {
                warn!(%err, "failed to persist draft id");
            }
        }
        self.save_draft_state(league_id, &draft);

        *draft_slot = Some(draft.clone());
        Ok(draft)
    }

    /// Re-randomize the order. Commissioner-only, scheduled drafts only.
    pub async fn reorder_draft(
        &self,
        league_id: &str,
        acting_member: &str,
    ) -> EngineResult<Draft> {
        let room = self.room(league_id).await?;
        room.require_commissioner(acting_member, league_id)?;

        let mut draft_slot = room.draft.lock().await;
        let draft = draft_slot.as_mut().ok_or_else(|| EngineError::DraftNotFound {
            league_id: league_id.to_string(),
        })?;
        {
            let mut rng = self.rng.lock().expect("rng mutex poisoned");
            draft.reorder(rng.as_mut())?;
        }
        self.save_draft_state(league_id, draft);
        Ok(draft.clone())
    }

    /// Start the draft: flips the league to drafting, runs any leading bot
    /// turns, and arms the pick clock for the first human.
    pub async fn start_draft(
        &self,
        league_id: &str,
        acting_member: &str,
    ) -> EngineResult<PickReport> {
        let room = self.room(league_id).await?;
        room.require_commissioner(acting_member, league_id)?;

        {
            let league = room.league.lock().await;
            if room.members.len() < league.num_teams {
                return Err(EngineError::LeagueNotFull {
                    league_id: league_id.to_string(),
                    current: room.members.len(),
                    required: league.num_teams,
                });
            }
        }

        let mut draft_slot = room.draft.lock().await;
        let draft = draft_slot.as_mut().ok_or_else(|| EngineError::DraftNotFound {
            league_id: league_id.to_string(),
        })?;
        draft.start()?;

        {
            let mut league = room.league.lock().await;
            league.phase = LeaguePhase::Drafting;
        }
        for member in room.members.iter().filter(|m| m.user_id.is_some()) {
            self.notifier
                .notify(
                    &member.id,
                    Notification::DraftStarted {
                        league_id: league_id.to_string(),
                    },
                )
                .await;
        }

        let mut rosters = room.rosters.lock().await;
        let report = self
            .after_pick(&room, league_id, draft, &mut rosters, None, Vec::new())
            .await?;
        Ok(report)
    }

    /// A human pick for the acting member.
    pub async fn make_pick(
        &self,
        league_id: &str,
        acting_member: &str,
        player_id: &str,
    ) -> EngineResult<PickReport> {
        let room = self.room(league_id).await?;
        room.require_member(acting_member, league_id)?;

        let mut draft_slot = room.draft.lock().await;
        let draft = draft_slot.as_mut().ok_or_else(|| EngineError::DraftNotFound {
            league_id: league_id.to_string(),
        })?;
        let mut rosters = room.rosters.lock().await;

        draft.make_pick(acting_member, player_id, &self.catalog, &rosters)?;
        let pick = draft.picks.last().expect("pick just recorded").clone();
        self.record_pick_db(&draft.id, &pick);

        self.after_pick(&room, league_id, draft, &mut rosters, Some(pick), Vec::new())
            .await
    }

    /// Pick-clock expiry path. `expected_pick` is the pick the clock was
    /// armed for; a stale firing (the pick already landed) no-ops.
    pub async fn fire_auto_pick(
        &self,
        league_id: &str,
        expected_pick: u32,
    ) -> EngineResult<Option<PickReport>> {
        let room = self.room(league_id).await?;

        let mut draft_slot = room.draft.lock().await;
        let draft = match draft_slot.as_mut() {
            Some(d) => d,
            None => return Ok(None),
        };
        if draft.status != DraftStatus::InProgress || draft.current_pick != expected_pick {
            debug!(
                league_id,
                expected_pick,
                current = draft.current_pick,
                "stale pick clock firing ignored"
            );
            return Ok(None);
        }

        let mut rosters = room.rosters.lock().await;
        let (pick, _) = {
            let mut rng = self.rng.lock().expect("rng mutex poisoned");
            draft.auto_pick(&self.catalog, &rosters, rng.as_mut())?
        };
        info!(league_id, pick = pick.pick_number, member = %pick.member_id, "pick clock expired; auto-picked");
        self.record_pick_db(&draft.id, &pick);

        let report = self
            .after_pick(&room, league_id, draft, &mut rosters, Some(pick), Vec::new())
            .await?;
        Ok(Some(report))
    }

    /// The draft board: undrafted, unrostered players matching the filter.
    pub async fn available_players(
        &self,
        league_id: &str,
        filter: &PlayerFilter,
    ) -> EngineResult<Vec<Player>> {
        let room = self.room(league_id).await?;
        let draft_slot = room.draft.lock().await;
        let draft = draft_slot.as_ref().ok_or_else(|| EngineError::DraftNotFound {
            league_id: league_id.to_string(),
        })?;
        let rosters = room.rosters.lock().await;
        Ok(draft
            .available_players(&self.catalog, &rosters, filter)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn draft_snapshot(&self, league_id: &str) -> EngineResult<Draft> {
        let room = self.room(league_id).await?;
        let draft_slot = room.draft.lock().await;
        draft_slot
            .clone()
            .ok_or_else(|| EngineError::DraftNotFound {
                league_id: league_id.to_string(),
            })
    }

    /// Shared post-pick flow: run bot turns, then either finalize the draft
    /// or re-arm the clock for the next human.
    async fn after_pick(
        &self,
        room: &Arc<LeagueRoom>,
        league_id: &str,
        draft: &mut Draft,
        rosters: &mut RosterStore,
        pick: Option<DraftPick>,
        mut bot_picks: Vec<DraftPick>,
    ) -> EngineResult<PickReport> {
        if draft.status == DraftStatus::InProgress {
            let picked = {
                let mut rng = self.rng.lock().expect("rng mutex poisoned");
                draft.run_bot_turns(&room.members, &self.catalog, rosters, rng.as_mut())?
            };
            for bot_pick in &picked {
                self.record_pick_db(&draft.id, bot_pick);
            }
            bot_picks.extend(picked);
        }
        self.save_draft_state(league_id, draft);

        let mut population = None;
        let completed = draft.status == DraftStatus::Completed;
        if completed {
            population = Some(self.finalize_draft(room, league_id, draft, rosters).await);
        } else {
            self.arm_clock_for_current(room, league_id, draft).await;
        }

        Ok(PickReport {
            pick,
            bot_picks,
            completed,
            population,
        })
    }

    /// Draft completion: populate rosters, let bots set their lineups, flip
    /// the league phase back to setup, tell the humans.
    async fn finalize_draft(
        &self,
        room: &Arc<LeagueRoom>,
        league_id: &str,
        draft: &Draft,
        rosters: &mut RosterStore,
    ) -> PopulationReport {
        {
            let mut clock = room.clock.lock().await;
            if let Some(mut clock) = clock.take() {
                clock.disarm();
            }
        }

        let report = populate_rosters(draft, &self.catalog, rosters);
        info!(
            league_id,
            placed = report.placed,
            unplaced = report.unplaced.len(),
            "rosters populated from draft"
        );

        for member in room.members.iter().filter(|m| m.is_bot) {
            let moves = bot::optimize_lineup(&member.id, rosters, &self.catalog);
            if let Err(err) = bot::apply_lineup_moves(&moves, rosters, &self.catalog) {
                warn!(member = %member.id, %err, "bot lineup optimization failed");
            }
        }

        {
            let mut league = room.league.lock().await;
            league.phase = LeaguePhase::Setup;
        }
        for member in room.members.iter().filter(|m| m.user_id.is_some()) {
            self.notifier
                .notify(
                    &member.id,
                    Notification::DraftCompleted {
                        league_id: league_id.to_string(),
                    },
                )
                .await;
        }
        report
    }

    /// Arm the pick clock when a human is on the clock and the league uses
    /// one. Any previously armed clock is disarmed first.
    ///
    /// Returns a boxed future rather than being an `async fn`: the armed
    /// clock's expiry callback re-enters `fire_auto_pick` -> `after_pick` ->
    /// `arm_clock_for_current`, a recursive async cycle. Crossing a
    /// `dyn Future + Send` boundary here lets rustc carry `Send` as a declared
    /// bound instead of trying (and failing) to derive it through the cycle.
    fn arm_clock_for_current<'a>(
        &'a self,
        room: &'a Arc<LeagueRoom>,
        league_id: &'a str,
        draft: &'a Draft,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let mut clock_slot = room.clock.lock().await;
            if let Some(mut old) = clock_slot.take() {
                old.disarm();
            }
            if draft.status != DraftStatus::InProgress {
                return;
            }
            let secs = { room.league.lock().await.pick_clock_secs };
            if secs == 0 {
                return;
            }
            let member_id = match draft.on_the_clock() {
                Ok(id) => id.to_string(),
                Err(_) => return,
            };
            let is_bot = room.member(&member_id).map(|m| m.is_bot).unwrap_or(false);
            if is_bot {
                return;
            }

            let pick_number = draft.current_pick;
            let weak = self.self_ref.clone();
            let league_id = league_id.to_string();
            let clock = PickClock::arm(Duration::from_secs(secs), pick_number, async move {
                if let Some(service) = weak.upgrade() {
                    match service.fire_auto_pick(&league_id, pick_number).await {
                        Ok(Some(_)) => {}
                        Ok(None) => debug!(league_id = %league_id, pick_number, "auto-pick skipped"),
                        Err(err) => warn!(league_id = %league_id, pick_number, %err, "auto-pick failed"),
                    }
                }
            });
            *clock_slot = Some(clock);
        })
    }

    // ------------------------------------------------------------------
    // Roster moves and free agency
    // ------------------------------------------------------------------

    /// Move one of the acting member's players to another slot, swapping
    /// with the occupant if needed.
    pub async fn move_player(
        &self,
        league_id: &str,
        acting_member: &str,
        entry_id: u64,
        target_slot: &str,
    ) -> EngineResult<()> {
        let room = self.room(league_id).await?;
        room.require_member(acting_member, league_id)?;

        let mut rosters = room.rosters.lock().await;
        let entry = rosters
            .entry(entry_id)
            .ok_or(EngineError::EntryNotFound { entry_id })?;
        if entry.member_id != acting_member {
            return Err(EngineError::NotEntryOwner {
                entry_id,
                member_id: acting_member.to_string(),
            });
        }
        rosters.move_player(entry_id, target_slot, &self.catalog)
    }

    /// Pick up a free agent onto the acting member's bench.
    pub async fn add_free_agent(
        &self,
        league_id: &str,
        acting_member: &str,
        player_id: &str,
    ) -> EngineResult<RosterEntry> {
        let room = self.room(league_id).await?;
        room.require_member(acting_member, league_id)?;

        let player = self
            .catalog
            .get(player_id)
            .ok_or_else(|| EngineError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;

        let mut rosters = room.rosters.lock().await;
        let slot = rosters
            .first_open_bench_slot(acting_member)
            .ok_or_else(|| EngineError::InsufficientRosterSpace {
                member_id: acting_member.to_string(),
                required: 1,
                available: 0,
            })?;
        let entry_id = rosters.place(acting_member, player, &slot, AcquisitionMethod::FreeAgent)?;
        let entry = rosters.entry(entry_id).expect("entry just placed").clone();
        drop(rosters);

        self.notifier
            .notify(
                acting_member,
                Notification::FreeAgentPickup {
                    member_id: acting_member.to_string(),
                    player_id: player_id.to_string(),
                },
            )
            .await;
        Ok(entry)
    }

    /// Fill the acting member's empty bench slots with the best-ADP free
    /// agents still in the pool. Bots use this to repair short rosters;
    /// humans get the same shortcut.
    pub async fn autofill_bench(
        &self,
        league_id: &str,
        acting_member: &str,
    ) -> EngineResult<Vec<RosterEntry>> {
        let room = self.room(league_id).await?;
        room.require_member(acting_member, league_id)?;

        let mut rosters = room.rosters.lock().await;
        let pool: Vec<&Player> = self
            .catalog
            .search(&PlayerFilter::default())
            .into_iter()
            .filter(|p| !rosters.is_owned(&p.id))
            .collect();
        let fills = bot::autofill_bench(acting_member, &rosters, &pool);

        let mut entries = Vec::new();
        for (player, slot) in fills {
            let entry_id =
                rosters.place(acting_member, player, &slot, AcquisitionMethod::FreeAgent)?;
            entries.push(rosters.entry(entry_id).expect("entry just placed").clone());
        }
        drop(rosters);

        for entry in &entries {
            self.notifier
                .notify(
                    acting_member,
                    Notification::FreeAgentPickup {
                        member_id: acting_member.to_string(),
                        player_id: entry.player_id.clone(),
                    },
                )
                .await;
        }
        Ok(entries)
    }

    /// Drop one of the acting member's players back into the pool.
    pub async fn drop_player(
        &self,
        league_id: &str,
        acting_member: &str,
        entry_id: u64,
    ) -> EngineResult<RosterEntry> {
        let room = self.room(league_id).await?;
        room.require_member(acting_member, league_id)?;

        let mut rosters = room.rosters.lock().await;
        let entry = rosters
            .entry(entry_id)
            .ok_or(EngineError::EntryNotFound { entry_id })?;
        if entry.member_id != acting_member {
            return Err(EngineError::NotEntryOwner {
                entry_id,
                member_id: acting_member.to_string(),
            });
        }
        rosters.remove(entry_id)
    }

    // ------------------------------------------------------------------
    // Trades
    // ------------------------------------------------------------------

    /// Propose a trade. Validates against live rosters, notifies human
    /// recipients, then runs the bot auto-response cascade; a single bot
    /// decline terminates the trade before later bots are consulted.
    pub async fn propose_trade(
        &self,
        league_id: &str,
        proposer: &str,
        recipients: Vec<String>,
        items: Vec<TradeItem>,
    ) -> EngineResult<Trade> {
        let room = self.room(league_id).await?;
        room.require_member(proposer, league_id)?;
        for recipient in &recipients {
            room.require_member(recipient, league_id)?;
        }

        let mut book = room.trades.lock().await;
        let mut rosters = room.rosters.lock().await;

        book.next_id += 1;
        let trade_id = book.next_id;
        let mut trade = Trade::propose(
            trade_id,
            league_id,
            proposer,
            recipients,
            items,
            &rosters,
        )?;
        info!(league_id, trade_id, proposer, items = trade.items.len(), "trade proposed");

        // Notify humans; bots answer synchronously below.
        for recipient in trade.pending_recipients() {
            let is_human = room.member(&recipient).map(|m| !m.is_bot).unwrap_or(false);
            if is_human {
                self.notifier
                    .notify(
                        &recipient,
                        Notification::TradeProposed {
                            trade_id,
                            proposer: proposer.to_string(),
                        },
                    )
                    .await;
            }
        }

        self.run_bot_cascade(&room, &mut trade, &mut rosters).await;

        self.record_trade_db(&trade);
        let snapshot = trade.clone();
        book.trades.insert(trade_id, trade);
        Ok(snapshot)
    }

    /// A recipient accepts; the final acceptance executes the trade.
    pub async fn accept_trade(
        &self,
        league_id: &str,
        acting_member: &str,
        trade_id: u64,
    ) -> EngineResult<Trade> {
        let room = self.room(league_id).await?;
        room.require_member(acting_member, league_id)?;

        let mut book = room.trades.lock().await;
        let mut rosters = room.rosters.lock().await;
        let trade = book
            .trades
            .get_mut(&trade_id)
            .ok_or(EngineError::TradeNotFound { trade_id })?;

        let ready = trade.accept(acting_member)?;
        self.notifier
            .notify(
                &trade.proposer,
                Notification::TradeAccepted {
                    trade_id,
                    by: acting_member.to_string(),
                },
            )
            .await;
        if ready {
            self.execute_trade(&room, trade, &mut rosters).await;
        }
        self.record_trade_db(trade);
        Ok(trade.clone())
    }

    /// A recipient declines; one decline kills the whole trade.
    pub async fn decline_trade(
        &self,
        league_id: &str,
        acting_member: &str,
        trade_id: u64,
    ) -> EngineResult<Trade> {
        let room = self.room(league_id).await?;
        room.require_member(acting_member, league_id)?;

        let mut book = room.trades.lock().await;
        let trade = book
            .trades
            .get_mut(&trade_id)
            .ok_or(EngineError::TradeNotFound { trade_id })?;

        trade.decline(acting_member)?;
        self.notify_trade_humans(
            &room,
            trade,
            Notification::TradeDeclined {
                trade_id,
                by: acting_member.to_string(),
            },
        )
        .await;
        self.record_trade_db(trade);
        Ok(trade.clone())
    }

    /// The proposer withdraws a still-pending trade.
    pub async fn cancel_trade(
        &self,
        league_id: &str,
        acting_member: &str,
        trade_id: u64,
    ) -> EngineResult<Trade> {
        let room = self.room(league_id).await?;
        room.require_member(acting_member, league_id)?;

        let mut book = room.trades.lock().await;
        let trade = book
            .trades
            .get_mut(&trade_id)
            .ok_or(EngineError::TradeNotFound { trade_id })?;
        trade.cancel(acting_member)?;
        self.record_trade_db(trade);
        Ok(trade.clone())
    }

    pub async fn trade_snapshot(&self, league_id: &str, trade_id: u64) -> EngineResult<Trade> {
        let room = self.room(league_id).await?;
        let book = room.trades.lock().await;
        book.trades
            .get(&trade_id)
            .cloned()
            .ok_or(EngineError::TradeNotFound { trade_id })
    }

    /// Ask the bot policy for each pending bot recipient, in participant
    /// order, stopping the moment any bot declines.
    async fn run_bot_cascade(
        &self,
        room: &Arc<LeagueRoom>,
        trade: &mut Trade,
        rosters: &mut RosterStore,
    ) {
        for recipient in trade.pending_recipients() {
            if trade.status != TradeStatus::Proposed {
                break;
            }
            let is_bot = room.member(&recipient).map(|m| m.is_bot).unwrap_or(false);
            if !is_bot {
                continue;
            }

            let receiving: Vec<&Player> = trade
                .receiving_for(&recipient)
                .into_iter()
                .filter_map(|id| self.catalog.get(id))
                .collect();
            let giving: Vec<&Player> = trade
                .giving_for(&recipient)
                .into_iter()
                .filter_map(|id| self.catalog.get(id))
                .collect();

            if bot::evaluate_trade(&receiving, &giving) {
                debug!(trade_id = trade.id, bot = %recipient, "bot accepted trade");
                match trade.accept(&recipient) {
                    Ok(true) => {
                        self.execute_trade(room, trade, rosters).await;
                        break;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        warn!(trade_id = trade.id, bot = %recipient, %err, "bot accept failed");
                        break;
                    }
                }
            } else {
                debug!(trade_id = trade.id, bot = %recipient, "bot declined trade");
                if let Err(err) = trade.decline(&recipient) {
                    warn!(trade_id = trade.id, bot = %recipient, %err, "bot decline failed");
                }
                break;
            }
        }
    }

    /// Execute a fully-accepted trade and notify. A stale trade cancels
    /// itself inside `Trade::execute`; this layer only reports it.
    async fn execute_trade(
        &self,
        room: &Arc<LeagueRoom>,
        trade: &mut Trade,
        rosters: &mut RosterStore,
    ) {
        match trade.execute(rosters, &self.catalog) {
            Ok(()) => {
                self.notify_trade_humans(
                    room,
                    trade,
                    Notification::TradeCompleted { trade_id: trade.id },
                )
                .await;
            }
            Err(err) => {
                warn!(trade_id = trade.id, %err, "trade execution aborted");
            }
        }
    }

    async fn notify_trade_humans(
        &self,
        room: &Arc<LeagueRoom>,
        trade: &Trade,
        event: Notification,
    ) {
        for participant in &trade.participants {
            let has_user = room
                .member(&participant.member_id)
                .map(|m| m.user_id.is_some())
                .unwrap_or(false);
            if has_user {
                self.notifier
                    .notify(&participant.member_id, event.clone())
                    .await;
            }
        }
    }

    // ------------------------------------------------------------------
    // Persistence helpers
    // ------------------------------------------------------------------

    fn record_pick_db(&self, draft_id: &str, pick: &DraftPick) {
        if let Some(db) = &self.db {
            if let Err(err) = db.record_pick(pick, draft_id) {
                warn!(%err, pick = pick.pick_number, "failed to journal pick");
            }
        }
    }

    fn record_trade_db(&self, trade: &Trade) {
        if let Some(db) = &self.db {
            if let Err(err) = db.record_trade(trade) {
                warn!(%err, trade_id = trade.id, "failed to journal trade");
            }
        }
    }

    fn save_draft_state(&self, league_id: &str, draft: &Draft) {
        if let Some(db) = &self.db {
            match serde_json::to_value(draft) {
                Ok(value) => {
                    if let Err(err) = db.save_state(&format!("draft/{league_id}"), &value) {
                        warn!(%err, "failed to save draft state");
                    }
                }
                Err(err) => warn!(%err, "failed to serialize draft state"),
            }
        }
    }

    /// Restore a league's draft from the journal after a restart. Returns
    /// `true` when a draft was recovered. In-progress drafts resume with the
    /// clock armed for the current pick.
    pub async fn recover_draft(&self, league_id: &str) -> EngineResult<bool> {
        let Some(db) = &self.db else { return Ok(false) };
        let room = self.room(league_id).await?;

        let Some(value) = db
            .load_state(&format!("draft/{league_id}"))
            .unwrap_or_default()
        else {
            return Ok(false);
        };
        let draft: Draft = match serde_json::from_value(value) {
            Ok(d) => d,
            Err(err) => {
                warn!(%err, "stored draft state is unreadable; starting fresh");
                return Ok(false);
            }
        };

        let mut draft_slot = room.draft.lock().await;
        info!(league_id, draft_id = %draft.id, status = ?draft.status, pick = draft.current_pick, "draft recovered");
        self.arm_clock_for_current(&room, league_id, &draft).await;
        *draft_slot = Some(draft);
        Ok(true)
    }
}
