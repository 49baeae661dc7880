// Integration tests for the league transaction engine.
//
// These tests exercise the full system end-to-end through the service
// facade: draft lifecycle (snake order, autopick, bot turns, roster
// population), multi-party trades with bot auto-response, roster moves,
// and free agency.

use std::collections::HashSet;
use std::sync::Arc;

use gridiron::catalog::{Player, PlayerCatalog, PlayerFilter, Position};
use gridiron::db::Database;
use gridiron::draft::engine::DraftStatus;
use gridiron::draft::order;
use gridiron::error::EngineError;
use gridiron::league::{League, LeaguePhase, Member};
use gridiron::notify::NullNotifier;
use gridiron::rng::XorShiftRng;
use gridiron::roster::slots::RosterCounts;
use gridiron::service::LeagueService;
use gridiron::trade::{TradeItem, TradeStatus};

// ===========================================================================
// Test helpers
// ===========================================================================

const LEAGUE: &str = "l1";

fn player(id: &str, name: &str, pos: Position, adp: Option<f64>) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        position: pos,
        team: "FA".to_string(),
        adp,
        injury: None,
    }
}

/// The shared player pool -- deep enough for a 4-team, 15-round draft, with
/// a few dedicated trade-bait players at the end.
fn pool() -> Vec<Player> {
    let mut players = Vec::new();
    let groups = [
        (Position::RB, 25, 0.0),
        (Position::WR, 25, 100.0),
        (Position::TE, 8, 200.0),
        (Position::QB, 8, 230.0),
        (Position::K, 6, 260.0),
        (Position::DEF, 6, 290.0),
    ];
    for (pos, count, base) in groups {
        for i in 1..=count {
            let id = format!("{}{i:02}", pos.code().to_lowercase());
            let name = format!("{} {i:02}", pos.code());
            players.push(player(&id, &name, pos, Some(base + i as f64)));
        }
    }
    // Trade bait with extreme values.
    players.push(player("t_good", "Trade Stud", Position::RB, Some(5.0)));
    players.push(player("t_mid", "Trade Mid", Position::WR, Some(50.0)));
    players.push(player("t_bad", "Trade Scrub", Position::RB, Some(400.0)));
    players.push(player("t_none", "Trade Unknown", Position::WR, None));
    players
}

fn members(num: usize, bots: &[usize]) -> Vec<Member> {
    (1..=num)
        .map(|i| {
            let member = if bots.contains(&i) {
                Member::bot(format!("m{i}"), LEAGUE, format!("Bot {i}"))
            } else {
                Member::human(format!("m{i}"), LEAGUE, format!("Team {i}"), format!("u{i}"))
            };
            if i == 1 {
                member.commissioner()
            } else {
                member
            }
        })
        .collect()
}

/// Build a service with a registered league. `clock_secs = 0` disables the
/// pick clock so tests never race a live timer.
async fn setup(
    num_teams: usize,
    bots: &[usize],
    rounds: u32,
    clock_secs: u64,
) -> Arc<LeagueService> {
    let catalog = PlayerCatalog::from_players(pool()).unwrap();
    let service = LeagueService::new(
        catalog,
        Box::new(XorShiftRng::seeded(42)),
        Arc::new(NullNotifier),
        None,
    );
    let league = League::new(
        LEAGUE,
        "Test League",
        num_teams,
        RosterCounts::default(),
        rounds,
        clock_secs,
    );
    service
        .register_league(league, members(num_teams, bots))
        .await
        .unwrap();
    service
}

/// Put a specific player on a member's bench via free agency.
async fn give_player(service: &LeagueService, member_id: &str, player_id: &str) {
    service
        .add_free_agent(LEAGUE, member_id, player_id)
        .await
        .unwrap();
}

/// Every rostered player across the league, with duplicates preserved.
async fn all_rostered(service: &LeagueService, num_teams: usize) -> Vec<String> {
    let mut all = Vec::new();
    for i in 1..=num_teams {
        let roster = service
            .roster_snapshot(LEAGUE, &format!("m{i}"))
            .await
            .unwrap();
        all.extend(roster.into_iter().map(|e| e.player_id));
    }
    all
}

// ===========================================================================
// Draft lifecycle
// ===========================================================================

#[tokio::test]
async fn scenario_four_team_three_round_draft_completes() {
    let service = setup(4, &[], 3, 0).await;
    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    service.start_draft(LEAGUE, "m1").await.unwrap();

    let draft = service.draft_snapshot(LEAGUE).await.unwrap();
    let draft_order = draft.order.clone();

    // Drive all 12 picks in on-the-clock order, tracking who picked.
    let mut sequence = Vec::new();
    for _ in 0..12 {
        let snapshot = service.draft_snapshot(LEAGUE).await.unwrap();
        let on_clock = snapshot.on_the_clock().unwrap().to_string();
        let best = service
            .available_players(LEAGUE, &PlayerFilter::default())
            .await
            .unwrap()[0]
            .id
            .clone();
        sequence.push(on_clock.clone());
        service.make_pick(LEAGUE, &on_clock, &best).await.unwrap();
    }

    // Snake pattern: forward, reversed, forward.
    let expected: Vec<String> = (1..=12u32)
        .map(|p| order::on_the_clock(p, &draft_order).to_string())
        .collect();
    assert_eq!(sequence, expected);
    assert_eq!(&sequence[0..4], &sequence[8..12]);
    let mut reversed = sequence[0..4].to_vec();
    reversed.reverse();
    assert_eq!(&sequence[4..8], &reversed[..]);

    // Completed, populated, and back in the setup phase.
    let draft = service.draft_snapshot(LEAGUE).await.unwrap();
    assert_eq!(draft.status, DraftStatus::Completed);
    let league = service.league_snapshot(LEAGUE).await.unwrap();
    assert_eq!(league.phase, LeaguePhase::Setup);

    let rostered = all_rostered(&service, 4).await;
    assert_eq!(rostered.len(), 12, "every pick must be placed");
    for i in 1..=4 {
        let roster = service
            .roster_snapshot(LEAGUE, &format!("m{i}"))
            .await
            .unwrap();
        assert_eq!(roster.len(), 3);
    }
}

#[tokio::test]
async fn pick_monotonicity_and_exact_completion() {
    let service = setup(4, &[], 2, 0).await;
    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    service.start_draft(LEAGUE, "m1").await.unwrap();

    let mut last_pick = 0;
    for i in 0..8 {
        let snapshot = service.draft_snapshot(LEAGUE).await.unwrap();
        assert!(snapshot.current_pick > last_pick);
        last_pick = snapshot.current_pick;

        let on_clock = snapshot.on_the_clock().unwrap().to_string();
        let best = service
            .available_players(LEAGUE, &PlayerFilter::default())
            .await
            .unwrap()[0]
            .id
            .clone();
        let report = service.make_pick(LEAGUE, &on_clock, &best).await.unwrap();
        assert_eq!(report.completed, i == 7, "completion exactly at rounds*teams");
    }
}

#[tokio::test]
async fn all_bot_draft_runs_to_completion_on_start() {
    let service = setup(4, &[1, 2, 3, 4], 3, 0).await;
    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    let report = service.start_draft(LEAGUE, "m1").await.unwrap();

    assert!(report.completed);
    assert_eq!(report.bot_picks.len(), 12);
    assert!(report.pick.is_none());
    let population = report.population.unwrap();
    assert_eq!(population.placed, 12);
    assert!(population.unplaced.is_empty());

    // No double ownership after population.
    let rostered = all_rostered(&service, 4).await;
    let unique: HashSet<&String> = rostered.iter().collect();
    assert_eq!(unique.len(), rostered.len());
}

#[tokio::test]
async fn bots_pick_between_humans() {
    // m1 human, m2/m3 bots, m4 human.
    let service = setup(4, &[2, 3], 2, 0).await;
    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    service.start_draft(LEAGUE, "m1").await.unwrap();

    // Whoever is on the clock is human (bots ahead of them already picked).
    let snapshot = service.draft_snapshot(LEAGUE).await.unwrap();
    let on_clock = snapshot.on_the_clock().unwrap().to_string();
    assert!(["m1", "m4"].contains(&on_clock.as_str()));

    let best = service
        .available_players(LEAGUE, &PlayerFilter::default())
        .await
        .unwrap()[0]
        .id
        .clone();
    let report = service.make_pick(LEAGUE, &on_clock, &best).await.unwrap();

    // Any bot picks that followed belong to the bots, and the next member
    // on the clock is human again.
    let snapshot = service.draft_snapshot(LEAGUE).await.unwrap();
    let next = snapshot.on_the_clock().unwrap();
    assert!(["m1", "m4"].contains(&next));
    for bot_pick in &report.bot_picks {
        assert!(["m2", "m3"].contains(&bot_pick.member_id.as_str()));
    }
}

#[tokio::test]
async fn draft_authorization_rules() {
    let service = setup(4, &[], 2, 0).await;

    // Only the commissioner schedules/starts.
    assert!(matches!(
        service.schedule_draft(LEAGUE, "m2").await,
        Err(EngineError::NotCommissioner { .. })
    ));
    assert!(matches!(
        service.schedule_draft(LEAGUE, "stranger").await,
        Err(EngineError::NotAMember { .. })
    ));

    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    assert!(matches!(
        service.schedule_draft(LEAGUE, "m1").await,
        Err(EngineError::DraftAlreadyExists { .. })
    ));

    service.start_draft(LEAGUE, "m1").await.unwrap();

    // Picking out of turn is rejected.
    let snapshot = service.draft_snapshot(LEAGUE).await.unwrap();
    let on_clock = snapshot.on_the_clock().unwrap().to_string();
    let wrong = (1..=4)
        .map(|i| format!("m{i}"))
        .find(|m| *m != on_clock)
        .unwrap();
    let best = service
        .available_players(LEAGUE, &PlayerFilter::default())
        .await
        .unwrap()[0]
        .id
        .clone();
    assert!(matches!(
        service.make_pick(LEAGUE, &wrong, &best).await,
        Err(EngineError::NotYourTurn { .. })
    ));
}

#[tokio::test]
async fn reorder_only_before_start() {
    let service = setup(4, &[], 2, 0).await;
    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    service.reorder_draft(LEAGUE, "m1").await.unwrap();

    service.start_draft(LEAGUE, "m1").await.unwrap();
    assert!(matches!(
        service.reorder_draft(LEAGUE, "m1").await,
        Err(EngineError::DraftNotScheduled)
    ));
}

#[tokio::test]
async fn scenario_auto_pick_race_is_idempotent() {
    let service = setup(4, &[], 2, 90).await;
    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    service.start_draft(LEAGUE, "m1").await.unwrap();

    // The clock fires for pick 1: exactly one pick lands.
    let report = service.fire_auto_pick(LEAGUE, 1).await.unwrap();
    let pick = report.unwrap().pick.unwrap();
    assert_eq!(pick.pick_number, 1);

    // A second (stale) firing for pick 1 must no-op, not double-pick.
    let stale = service.fire_auto_pick(LEAGUE, 1).await.unwrap();
    assert!(stale.is_none());

    let draft = service.draft_snapshot(LEAGUE).await.unwrap();
    let picks_for_one: Vec<_> = draft
        .picks
        .iter()
        .filter(|p| p.pick_number == 1)
        .collect();
    assert_eq!(picks_for_one.len(), 1);
    assert_eq!(draft.current_pick, 2);
}

#[tokio::test]
async fn auto_pick_attributes_to_the_member_on_the_clock() {
    let service = setup(4, &[], 1, 90).await;
    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    service.start_draft(LEAGUE, "m1").await.unwrap();

    let draft = service.draft_snapshot(LEAGUE).await.unwrap();
    let expected_member = draft.on_the_clock().unwrap().to_string();

    let report = service.fire_auto_pick(LEAGUE, 1).await.unwrap().unwrap();
    assert_eq!(report.pick.unwrap().member_id, expected_member);
}

#[tokio::test]
async fn draft_recovers_from_the_journal() {
    let db_path = std::env::temp_dir().join(format!("gridiron_recover_{}.db", std::process::id()));
    let db_path_str = db_path.to_str().unwrap().to_string();

    let catalog = PlayerCatalog::from_players(pool()).unwrap();
    let league = League::new(LEAGUE, "Test League", 4, RosterCounts::default(), 3, 0);

    let draft_id = {
        let service = LeagueService::new(
            catalog.clone(),
            Box::new(XorShiftRng::seeded(42)),
            Arc::new(NullNotifier),
            Some(Database::open(&db_path_str).unwrap()),
        );
        service
            .register_league(league.clone(), members(4, &[]))
            .await
            .unwrap();
        let draft = service.schedule_draft(LEAGUE, "m1").await.unwrap();
        draft.id
    };

    // A fresh process: same database, empty room.
    let service = LeagueService::new(
        catalog,
        Box::new(XorShiftRng::seeded(7)),
        Arc::new(NullNotifier),
        Some(Database::open(&db_path_str).unwrap()),
    );
    service
        .register_league(league, members(4, &[]))
        .await
        .unwrap();

    assert!(service.recover_draft(LEAGUE).await.unwrap());
    let recovered = service.draft_snapshot(LEAGUE).await.unwrap();
    assert_eq!(recovered.id, draft_id);
    assert_eq!(recovered.status, DraftStatus::Scheduled);

    let _ = std::fs::remove_file(&db_path);
    let _ = std::fs::remove_file(format!("{db_path_str}-wal"));
    let _ = std::fs::remove_file(format!("{db_path_str}-shm"));
}

// ===========================================================================
// Roster moves and free agency
// ===========================================================================

#[tokio::test]
async fn free_agent_pickup_lands_on_bench_once() {
    let service = setup(4, &[], 2, 0).await;

    let entry = service
        .add_free_agent(LEAGUE, "m2", "t_good")
        .await
        .unwrap();
    assert_eq!(entry.slot, "BN1");

    // Nobody else can own the same player.
    assert!(matches!(
        service.add_free_agent(LEAGUE, "m3", "t_good").await,
        Err(EngineError::PlayerAlreadyOwned { .. })
    ));
}

#[tokio::test]
async fn drop_returns_player_to_the_pool() {
    let service = setup(4, &[], 2, 0).await;
    let entry = service
        .add_free_agent(LEAGUE, "m2", "t_good")
        .await
        .unwrap();

    // Only the owner may drop.
    assert!(matches!(
        service.drop_player(LEAGUE, "m3", entry.id).await,
        Err(EngineError::NotEntryOwner { .. })
    ));

    service.drop_player(LEAGUE, "m2", entry.id).await.unwrap();
    // Now anyone may pick the player up again.
    service.add_free_agent(LEAGUE, "m3", "t_good").await.unwrap();
}

#[tokio::test]
async fn bench_autofill_takes_best_available_per_open_slot() {
    let service = setup(4, &[], 2, 0).await;
    // m2 already holds the best RB; autofill must skip owned players.
    give_player(&service, "m2", "rb01").await;

    let fills = service.autofill_bench(LEAGUE, "m2").await.unwrap();
    assert_eq!(fills.len(), 5, "five bench slots were open");
    assert!(fills.iter().all(|e| e.slot.starts_with("BN")));
    assert!(fills.iter().all(|e| e.player_id != "rb01"));
    // Best remaining ADP fills the first open slot.
    assert_eq!(fills[0].player_id, "rb02");
    assert_eq!(fills[0].slot, "BN2");

    // Bench is now full: nothing more to add.
    assert!(service
        .autofill_bench(LEAGUE, "m2")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn swap_atomicity_through_the_service() {
    let service = setup(4, &[], 2, 0).await;
    let rb_entry = service
        .add_free_agent(LEAGUE, "m2", "rb01")
        .await
        .unwrap();
    service
        .move_player(LEAGUE, "m2", rb_entry.id, "RB1")
        .await
        .unwrap();
    let qb_entry = service
        .add_free_agent(LEAGUE, "m2", "qb01")
        .await
        .unwrap();
    service
        .move_player(LEAGUE, "m2", qb_entry.id, "QB")
        .await
        .unwrap();

    let before = service.roster_snapshot(LEAGUE, "m2").await.unwrap();

    // QB -> RB1 would force the RB into the QB slot: both sides checked,
    // whole move rejected, nothing mutated.
    let err = service
        .move_player(LEAGUE, "m2", qb_entry.id, "RB1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::IneligiblePosition { .. } | EngineError::IneligibleSwap { .. }
    ));
    let after = service.roster_snapshot(LEAGUE, "m2").await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn legal_swap_exchanges_slots() {
    let service = setup(4, &[], 2, 0).await;
    let starter = service
        .add_free_agent(LEAGUE, "m2", "rb01")
        .await
        .unwrap();
    service
        .move_player(LEAGUE, "m2", starter.id, "RB1")
        .await
        .unwrap();
    let benched = service
        .add_free_agent(LEAGUE, "m2", "rb02")
        .await
        .unwrap();

    service
        .move_player(LEAGUE, "m2", benched.id, "RB1")
        .await
        .unwrap();

    let roster = service.roster_snapshot(LEAGUE, "m2").await.unwrap();
    let slot_of = |player: &str| {
        roster
            .iter()
            .find(|e| e.player_id == player)
            .unwrap()
            .slot
            .clone()
    };
    assert_eq!(slot_of("rb02"), "RB1");
    assert!(slot_of("rb01").starts_with("BN"));
}

// ===========================================================================
// Trades
// ===========================================================================

#[tokio::test]
async fn human_trade_executes_on_final_acceptance() {
    let service = setup(4, &[], 2, 0).await;
    give_player(&service, "m1", "t_good").await;
    give_player(&service, "m2", "t_mid").await;

    let trade = service
        .propose_trade(
            LEAGUE,
            "m1",
            vec!["m2".to_string()],
            vec![
                TradeItem {
                    player_id: "t_good".to_string(),
                    from_member: "m1".to_string(),
                    to_member: "m2".to_string(),
                },
                TradeItem {
                    player_id: "t_mid".to_string(),
                    from_member: "m2".to_string(),
                    to_member: "m1".to_string(),
                },
            ],
        )
        .await
        .unwrap();
    assert_eq!(trade.status, TradeStatus::Proposed);

    let trade = service.accept_trade(LEAGUE, "m2", trade.id).await.unwrap();
    assert_eq!(trade.status, TradeStatus::Completed);

    let m1_roster = service.roster_snapshot(LEAGUE, "m1").await.unwrap();
    let m2_roster = service.roster_snapshot(LEAGUE, "m2").await.unwrap();
    assert!(m1_roster.iter().any(|e| e.player_id == "t_mid"));
    assert!(m2_roster.iter().any(|e| e.player_id == "t_good"));
}

#[tokio::test]
async fn scenario_three_way_trade_bot_decline_short_circuits() {
    // m1 proposes to m2 (human) and m3 (bot). The bot is offered a scrub
    // for its stud: receiving avg ADP far exceeds giving avg * 1.10, so it
    // declines and the whole trade dies before m2 ever answers.
    let service = setup(4, &[3], 2, 0).await;
    give_player(&service, "m1", "t_bad").await;
    give_player(&service, "m2", "t_mid").await;
    give_player(&service, "m3", "t_good").await;

    let before_m1 = service.roster_snapshot(LEAGUE, "m1").await.unwrap();
    let before_m2 = service.roster_snapshot(LEAGUE, "m2").await.unwrap();
    let before_m3 = service.roster_snapshot(LEAGUE, "m3").await.unwrap();

    let trade = service
        .propose_trade(
            LEAGUE,
            "m1",
            vec!["m2".to_string(), "m3".to_string()],
            vec![
                TradeItem {
                    player_id: "t_bad".to_string(),
                    from_member: "m1".to_string(),
                    to_member: "m3".to_string(),
                },
                TradeItem {
                    player_id: "t_good".to_string(),
                    from_member: "m3".to_string(),
                    to_member: "m1".to_string(),
                },
                TradeItem {
                    player_id: "t_mid".to_string(),
                    from_member: "m2".to_string(),
                    to_member: "m1".to_string(),
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(trade.status, TradeStatus::Declined);
    // The human recipient's decision was never resolved.
    let m2_participant = trade.participant("m2").unwrap();
    assert_eq!(m2_participant.decision, gridiron::trade::Decision::Pending);

    // No roster mutation anywhere.
    assert_eq!(
        service.roster_snapshot(LEAGUE, "m1").await.unwrap(),
        before_m1
    );
    assert_eq!(
        service.roster_snapshot(LEAGUE, "m2").await.unwrap(),
        before_m2
    );
    assert_eq!(
        service.roster_snapshot(LEAGUE, "m3").await.unwrap(),
        before_m3
    );
}

#[tokio::test]
async fn bot_accepts_favorable_trade_and_executes() {
    let service = setup(4, &[3], 2, 0).await;
    give_player(&service, "m1", "t_good").await;
    give_player(&service, "m3", "t_bad").await;

    // The bot receives the stud for its scrub: easy accept, and since it is
    // the only recipient the trade executes inside the propose call.
    let trade = service
        .propose_trade(
            LEAGUE,
            "m1",
            vec!["m3".to_string()],
            vec![
                TradeItem {
                    player_id: "t_good".to_string(),
                    from_member: "m1".to_string(),
                    to_member: "m3".to_string(),
                },
                TradeItem {
                    player_id: "t_bad".to_string(),
                    from_member: "m3".to_string(),
                    to_member: "m1".to_string(),
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(trade.status, TradeStatus::Completed);
    let m3_roster = service.roster_snapshot(LEAGUE, "m3").await.unwrap();
    assert!(m3_roster.iter().any(|e| e.player_id == "t_good"));
}

#[tokio::test]
async fn scenario_insufficient_bench_space_rejects_proposal() {
    // m2 nets +2 players but benches hold only one.
    let counts = RosterCounts {
        bench: 1,
        ..RosterCounts::default()
    };
    let catalog = PlayerCatalog::from_players(pool()).unwrap();
    let service = LeagueService::new(
        catalog,
        Box::new(XorShiftRng::seeded(42)),
        Arc::new(NullNotifier),
        None,
    );
    let league = League::new(LEAGUE, "Tight League", 4, counts, 2, 0);
    service
        .register_league(league, members(4, &[]))
        .await
        .unwrap();

    // m1 holds two tradable players: one on the bench, one moved to RB1.
    give_player(&service, "m1", "t_good").await;
    let entry = service.roster_snapshot(LEAGUE, "m1").await.unwrap()[0].clone();
    service
        .move_player(LEAGUE, "m1", entry.id, "RB1")
        .await
        .unwrap();
    give_player(&service, "m1", "t_bad").await;

    let err = service
        .propose_trade(
            LEAGUE,
            "m1",
            vec!["m2".to_string()],
            vec![
                TradeItem {
                    player_id: "t_good".to_string(),
                    from_member: "m1".to_string(),
                    to_member: "m2".to_string(),
                },
                TradeItem {
                    player_id: "t_bad".to_string(),
                    from_member: "m1".to_string(),
                    to_member: "m2".to_string(),
                },
            ],
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InsufficientRosterSpace {
            member_id: "m2".to_string(),
            required: 2,
            available: 1,
        }
    );
    // Nothing was created.
    assert!(matches!(
        service.trade_snapshot(LEAGUE, 1).await,
        Err(EngineError::TradeNotFound { .. })
    ));
}

#[tokio::test]
async fn decline_leaves_all_rosters_untouched() {
    let service = setup(4, &[], 2, 0).await;
    give_player(&service, "m1", "t_good").await;
    give_player(&service, "m2", "t_mid").await;

    let before = all_rostered(&service, 4).await;
    let trade = service
        .propose_trade(
            LEAGUE,
            "m1",
            vec!["m2".to_string()],
            vec![
                TradeItem {
                    player_id: "t_good".to_string(),
                    from_member: "m1".to_string(),
                    to_member: "m2".to_string(),
                },
                TradeItem {
                    player_id: "t_mid".to_string(),
                    from_member: "m2".to_string(),
                    to_member: "m1".to_string(),
                },
            ],
        )
        .await
        .unwrap();

    let trade = service.decline_trade(LEAGUE, "m2", trade.id).await.unwrap();
    assert_eq!(trade.status, TradeStatus::Declined);
    assert_eq!(all_rostered(&service, 4).await, before);

    // Terminal status: nobody can revive it.
    assert!(matches!(
        service.accept_trade(LEAGUE, "m2", trade.id).await,
        Err(EngineError::TradeNotPending { .. })
    ));
    assert!(matches!(
        service.cancel_trade(LEAGUE, "m1", trade.id).await,
        Err(EngineError::TradeNotPending { .. })
    ));
}

#[tokio::test]
async fn cancel_is_proposer_only() {
    let service = setup(4, &[], 2, 0).await;
    give_player(&service, "m1", "t_good").await;

    let trade = service
        .propose_trade(
            LEAGUE,
            "m1",
            vec!["m2".to_string()],
            vec![TradeItem {
                player_id: "t_good".to_string(),
                from_member: "m1".to_string(),
                to_member: "m2".to_string(),
            }],
        )
        .await
        .unwrap();

    assert!(matches!(
        service.cancel_trade(LEAGUE, "m2", trade.id).await,
        Err(EngineError::NotProposer { .. })
    ));
    let trade = service.cancel_trade(LEAGUE, "m1", trade.id).await.unwrap();
    assert_eq!(trade.status, TradeStatus::Canceled);
}

// ===========================================================================
// League-wide invariants
// ===========================================================================

#[tokio::test]
async fn no_double_ownership_across_draft_trades_and_pickups() {
    let service = setup(4, &[1, 2, 3, 4], 3, 0).await;
    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    service.start_draft(LEAGUE, "m1").await.unwrap();

    // Post-draft: a pickup and a bot trade on top of populated rosters.
    // t_none is unranked, so no bot ever drafted it.
    service
        .add_free_agent(LEAGUE, "m1", "t_none")
        .await
        .unwrap();

    let m1_roster = service.roster_snapshot(LEAGUE, "m1").await.unwrap();
    let m2_roster = service.roster_snapshot(LEAGUE, "m2").await.unwrap();
    let give = m1_roster.last().unwrap().player_id.clone();
    let get = m2_roster.last().unwrap().player_id.clone();
    let _ = service
        .propose_trade(
            LEAGUE,
            "m1",
            vec!["m2".to_string()],
            vec![
                TradeItem {
                    player_id: give,
                    from_member: "m1".to_string(),
                    to_member: "m2".to_string(),
                },
                TradeItem {
                    player_id: get,
                    from_member: "m2".to_string(),
                    to_member: "m1".to_string(),
                },
            ],
        )
        .await
        .unwrap();

    let rostered = all_rostered(&service, 4).await;
    let unique: HashSet<&String> = rostered.iter().collect();
    assert_eq!(
        unique.len(),
        rostered.len(),
        "a player may never appear on two rosters"
    );
}

#[tokio::test]
async fn drafted_players_never_reappear_on_the_board() {
    let service = setup(4, &[], 2, 0).await;
    service.schedule_draft(LEAGUE, "m1").await.unwrap();
    service.start_draft(LEAGUE, "m1").await.unwrap();

    let snapshot = service.draft_snapshot(LEAGUE).await.unwrap();
    let on_clock = snapshot.on_the_clock().unwrap().to_string();
    let best = service
        .available_players(LEAGUE, &PlayerFilter::default())
        .await
        .unwrap()[0]
        .id
        .clone();
    service.make_pick(LEAGUE, &on_clock, &best).await.unwrap();

    let board = service
        .available_players(LEAGUE, &PlayerFilter::default())
        .await
        .unwrap();
    assert!(board.iter().all(|p| p.id != best));

    // Position filter still applies on top of the exclusions.
    let rbs = service
        .available_players(
            LEAGUE,
            &PlayerFilter {
                position: Some(Position::RB),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(rbs.iter().all(|p| p.position == Position::RB));
}
