// League manager entry point: runs a full simulated season opening.
//
// Startup sequence:
// 1. Initialize tracing (stderr, env-filtered)
// 2. Load config
// 3. Open the database
// 4. Import the player catalog CSV
// 5. Register an all-bot league
// 6. Schedule and start the draft (bots draft to completion)
// 7. Propose a trade between two bots and report the outcome
// 8. Print final rosters

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use gridiron::catalog::PlayerCatalog;
use gridiron::config;
use gridiron::db::Database;
use gridiron::league::{League, Member};
use gridiron::notify::LogNotifier;
use gridiron::rng::XorShiftRng;
use gridiron::service::LeagueService;
use gridiron::trade::TradeItem;

const LEAGUE_ID: &str = "league-1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("gridiron starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, {} rounds",
        config.league.name, config.league.num_teams, config.league.draft_rounds
    );

    let db = Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    let catalog = PlayerCatalog::load_csv(Path::new(&config.players_path))
        .context("failed to import player catalog")?;
    info!("Imported {} players", catalog.len());

    let service = LeagueService::new(
        catalog,
        Box::new(XorShiftRng::from_entropy()),
        Arc::new(LogNotifier),
        Some(db),
    );

    // An all-bot league: the draft and the demo trade run unattended.
    let league = League::new(
        LEAGUE_ID,
        config.league.name.clone(),
        config.league.num_teams,
        config.league.roster,
        config.league.draft_rounds,
        config.league.pick_clock_secs,
    );
    let members: Vec<Member> = (1..=config.league.num_teams)
        .map(|i| {
            let member = Member::bot(format!("m{i}"), LEAGUE_ID, format!("Bot Team {i}"));
            if i == 1 {
                member.commissioner()
            } else {
                member
            }
        })
        .collect();
    let member_ids: Vec<String> = members.iter().map(|m| m.id.clone()).collect();

    service
        .register_league(league, members)
        .await
        .context("failed to register league")?;

    let draft = service
        .schedule_draft(LEAGUE_ID, "m1")
        .await
        .context("failed to schedule draft")?;
    info!("Draft scheduled, order: {:?}", draft.order);

    let report = service
        .start_draft(LEAGUE_ID, "m1")
        .await
        .context("failed to start draft")?;
    info!(
        "Draft finished: {} bot picks, completed={}",
        report.bot_picks.len(),
        report.completed
    );
    if let Some(population) = &report.population {
        info!(
            "Rosters populated: {} placed, {} unplaced",
            population.placed,
            population.unplaced.len()
        );
    }

    run_demo_trade(&service).await?;

    println!("=== Final rosters ===");
    for member_id in &member_ids {
        let roster = service.roster_snapshot(LEAGUE_ID, member_id).await?;
        println!("{member_id}:");
        for entry in roster {
            let name = service
                .catalog()
                .get(&entry.player_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| entry.player_id.clone());
            println!("  {:<5} {name} ({:?})", entry.slot, entry.acquired);
        }
    }

    info!("gridiron shut down cleanly");
    Ok(())
}

/// Offer m2's best bench player m1's worst: the bot policy decides.
async fn run_demo_trade(service: &Arc<LeagueService>) -> anyhow::Result<()> {
    let m1_roster = service.roster_snapshot(LEAGUE_ID, "m1").await?;
    let m2_roster = service.roster_snapshot(LEAGUE_ID, "m2").await?;

    let give = m1_roster
        .iter()
        .rev()
        .find(|e| e.slot.starts_with("BN"))
        .map(|e| e.player_id.clone());
    let get = m2_roster
        .iter()
        .find(|e| e.slot.starts_with("BN"))
        .map(|e| e.player_id.clone());

    let (Some(give), Some(get)) = (give, get) else {
        info!("no bench players available for the demo trade");
        return Ok(());
    };

    let trade = service
        .propose_trade(
            LEAGUE_ID,
            "m1",
            vec!["m2".to_string()],
            vec![
                TradeItem {
                    player_id: give.clone(),
                    from_member: "m1".to_string(),
                    to_member: "m2".to_string(),
                },
                TradeItem {
                    player_id: get.clone(),
                    from_member: "m2".to_string(),
                    to_member: "m1".to_string(),
                },
            ],
        )
        .await
        .context("failed to propose demo trade")?;

    info!(
        "Demo trade ({give} for {get}) resolved by bot policy: {:?}",
        trade.status
    );
    Ok(())
}

/// Initialize tracing to stderr with env-filter support
/// (e.g. `RUST_LOG=gridiron=debug`).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridiron=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;
    Ok(())
}
