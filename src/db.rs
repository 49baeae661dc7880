// SQLite persistence for draft picks, trade records, and league state.
//
// The stores themselves are in-memory; this layer journals what happened so
// a restarted process can rebuild a draft in progress and keep a trade
// history. Writes are idempotent where replays are possible (pick recording
// races the clock task).

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::draft::engine::DraftPick;
use crate::trade::Trade;

/// SQLite-backed journal. `Mutex<Connection>` because rusqlite connections
/// are not Sync and callers arrive from async tasks.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at `path` and ensure the schema exists.
    /// Pass `":memory:"` for an ephemeral database in tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS draft_picks (
                pick_number INTEGER NOT NULL,
                round       INTEGER NOT NULL,
                member_id   TEXT NOT NULL,
                player_id   TEXT NOT NULL,
                draft_id    TEXT NOT NULL,
                timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (pick_number, draft_id)
            );

            CREATE INDEX IF NOT EXISTS idx_draft_picks_draft_id
                ON draft_picks(draft_id);

            CREATE TABLE IF NOT EXISTS trades (
                id         INTEGER NOT NULL,
                league_id  TEXT NOT NULL,
                status     TEXT NOT NULL,
                payload    TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (id, league_id)
            );

            CREATE TABLE IF NOT EXISTS league_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Draft picks
    // ------------------------------------------------------------------

    /// Record a pick. Uses INSERT OR IGNORE for idempotency: re-recording
    /// the same pick number for the same draft is a no-op, which makes the
    /// auto-pick race safe to journal from either path.
    pub fn record_pick(&self, pick: &DraftPick, draft_id: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO draft_picks
                (pick_number, round, member_id, player_id, draft_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                pick.pick_number,
                pick.round,
                pick.member_id,
                pick.player_id,
                draft_id,
            ],
        )
        .context("failed to record draft pick")?;
        Ok(())
    }

    /// Load a draft's picks in pick-number order.
    pub fn load_picks(&self, draft_id: &str) -> Result<Vec<DraftPick>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT pick_number, round, member_id, player_id
                 FROM draft_picks WHERE draft_id = ?1 ORDER BY pick_number",
            )
            .context("failed to prepare load_picks query")?;

        let picks = stmt
            .query_map(params![draft_id], |row| {
                Ok(DraftPick {
                    pick_number: row.get(0)?,
                    round: row.get(1)?,
                    member_id: row.get(2)?,
                    player_id: row.get(3)?,
                })
            })
            .context("failed to query draft picks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map draft pick rows")?;

        Ok(picks)
    }

    /// Whether any pick has been recorded for the draft.
    pub fn has_draft_in_progress(&self, draft_id: &str) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM draft_picks WHERE draft_id = ?1)",
                params![draft_id],
                |row| row.get(0),
            )
            .context("failed to check draft_picks existence")?;
        Ok(exists)
    }

    /// Number of picks recorded for the draft.
    pub fn pick_count(&self, draft_id: &str) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM draft_picks WHERE draft_id = ?1",
                params![draft_id],
                |row| row.get(0),
            )
            .context("failed to count draft picks")?;
        Ok(count as usize)
    }

    // ------------------------------------------------------------------
    // Trades
    // ------------------------------------------------------------------

    /// Journal a trade's full state. INSERT OR REPLACE so decision and
    /// status updates overwrite the prior snapshot.
    pub fn record_trade(&self, trade: &Trade) -> Result<()> {
        let conn = self.conn();
        let payload = serde_json::to_string(trade).context("failed to serialize trade")?;
        let status =
            serde_json::to_string(&trade.status).context("failed to serialize trade status")?;
        conn.execute(
            "INSERT OR REPLACE INTO trades (id, league_id, status, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                trade.id as i64,
                trade.league_id,
                status.trim_matches('"'),
                payload,
                trade.created_at.to_rfc3339(),
            ],
        )
        .context("failed to record trade")?;
        Ok(())
    }

    /// Load every journaled trade for a league, oldest first.
    pub fn load_trades(&self, league_id: &str) -> Result<Vec<Trade>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT payload FROM trades WHERE league_id = ?1 ORDER BY id")
            .context("failed to prepare load_trades query")?;

        let payloads = stmt
            .query_map(params![league_id], |row| row.get::<_, String>(0))
            .context("failed to query trades")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map trade rows")?;

        payloads
            .iter()
            .map(|p| serde_json::from_str(p).context("failed to deserialize trade payload"))
            .collect()
    }

    // ------------------------------------------------------------------
    // League state (key-value)
    // ------------------------------------------------------------------

    /// Persist an arbitrary JSON value under `key`, overwriting any
    /// previous value.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str = serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO league_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Load a previously saved JSON value. `None` when the key is absent.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM league_state WHERE key = ?1")
            .context("failed to prepare load_state query")?;

        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query league state")?;

        match rows.next() {
            Some(row_result) => {
                let json_str = row_result.context("failed to read state row")?;
                let value: serde_json::Value = serde_json::from_str(&json_str)
                    .context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Draft ID management
    // ------------------------------------------------------------------

    /// Key in league_state for a league's active draft id.
    fn draft_id_key(league_id: &str) -> String {
        format!("draft_id/{league_id}")
    }

    /// Retrieve the stored draft id for a league.
    pub fn get_draft_id(&self, league_id: &str) -> Result<Option<String>> {
        let value = self.load_state(&Self::draft_id_key(league_id))?;
        Ok(value.and_then(|v| v.as_str().map(|s| s.to_string())))
    }

    /// Persist a league's active draft id.
    pub fn set_draft_id(&self, league_id: &str, draft_id: &str) -> Result<()> {
        self.save_state(
            &Self::draft_id_key(league_id),
            &serde_json::Value::String(draft_id.to_string()),
        )
    }

    /// Generate a unique draft id from the current UTC timestamp, with a
    /// millisecond suffix so two drafts in the same second don't collide.
    pub fn generate_draft_id() -> String {
        chrono::Utc::now().format("draft_%Y%m%d_%H%M%S_%3f").to_string()
    }
}
