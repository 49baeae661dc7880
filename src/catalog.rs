// Player catalog: the read-only collaborator holding the global player pool.
//
// Players arrive from a CSV export of the stats feed (id, name, position,
// team, ADP, injury status). The transaction engine never mutates catalog
// data; it only looks players up and filters them.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read player file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Football positions a player can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::DEF,
    ];

    /// Parse a position code. Accepts the common "DST" alias for DEF.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "QB" => Some(Position::QB),
            "RB" => Some(Position::RB),
            "WR" => Some(Position::WR),
            "TE" => Some(Position::TE),
            "K" => Some(Position::K),
            "DEF" | "DST" => Some(Position::DEF),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DEF",
        }
    }

    /// Whether a player of this position may fill a FLEX starter slot.
    pub fn is_flex_eligible(&self) -> bool {
        matches!(self, Position::RB | Position::WR | Position::TE)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Injury designation from the stats feed. Any non-null status makes a
/// player eligible for IR slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryStatus {
    Questionable,
    Doubtful,
    Out,
    InjuredReserve,
}

impl InjuryStatus {
    /// Parse a feed designation. Empty or unknown strings mean healthy.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "Q" | "QUESTIONABLE" => Some(InjuryStatus::Questionable),
            "D" | "DOUBTFUL" => Some(InjuryStatus::Doubtful),
            "O" | "OUT" => Some(InjuryStatus::Out),
            "IR" => Some(InjuryStatus::InjuredReserve),
            _ => None,
        }
    }
}

/// A catalog player. Read-only from the engine's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub position: Position,
    /// NFL team abbreviation (e.g. "KC", "PHI"). Free agents use "FA".
    pub team: String,
    /// Average draft position rank; lower = more valuable. Absent for
    /// deep-pool players the feed doesn't rank.
    pub adp: Option<f64>,
    pub injury: Option<InjuryStatus>,
}

/// Order players by ascending ADP, nulls last, then by name. This is the
/// canonical "best available" ordering used by the draft board and the bots.
pub fn adp_then_name(a: &Player, b: &Player) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a.adp, b.adp) {
        (Some(x), Some(y)) => x
            .partial_cmp(&y)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}

/// Search criteria for the catalog (and for the draft's available-player
/// board, which layers draft/ownership exclusions on top).
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub position: Option<Position>,
    /// Case-insensitive substring match against the player name.
    pub text: Option<String>,
    pub team: Option<String>,
}

impl PlayerFilter {
    pub fn matches(&self, player: &Player) -> bool {
        if let Some(pos) = self.position {
            if player.position != pos {
                return false;
            }
        }
        if let Some(text) = &self.text {
            if !player.name.to_lowercase().contains(&text.to_lowercase()) {
                return false;
            }
        }
        if let Some(team) = &self.team {
            if !player.team.eq_ignore_ascii_case(team) {
                return false;
            }
        }
        true
    }
}

/// Raw CSV row shape. Converted into `Player` after parsing so position and
/// injury codes get validated in one place.
#[derive(Debug, Deserialize)]
struct PlayerRecord {
    id: String,
    name: String,
    position: String,
    team: String,
    #[serde(default)]
    adp: Option<f64>,
    #[serde(default)]
    injury: String,
}

/// In-memory player catalog with id lookup and filtered search.
#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: Vec<Player>,
    by_id: HashMap<String, usize>,
}

impl PlayerCatalog {
    /// Build a catalog from already-constructed players. Fails on duplicate
    /// player ids.
    pub fn from_players(players: Vec<Player>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(players.len());
        for (idx, player) in players.iter().enumerate() {
            if by_id.insert(player.id.clone(), idx).is_some() {
                return Err(CatalogError::Validation(format!(
                    "duplicate player id `{}`",
                    player.id
                )));
            }
        }
        Ok(PlayerCatalog { players, by_id })
    }

    /// Load a catalog from a CSV file with headers
    /// `id,name,position,team,adp,injury`.
    pub fn load_csv(path: &Path) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_players(read_players(file, path)?)
    }

    pub fn get(&self, player_id: &str) -> Option<&Player> {
        self.by_id.get(player_id).map(|&idx| &self.players[idx])
    }

    /// All players matching the filter, in best-available order.
    pub fn search(&self, filter: &PlayerFilter) -> Vec<&Player> {
        let mut matches: Vec<&Player> =
            self.players.iter().filter(|p| filter.matches(p)).collect();
        matches.sort_by(|a, b| adp_then_name(a, b));
        matches
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Parse players out of any reader. `path` is only used for error context.
fn read_players<R: Read>(rdr: R, path: &Path) -> Result<Vec<Player>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();
    for record in reader.deserialize::<PlayerRecord>() {
        let record = record.map_err(|source| CatalogError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let position = Position::from_code(&record.position).ok_or_else(|| {
            CatalogError::Validation(format!(
                "unknown position `{}` for player `{}`",
                record.position, record.id
            ))
        })?;
        players.push(Player {
            id: record.id,
            name: record.name,
            position,
            team: record.team,
            adp: record.adp,
            injury: InjuryStatus::from_code(&record.injury),
        });
    }
    Ok(players)
}
