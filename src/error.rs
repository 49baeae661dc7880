// Typed errors for the league transaction engine.

use thiserror::Error;

/// Broad classification of an `EngineError`, used by callers that care about
/// the category of a failure (e.g. HTTP mapping, metrics) rather than the
/// specific variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The acting member is not allowed to perform this operation
    /// (role, membership, or turn violations).
    Authorization,
    /// The operation is valid in general but not in the entity's current
    /// state (wrong phase/status, occupied slot, already drafted/owned).
    StateConflict,
    /// The request itself is malformed or violates a structural rule.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// A selection pool has been exhausted.
    Exhaustion,
}

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    // --- authorization ---
    #[error("member `{member_id}` is not the league commissioner")]
    NotCommissioner { member_id: String },

    #[error("member `{member_id}` is not a member of league `{league_id}`")]
    NotAMember { member_id: String, league_id: String },

    #[error("member `{member_id}` is not on the clock")]
    NotYourTurn { member_id: String },

    #[error("member `{member_id}` is not the proposer of trade {trade_id}")]
    NotProposer { member_id: String, trade_id: u64 },

    #[error("member `{member_id}` is not a participant in trade {trade_id}")]
    NotAParticipant { member_id: String, trade_id: u64 },

    #[error("member `{member_id}` has no pending decision on trade {trade_id}")]
    NotPending { member_id: String, trade_id: u64 },

    #[error("roster entry {entry_id} does not belong to member `{member_id}`")]
    NotEntryOwner { entry_id: u64, member_id: String },

    // --- state conflicts ---
    #[error("draft is not in progress")]
    DraftNotActive,

    #[error("draft is not in the scheduled state")]
    DraftNotScheduled,

    #[error("a draft already exists for league `{league_id}`")]
    DraftAlreadyExists { league_id: String },

    #[error("league `{league_id}` is already registered")]
    LeagueAlreadyExists { league_id: String },

    #[error("league `{league_id}` is not full ({current}/{required} members)")]
    LeagueNotFull {
        league_id: String,
        current: usize,
        required: usize,
    },

    #[error("player `{player_id}` has already been drafted")]
    PlayerAlreadyDrafted { player_id: String },

    #[error("player `{player_id}` is already on a roster in this league")]
    PlayerAlreadyOwned { player_id: String },

    #[error("slot `{slot}` is already occupied for member `{member_id}`")]
    SlotOccupied { member_id: String, slot: String },

    #[error("trade {trade_id} is no longer pending")]
    TradeNotPending { trade_id: u64 },

    #[error("trade {trade_id} went stale before execution: {reason}")]
    StaleTrade { trade_id: u64, reason: String },

    // --- validation ---
    #[error("player `{player_id}` is not eligible for slot `{slot}`")]
    IneligiblePosition { player_id: String, slot: String },

    #[error(
        "swap rejected: the occupant of `{target_slot}` cannot move to `{vacated_slot}`"
    )]
    IneligibleSwap {
        target_slot: String,
        vacated_slot: String,
    },

    #[error(
        "member `{member_id}` needs {required} open bench slots but has {available}"
    )]
    InsufficientRosterSpace {
        member_id: String,
        required: usize,
        available: usize,
    },

    #[error("trade must name at least one recipient")]
    NoRecipients,

    #[error("trade must contain at least one item")]
    NoItems,

    #[error("member `{member_id}` appears more than once in the recipient list")]
    DuplicateRecipient { member_id: String },

    #[error("the proposer cannot also be a recipient")]
    ProposerIsRecipient,

    #[error("trade item for player `{player_id}` has the same source and destination")]
    ItemSourceIsDestination { player_id: String },

    #[error("player `{player_id}` appears in more than one trade item")]
    DuplicateItemPlayer { player_id: String },

    #[error("trade item endpoint `{member_id}` is not a trade participant")]
    ItemEndpointNotParticipant { member_id: String },

    #[error("member `{member_id}` does not own player `{player_id}`")]
    NotOwner {
        member_id: String,
        player_id: String,
    },

    #[error(
        "draft needs {rounds} draftable slots per member but the layout only has {capacity}"
    )]
    RosterTooSmall { rounds: u32, capacity: usize },

    // --- not found ---
    #[error("league `{league_id}` not found")]
    LeagueNotFound { league_id: String },

    #[error("no draft exists for league `{league_id}`")]
    DraftNotFound { league_id: String },

    #[error("trade {trade_id} not found")]
    TradeNotFound { trade_id: u64 },

    #[error("roster entry {entry_id} not found")]
    EntryNotFound { entry_id: u64 },

    #[error("player `{player_id}` not found in the catalog")]
    PlayerNotFound { player_id: String },

    #[error("member `{member_id}` not found")]
    MemberNotFound { member_id: String },

    #[error("slot `{slot}` does not exist in this league's layout")]
    SlotNotFound { slot: String },

    // --- exhaustion ---
    #[error("no available players remain to pick from")]
    NoAvailablePlayers,
}

impl EngineError {
    /// Map a specific error onto its broad category.
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;
        match self {
            NotCommissioner { .. }
            | NotAMember { .. }
            | NotYourTurn { .. }
            | NotProposer { .. }
            | NotAParticipant { .. }
            | NotPending { .. }
            | NotEntryOwner { .. } => ErrorKind::Authorization,

            DraftNotActive
            | DraftNotScheduled
            | DraftAlreadyExists { .. }
            | LeagueAlreadyExists { .. }
            | LeagueNotFull { .. }
            | PlayerAlreadyDrafted { .. }
            | PlayerAlreadyOwned { .. }
            | SlotOccupied { .. }
            | TradeNotPending { .. }
            | StaleTrade { .. } => ErrorKind::StateConflict,

            IneligiblePosition { .. }
            | IneligibleSwap { .. }
            | InsufficientRosterSpace { .. }
            | NoRecipients
            | NoItems
            | DuplicateRecipient { .. }
            | ProposerIsRecipient
            | ItemSourceIsDestination { .. }
            | DuplicateItemPlayer { .. }
            | ItemEndpointNotParticipant { .. }
            | NotOwner { .. }
            | RosterTooSmall { .. } => ErrorKind::Validation,

            LeagueNotFound { .. }
            | DraftNotFound { .. }
            | TradeNotFound { .. }
            | EntryNotFound { .. }
            | PlayerNotFound { .. }
            | MemberNotFound { .. }
            | SlotNotFound { .. } => ErrorKind::NotFound,

            NoAvailablePlayers => ErrorKind::Exhaustion,
        }
    }
}
