// Snake-order arithmetic.
//
// Everything here is a pure function of (pick number, team count, order):
// no draft state beyond `current_pick` is ever consulted, so every
// turn-taking operation resolves the clock the same way.

/// 1-based round for a global 1-based pick number.
pub fn round_of(pick: u32, num_teams: u32) -> u32 {
    (pick - 1) / num_teams + 1
}

/// 1-based position within the round (before snake mirroring).
pub fn position_in_round(pick: u32, num_teams: u32) -> u32 {
    (pick - 1) % num_teams + 1
}

/// Index into the draft order for a pick. Odd rounds traverse the order
/// forward, even rounds reversed (the snake).
pub fn order_index(pick: u32, num_teams: u32) -> usize {
    let round = round_of(pick, num_teams);
    let pos = position_in_round(pick, num_teams);
    let pos = if round % 2 == 0 {
        num_teams - pos + 1
    } else {
        pos
    };
    (pos - 1) as usize
}

/// The member on the clock for a pick, given the order permutation.
pub fn on_the_clock<'a>(pick: u32, order: &'a [String]) -> &'a str {
    &order[order_index(pick, order.len() as u32)]
}
