/// Side length of the square board.
pub type GridSize = u8;

/// Index of a card within the dealt board, in deal order.
pub type CardId = u16;

/// Identifies which two cards of a deal match each other.
pub type PairId = u16;

/// Count type used for cards, pairs, moves, and matches.
pub type CardCount = u16;

pub const fn square(side: GridSize) -> CardCount {
    let side = side as CardCount;
    side.saturating_mul(side)
}
