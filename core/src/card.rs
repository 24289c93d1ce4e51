use serde::{Deserialize, Serialize};

use crate::types::{CardCount, CardId, PairId};

/// Player-visible face state of a single card.
///
/// `Matched` is a separate face rather than a flag: a matched card can never
/// be turned face-down again, so `hide` does not demote it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardFace {
    Down,
    Up,
    Matched,
}

impl CardFace {
    pub const fn is_face_up(self) -> bool {
        matches!(self, Self::Up | Self::Matched)
    }

    pub const fn is_matched(self) -> bool {
        matches!(self, Self::Matched)
    }
}

impl Default for CardFace {
    fn default() -> Self {
        Self::Down
    }
}

/// A flippable, matchable unit of the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    pair: PairId,
    position: CardCount,
    face: CardFace,
}

impl Card {
    pub const fn new(id: CardId, pair: PairId, position: CardCount) -> Self {
        Self {
            id,
            pair,
            position,
            face: CardFace::Down,
        }
    }

    pub const fn id(&self) -> CardId {
        self.id
    }

    pub const fn pair(&self) -> PairId {
        self.pair
    }

    pub const fn position(&self) -> CardCount {
        self.position
    }

    pub const fn face(&self) -> CardFace {
        self.face
    }

    /// A card accepts flips only while face-down.
    pub const fn is_interactable(&self) -> bool {
        matches!(self.face, CardFace::Down)
    }

    pub(crate) fn flip(&mut self) {
        if matches!(self.face, CardFace::Down) {
            self.face = CardFace::Up;
        }
    }

    /// Turn the card face-down again. Matched cards stay as they are.
    pub(crate) fn hide(&mut self) {
        if matches!(self.face, CardFace::Up) {
            self.face = CardFace::Down;
        }
    }

    pub(crate) fn mark_matched(&mut self) {
        self.face = CardFace::Matched;
    }

    /// Back to the face-down, unmatched state of a fresh deal.
    pub(crate) fn reset(&mut self) {
        self.face = CardFace::Down;
    }
}
