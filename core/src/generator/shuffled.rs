use rand::prelude::*;

use super::CardGenerator;
use crate::GameConfig;
use crate::card::Card;
use crate::error::Result;
use crate::types::{CardCount, CardId, PairId};

/// Deals a uniformly shuffled board from a fixed seed.
///
/// Pair ids `0..pairs` are laid out twice each and Fisher-Yates shuffled, so
/// every deal is balanced by construction and reproducible by seed. Each deal
/// advances the seed, giving a reproducible *sequence* of boards across
/// consecutive games.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShuffledCardGenerator {
    seed: u64,
}

impl ShuffledCardGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl CardGenerator for ShuffledCardGenerator {
    async fn generate(&mut self, config: GameConfig) -> Result<Vec<Card>> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        self.seed = rng.next_u64();

        let mut pair_ids: Vec<PairId> = (0..config.total_pairs())
            .flat_map(|pair| [pair, pair])
            .collect();
        pair_ids.shuffle(&mut rng);

        log::debug!(
            "dealt {} cards ({} pairs)",
            config.total_cards(),
            config.total_pairs()
        );

        Ok(pair_ids
            .into_iter()
            .enumerate()
            .map(|(position, pair)| Card::new(position as CardId, pair, position as CardCount))
            .collect())
    }
}
