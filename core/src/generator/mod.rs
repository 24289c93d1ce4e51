use crate::GameConfig;
use crate::card::Card;
use crate::error::Result;

pub use shuffled::*;

mod shuffled;

/// External collaborator that deals the board for a new session.
///
/// The engine treats implementations as opaque and possibly asynchronous
/// (sprite stores, remote decks) and revalidates whatever they return.
/// Failures propagate unchanged to the `start_new_game` caller.
#[allow(async_fn_in_trait)]
pub trait CardGenerator {
    /// Deal `config.total_cards()` cards in presentation order, with every
    /// pair id appearing on exactly two of them.
    async fn generate(&mut self, config: GameConfig) -> Result<Vec<Card>>;
}
