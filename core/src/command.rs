use crate::error::Result;
use crate::state::GameState;
use crate::types::CardId;

/// The three reversible transitions a session is built from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandKind {
    /// Turn one card face-up and count the move.
    Flip { card: CardId },
    /// Mark a resolved pair as matched.
    Match { first: CardId, second: CardId },
    /// Turn a mismatched pair face-down again. Touches no counters.
    Hide { first: CardId, second: CardId },
}

/// One reversible state transition, guarded against double execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Command {
    kind: CommandKind,
    executed: bool,
}

impl Command {
    pub const fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            executed: false,
        }
    }

    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    pub const fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn apply(&mut self, state: &mut GameState) -> Result<()> {
        if self.executed {
            return Ok(());
        }
        match self.kind {
            CommandKind::Flip { card } => {
                state.card_mut(card)?.flip();
                state.push_flipped(card);
                state.inc_moves();
            }
            CommandKind::Match { first, second } => {
                state.card_mut(first)?.mark_matched();
                state.card_mut(second)?.mark_matched();
                state.inc_matches();
            }
            CommandKind::Hide { first, second } => {
                state.card_mut(first)?.hide();
                state.card_mut(second)?.hide();
            }
        }
        self.executed = true;
        Ok(())
    }

    /// Exact inverse of `apply`. A `Hide` revert turns both cards back up
    /// without re-entering them into the flipped-set.
    pub fn revert(&mut self, state: &mut GameState) -> Result<()> {
        if !self.executed {
            return Ok(());
        }
        match self.kind {
            CommandKind::Flip { card } => {
                state.card_mut(card)?.hide();
                state.remove_flipped(card);
                state.dec_moves();
            }
            CommandKind::Match { first, second } => {
                state.card_mut(first)?.reset();
                state.card_mut(second)?.reset();
                state.dec_matches();
            }
            CommandKind::Hide { first, second } => {
                state.card_mut(first)?.flip();
                state.card_mut(second)?.flip();
            }
        }
        self.executed = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardFace};
    use crate::types::{CardCount, PairId};

    fn state(pairs: &[PairId]) -> GameState {
        let cards = pairs
            .iter()
            .enumerate()
            .map(|(index, &pair)| Card::new(index as CardId, pair, index as CardCount))
            .collect();
        GameState::from_cards(cards, 2).unwrap()
    }

    #[test]
    fn flip_applies_and_reverts_all_three_effects() {
        let mut state = state(&[0, 0, 1, 1]);
        let mut command = Command::new(CommandKind::Flip { card: 1 });

        command.apply(&mut state).unwrap();
        assert_eq!(state.card(1).unwrap().face(), CardFace::Up);
        assert_eq!(state.flipped(), &[1]);
        assert_eq!(state.moves(), 1);

        command.revert(&mut state).unwrap();
        assert_eq!(state.card(1).unwrap().face(), CardFace::Down);
        assert!(state.flipped().is_empty());
        assert_eq!(state.moves(), 0);
    }

    #[test]
    fn double_apply_and_double_revert_are_no_ops() {
        let mut state = state(&[0, 0, 1, 1]);
        let mut command = Command::new(CommandKind::Flip { card: 0 });

        command.apply(&mut state).unwrap();
        command.apply(&mut state).unwrap();
        assert_eq!(state.moves(), 1);
        assert_eq!(state.flipped(), &[0]);

        command.revert(&mut state).unwrap();
        command.revert(&mut state).unwrap();
        assert_eq!(state.moves(), 0);
        assert!(state.flipped().is_empty());
    }

    #[test]
    fn match_revert_unmatches_and_hides_both() {
        let mut state = state(&[0, 0, 1, 1]);
        state.card_mut(0).unwrap().flip();
        state.card_mut(1).unwrap().flip();

        let mut command = Command::new(CommandKind::Match { first: 0, second: 1 });
        command.apply(&mut state).unwrap();
        assert!(state.card(0).unwrap().face().is_matched());
        assert!(state.card(1).unwrap().face().is_matched());
        assert_eq!(state.matches_found(), 1);

        command.revert(&mut state).unwrap();
        assert_eq!(state.card(0).unwrap().face(), CardFace::Down);
        assert_eq!(state.card(1).unwrap().face(), CardFace::Down);
        assert_eq!(state.matches_found(), 0);
    }

    #[test]
    fn hide_round_trip_never_touches_counters() {
        let mut state = state(&[0, 1, 0, 1]);
        state.card_mut(0).unwrap().flip();
        state.card_mut(1).unwrap().flip();

        let mut command = Command::new(CommandKind::Hide { first: 0, second: 1 });
        command.apply(&mut state).unwrap();
        assert_eq!(state.card(0).unwrap().face(), CardFace::Down);
        assert_eq!(state.card(1).unwrap().face(), CardFace::Down);
        assert_eq!(state.moves(), 0);
        assert_eq!(state.matches_found(), 0);

        command.revert(&mut state).unwrap();
        assert_eq!(state.card(0).unwrap().face(), CardFace::Up);
        assert_eq!(state.card(1).unwrap().face(), CardFace::Up);
        assert_eq!(state.moves(), 0);
        assert_eq!(state.matches_found(), 0);
    }

    #[test]
    fn unknown_card_id_is_rejected() {
        let mut state = state(&[0, 0, 1, 1]);
        let mut command = Command::new(CommandKind::Flip { card: 9 });

        assert!(command.apply(&mut state).is_err());
        assert!(!command.is_executed());
    }
}
