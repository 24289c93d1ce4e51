use core::num::Saturating;
use core::time::Duration;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use web_time::Instant;

use crate::GameConfig;
use crate::card::Card;
use crate::error::{GameError, Result};
use crate::types::{CardCount, CardId, GridSize, PairId};

/// Cards currently face-up and not yet resolved. Never holds more than two.
pub type FlippedSet = SmallVec<[CardId; 2]>;

/// Aggregate state of one game session.
///
/// Constructed from a validated deal and mutated only through the engine's
/// commands; consumers observe it through the read-only accessors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    cards: Vec<Card>,
    grid_size: GridSize,
    total_pairs: CardCount,
    moves: Saturating<CardCount>,
    matches_found: Saturating<CardCount>,
    flipped: FlippedSet,
    processing: bool,
    completed: bool,
    #[serde(skip)]
    started_at: Option<Instant>,
}

impl GameState {
    /// Build a session from a dealt board, validating the collaborator's
    /// output: exact card count, ids in deal order, every pair id twice.
    pub fn from_cards(cards: Vec<Card>, grid_size: GridSize) -> Result<Self> {
        let config = GameConfig::new(grid_size)?;

        if cards.len() != usize::from(config.total_cards()) {
            return Err(GameError::InvalidBoardShape);
        }
        if cards
            .iter()
            .enumerate()
            .any(|(index, card)| usize::from(card.id()) != index)
        {
            return Err(GameError::InvalidBoardShape);
        }

        let mut occurrences: HashMap<PairId, CardCount> = HashMap::new();
        for card in &cards {
            *occurrences.entry(card.pair()).or_default() += 1;
        }
        if occurrences.len() != usize::from(config.total_pairs())
            || occurrences.values().any(|&count| count != 2)
        {
            return Err(GameError::UnbalancedDeal);
        }

        Ok(Self {
            cards,
            grid_size,
            total_pairs: config.total_pairs(),
            moves: Saturating(0),
            matches_found: Saturating(0),
            flipped: FlippedSet::new(),
            processing: false,
            completed: false,
            started_at: None,
        })
    }

    /// Back to the just-dealt state: counters zeroed, every card face-down.
    pub fn reset(&mut self) {
        self.moves = Saturating(0);
        self.matches_found = Saturating(0);
        self.flipped.clear();
        self.processing = false;
        self.completed = false;
        self.started_at = None;
        for card in &mut self.cards {
            card.reset();
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Result<&Card> {
        self.cards.get(usize::from(id)).ok_or(GameError::InvalidCard)
    }

    pub(crate) fn card_mut(&mut self, id: CardId) -> Result<&mut Card> {
        self.cards
            .get_mut(usize::from(id))
            .ok_or(GameError::InvalidCard)
    }

    pub const fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub const fn total_pairs(&self) -> CardCount {
        self.total_pairs
    }

    pub const fn moves(&self) -> CardCount {
        self.moves.0
    }

    pub const fn matches_found(&self) -> CardCount {
        self.matches_found.0
    }

    pub const fn is_processing(&self) -> bool {
        self.processing
    }

    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Ids of the face-up, unresolved cards, in flip order.
    pub fn flipped(&self) -> &[CardId] {
        &self.flipped
    }

    /// Time since the first flip of the session, zero before it.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|started_at| started_at.elapsed())
            .unwrap_or_default()
    }

    pub(crate) fn mark_started(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    pub(crate) fn push_flipped(&mut self, id: CardId) {
        debug_assert!(self.flipped.len() < 2);
        self.flipped.push(id);
    }

    pub(crate) fn remove_flipped(&mut self, id: CardId) {
        self.flipped.retain(|&mut flipped| flipped != id);
    }

    pub(crate) fn clear_flipped(&mut self) {
        self.flipped.clear();
    }

    pub(crate) fn inc_moves(&mut self) {
        self.moves += 1;
    }

    pub(crate) fn dec_moves(&mut self) {
        self.moves -= 1;
    }

    pub(crate) fn inc_matches(&mut self) {
        self.matches_found += 1;
    }

    pub(crate) fn dec_matches(&mut self) {
        self.matches_found -= 1;
    }

    pub(crate) fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }

    /// Latch the completion flag once matches reach the pair total.
    /// Returns true only on the latching transition; undo never unlatches.
    pub(crate) fn try_latch_completed(&mut self) -> bool {
        if !self.completed && self.matches_found.0 == self.total_pairs {
            self.completed = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(pairs: &[PairId]) -> Vec<Card> {
        pairs
            .iter()
            .enumerate()
            .map(|(index, &pair)| Card::new(index as CardId, pair, index as CardCount))
            .collect()
    }

    #[test]
    fn from_cards_accepts_a_balanced_deal() {
        let state = GameState::from_cards(deal(&[0, 1, 1, 0]), 2).unwrap();

        assert_eq!(state.total_pairs(), 2);
        assert_eq!(state.moves(), 0);
        assert_eq!(state.matches_found(), 0);
        assert!(state.flipped().is_empty());
        assert!(!state.is_processing());
        assert!(!state.is_completed());
    }

    #[test]
    fn from_cards_rejects_wrong_card_count() {
        let result = GameState::from_cards(deal(&[0, 0, 1]), 2);
        assert_eq!(result.unwrap_err(), GameError::InvalidBoardShape);
    }

    #[test]
    fn from_cards_rejects_ids_out_of_deal_order() {
        let mut cards = deal(&[0, 0, 1, 1]);
        cards.swap(0, 1);
        let result = GameState::from_cards(cards, 2);
        assert_eq!(result.unwrap_err(), GameError::InvalidBoardShape);
    }

    #[test]
    fn from_cards_rejects_unbalanced_pairs() {
        let result = GameState::from_cards(deal(&[0, 1, 2, 3]), 2);
        assert_eq!(result.unwrap_err(), GameError::UnbalancedDeal);

        let result = GameState::from_cards(deal(&[0, 0, 0, 0]), 2);
        assert_eq!(result.unwrap_err(), GameError::UnbalancedDeal);
    }

    #[test]
    fn reset_restores_the_fresh_deal() {
        let mut state = GameState::from_cards(deal(&[0, 0, 1, 1]), 2).unwrap();
        state.card_mut(0).unwrap().flip();
        state.push_flipped(0);
        state.inc_moves();
        state.card_mut(2).unwrap().mark_matched();
        state.inc_matches();
        state.set_processing(true);
        state.mark_started();

        state.reset();

        assert_eq!(state.moves(), 0);
        assert_eq!(state.matches_found(), 0);
        assert!(state.flipped().is_empty());
        assert!(!state.is_processing());
        assert!(!state.is_completed());
        assert_eq!(state.elapsed(), Duration::ZERO);
        assert!(state.cards().iter().all(Card::is_interactable));
    }

    #[test]
    fn completion_latches_exactly_once() {
        let mut state = GameState::from_cards(deal(&[0, 0, 1, 1]), 2).unwrap();
        state.inc_matches();
        assert!(!state.try_latch_completed());

        state.inc_matches();
        assert!(state.try_latch_completed());
        assert!(state.is_completed());

        // Still latched after an undo brings the count back down.
        state.dec_matches();
        assert!(!state.try_latch_completed());
        assert!(state.is_completed());

        state.inc_matches();
        assert!(!state.try_latch_completed());
    }

    #[test]
    fn snapshot_survives_a_serde_round_trip() {
        let mut state = GameState::from_cards(deal(&[1, 0, 0, 1]), 2).unwrap();
        state.card_mut(0).unwrap().flip();
        state.push_flipped(0);
        state.inc_moves();

        let encoded = serde_json::to_string(&state).unwrap();
        let decoded: GameState = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, state);
    }
}
