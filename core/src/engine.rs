use core::time::Duration;

use futures_channel::mpsc;
use serde::{Deserialize, Serialize};

use crate::GameConfig;
use crate::card::Card;
use crate::command::{Command, CommandKind};
use crate::error::Result;
use crate::generator::CardGenerator;
use crate::state::GameState;
use crate::types::{CardCount, CardId, GridSize};

/// Session events, emitted in the exact order the transitions occur:
/// started, flipped, match or mismatch, completed. Never batched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted { grid_size: GridSize },
    CardFlipped { card: Card },
    MatchFound { first: Card, second: Card },
    MismatchFound,
    GameCompleted { total_moves: CardCount },
    MoveUndone,
}

/// Ordered stream of session events, one receiver per subscriber.
pub type EventStream = mpsc::UnboundedReceiver<GameEvent>;

/// Where the session state machine currently sits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnginePhase {
    /// No active session.
    Idle,
    /// A session exists and accepts flips.
    AwaitingInput,
    /// Two cards are face-up and being resolved; new flips are ignored.
    Evaluating,
}

/// Outcome of a flip attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// The flip was ignored: no session, a resolution in flight, or the
    /// card already face-up or matched.
    NoChange,
    Flipped,
    Matched,
    Mismatched,
    /// The flip resolved the final pair.
    Completed,
}

impl FlipOutcome {
    /// Whether this outcome could have caused an update to the session.
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Outcome of an undo request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UndoOutcome {
    NoChange,
    Undone,
}

impl UndoOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Undone)
    }
}

pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_secs(1);

/// Orchestrates a session over reversible commands.
///
/// Flips, matches, and hides go through the command history so they can be
/// undone one step at a time. The card generator is an external collaborator
/// queried once per new game.
#[derive(Debug)]
pub struct MatchEngine<G> {
    generator: G,
    state: Option<GameState>,
    history: Vec<Command>,
    subscribers: Vec<mpsc::UnboundedSender<GameEvent>>,
    reveal_delay: Duration,
}

impl<G: CardGenerator> MatchEngine<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            state: None,
            history: Vec::new(),
            subscribers: Vec::new(),
            reveal_delay: DEFAULT_REVEAL_DELAY,
        }
    }

    /// How long both cards of an attempt stay visible before resolution.
    pub fn with_reveal_delay(mut self, reveal_delay: Duration) -> Self {
        self.reveal_delay = reveal_delay;
        self
    }

    pub const fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }

    /// Read-only snapshot of the current session, if any.
    pub fn game_state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn phase(&self) -> EnginePhase {
        match &self.state {
            None => EnginePhase::Idle,
            Some(state) if state.is_processing() => EnginePhase::Evaluating,
            Some(_) => EnginePhase::AwaitingInput,
        }
    }

    /// Subscribe to the ordered event stream. Subscriptions outlive sessions;
    /// a disconnected receiver is dropped on the next emission.
    pub fn subscribe(&mut self) -> EventStream {
        let (sender, receiver) = mpsc::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Start a fresh session, replacing any current one.
    ///
    /// The command history is cleared up front, so a generation failure
    /// leaves the previous session in place but with nothing left to undo.
    pub async fn start_new_game(&mut self, grid_size: GridSize) -> Result<()> {
        let config = GameConfig::new(grid_size)?;
        self.history.clear();

        let cards = self.generator.generate(config).await?;
        let state = GameState::from_cards(cards, grid_size)?;

        log::debug!(
            "new game: {0}x{0} board, {1} pairs",
            grid_size,
            state.total_pairs()
        );
        self.state = Some(state);
        self.emit(GameEvent::GameStarted { grid_size });
        Ok(())
    }

    /// Attempt to flip `card`.
    ///
    /// Ignored flips report [`FlipOutcome::NoChange`] and emit nothing. When
    /// the flip reveals the second card of an attempt, the call suspends for
    /// the reveal delay and resolves the pair before returning.
    pub async fn try_flip_card(&mut self, card: CardId) -> Result<FlipOutcome> {
        let flipped_card;
        let pair_pending;
        {
            let Some(state) = self.state.as_mut() else {
                return Ok(FlipOutcome::NoChange);
            };
            if state.is_processing() {
                log::debug!("flip of card {card} ignored: resolution in flight");
                return Ok(FlipOutcome::NoChange);
            }
            if !state.card(card)?.is_interactable() {
                return Ok(FlipOutcome::NoChange);
            }

            let mut command = Command::new(CommandKind::Flip { card });
            command.apply(state)?;
            self.history.push(command);

            state.mark_started();
            flipped_card = *state.card(card)?;
            pair_pending = state.flipped().len() == 2;
            if pair_pending {
                state.set_processing(true);
            }
        }

        self.emit(GameEvent::CardFlipped { card: flipped_card });
        if pair_pending {
            self.resolve_pending_pair().await
        } else {
            Ok(FlipOutcome::Flipped)
        }
    }

    /// Undo the most recent command, one step at a time.
    ///
    /// A resolved round is two or three commands deep, so fully rewinding it
    /// takes repeated calls.
    pub fn undo_last_move(&mut self) -> Result<UndoOutcome> {
        let Some(state) = self.state.as_mut() else {
            return Ok(UndoOutcome::NoChange);
        };
        let Some(mut command) = self.history.pop() else {
            return Ok(UndoOutcome::NoChange);
        };
        command.revert(state)?;

        self.emit(GameEvent::MoveUndone);
        Ok(UndoOutcome::Undone)
    }

    /// Resolve the two face-up cards: reveal delay, then match or hide.
    async fn resolve_pending_pair(&mut self) -> Result<FlipOutcome> {
        tokio::time::sleep(self.reveal_delay).await;

        let mut events: Vec<GameEvent> = Vec::with_capacity(2);
        let outcome = {
            let Some(state) = self.state.as_mut() else {
                return Ok(FlipOutcome::NoChange);
            };
            let &[first_id, second_id] = state.flipped() else {
                state.set_processing(false);
                return Ok(FlipOutcome::NoChange);
            };

            let matched = state.card(first_id)?.pair() == state.card(second_id)?.pair();
            let mut command = if matched {
                Command::new(CommandKind::Match {
                    first: first_id,
                    second: second_id,
                })
            } else {
                Command::new(CommandKind::Hide {
                    first: first_id,
                    second: second_id,
                })
            };
            command.apply(state)?;
            self.history.push(command);

            state.clear_flipped();
            state.set_processing(false);

            if matched {
                let first = *state.card(first_id)?;
                let second = *state.card(second_id)?;
                events.push(GameEvent::MatchFound { first, second });
                if state.try_latch_completed() {
                    log::debug!("game completed in {} moves", state.moves());
                    events.push(GameEvent::GameCompleted {
                        total_moves: state.moves(),
                    });
                    FlipOutcome::Completed
                } else {
                    FlipOutcome::Matched
                }
            } else {
                log::debug!("mismatch: cards {first_id} and {second_id} hidden again");
                events.push(GameEvent::MismatchFound);
                FlipOutcome::Mismatched
            }
        };

        for event in events {
            self.emit(event);
        }
        Ok(outcome)
    }

    fn emit(&mut self, event: GameEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.unbounded_send(event).is_ok());
    }
}
