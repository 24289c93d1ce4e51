use serde::{Deserialize, Serialize};

pub use card::*;
pub use command::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use state::*;
pub use types::*;

mod card;
mod command;
mod engine;
mod error;
mod generator;
mod state;
mod types;

/// Validated board configuration for one session.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    grid_size: GridSize,
}

impl GameConfig {
    pub const fn new_unchecked(grid_size: GridSize) -> Self {
        Self { grid_size }
    }

    /// A playable board needs at least one pair and an even number of cells,
    /// which on a square grid means an even side.
    pub fn new(grid_size: GridSize) -> Result<Self> {
        if grid_size == 0 || grid_size % 2 != 0 {
            return Err(GameError::InvalidGridSize);
        }
        Ok(Self::new_unchecked(grid_size))
    }

    pub const fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub const fn total_cards(&self) -> CardCount {
        square(self.grid_size)
    }

    pub const fn total_pairs(&self) -> CardCount {
        self.total_cards() / 2
    }
}
