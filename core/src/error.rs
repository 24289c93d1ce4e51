use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("grid side must be positive and even")]
    InvalidGridSize,
    #[error("card index out of range")]
    InvalidCard,
    #[error("dealt board does not match the requested size")]
    InvalidBoardShape,
    #[error("dealt cards do not form balanced pairs")]
    UnbalancedDeal,
    #[error("card generation failed: {0}")]
    Generation(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
