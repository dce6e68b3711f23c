use thiserror::Error;

use crate::round::RoundPhase;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GameError {
    #[error("Invalid bet amount: {amount} (allowed {minimum}..={maximum})")]
    InvalidAmount {
        amount: u32,
        minimum: u32,
        maximum: u32,
    },
    #[error("Insufficient funds: {required} required, {available} available")]
    InsufficientFunds { required: u32, available: u32 },
    #[error("Cannot {action} while round is {phase}")]
    WrongPhase {
        action: &'static str,
        phase: RoundPhase,
    },
    #[error("Invalid action: {0}")]
    InvalidState(String),
    #[error("Deck is empty")]
    EmptyDeck,
    #[error("A stake of {stake} could pay out more than the bankroll can hold")]
    PayoutOverflow { stake: u32 },
}

impl GameError {
    /// Groups the variants into the four families callers report on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::InvalidAmount { .. } | GameError::PayoutOverflow { .. } => {
                ErrorKind::InvalidAmount
            }
            GameError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            GameError::WrongPhase { .. } | GameError::InvalidState(_) => ErrorKind::InvalidState,
            GameError::EmptyDeck => ErrorKind::EmptyDeck,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAmount,
    InsufficientFunds,
    InvalidState,
    EmptyDeck,
}
