//! Error taxonomy shared by every mission operation.
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::ranking::RankingError;
use crate::session::{Difficulty, Screen};

/// Errors surfaced by mission operations.
///
/// Every variant is recoverable: the session stays usable after any of them.
/// [`MissionError::BudgetExceeded`] in particular is an ordinary control
/// signal that the front end shows as a warning.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("catalog could not be loaded: {0}")]
    CatalogLoad(#[from] CatalogError),
    #[error("invalid catalog entry {name:?}: {reason}")]
    InvalidCatalogEntry { name: String, reason: &'static str },
    #[error("unknown item {0:?}")]
    UnknownItem(String),
    #[error("adding {item:?} ({price}) would exceed the budget (remaining {remaining})")]
    BudgetExceeded {
        item: String,
        price: u32,
        remaining: i64,
    },
    #[error("budget {budget} is not available on {difficulty} difficulty")]
    InvalidBudgetSelection { difficulty: Difficulty, budget: u32 },
    #[error("ranking could not be saved: {0}")]
    Persistence(#[from] RankingError),
    #[error("action requires the {expected} screen (current: {actual})")]
    WrongScreen { expected: Screen, actual: Screen },
    #[error("ranking is disabled for this mission")]
    RankingDisabled,
}

impl MissionError {
    /// Whether this error is the routine budget admission rejection.
    #[must_use]
    pub const fn is_budget_exceeded(&self) -> bool {
        matches!(self, Self::BudgetExceeded { .. })
    }
}
