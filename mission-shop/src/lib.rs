//! Mission Shop Engine
//!
//! Platform-agnostic core of the budgeting mission: a player picks a
//! difficulty and budget, shops from a catalog without overspending, then
//! gets a pass/fail result, a score and an optional leaderboard entry.
//! This crate has no rendering; front ends drive it through
//! [`MissionController`].

pub mod cart;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod controller;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod session;

use std::sync::Arc;

// Re-export commonly used types
pub use cart::{Cart, CartLine};
pub use catalog::{
    BuiltinCatalog, Catalog, CatalogCache, CatalogEntry, CatalogError, CatalogSource, CsvCatalog,
};
pub use config::{MissionRules, RulesError};
pub use controller::{Action, MissionController, Outcome};
pub use engine::{
    ResultLine, ResultSummary, add_to_cart, cart_total, check_timeout, compute_score,
    difficulty_bonus, efficiency_percent, is_success, remaining_budget, remove_from_cart,
    summarize, untimed_score,
};
pub use error::MissionError;
pub use ranking::{
    JsonFileRanking, Leaderboard, MemoryRanking, RankingEntry, RankingError, RankingStorage,
    rank_entries,
};
pub use session::{Difficulty, Screen, Session};

/// Owns the shared pieces of a mission deployment: the cached catalog, the
/// leaderboard and the rules. Hands out one [`MissionController`] per player.
pub struct MissionEngine<C, S>
where
    C: CatalogSource,
    S: RankingStorage,
{
    catalog: CatalogCache<C>,
    leaderboard: Arc<Leaderboard<S>>,
    rules: MissionRules,
}

impl<C, S> MissionEngine<C, S>
where
    C: CatalogSource,
    S: RankingStorage,
{
    /// Create a new engine with the provided catalog source and ranking storage
    ///
    /// # Errors
    ///
    /// Returns an error if the rules describe an unplayable combination.
    pub fn new(source: C, storage: S, rules: MissionRules) -> Result<Self, RulesError> {
        rules.validate()?;
        Ok(Self {
            catalog: CatalogCache::new(source),
            leaderboard: Arc::new(Leaderboard::new(storage)),
            rules,
        })
    }

    #[must_use]
    pub const fn rules(&self) -> &MissionRules {
        &self.rules
    }

    /// The cached catalog, loaded on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn catalog(&mut self) -> Result<&Catalog, MissionError> {
        Ok(self.catalog.get()?)
    }

    /// Drop the cached catalog and load it again.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn reload_catalog(&mut self) -> Result<&Catalog, MissionError> {
        self.catalog.invalidate();
        self.catalog()
    }

    /// Start a controller for a new player on the start screen
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub fn create_controller(&mut self) -> Result<MissionController<S>, MissionError> {
        let catalog = self.catalog.get()?.clone();
        let leaderboard = self
            .rules
            .ranking_enabled
            .then(|| Arc::clone(&self.leaderboard));
        Ok(MissionController::new(
            self.rules.clone(),
            catalog,
            leaderboard,
        ))
    }

    /// Current leaderboard, best first.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::RankingDisabled`] when the rules turn ranking
    /// off, or an error if the ranking store cannot be read.
    pub fn ranking(&self) -> Result<Vec<RankingEntry>, MissionError> {
        if !self.rules.ranking_enabled {
            return Err(MissionError::RankingDisabled);
        }
        Ok(self.leaderboard.entries()?)
    }
}
