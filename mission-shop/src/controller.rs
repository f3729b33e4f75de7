//! Screen controller driving the start -> shopping -> result cycle.
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::MissionRules;
use crate::engine::{self, ResultSummary};
use crate::error::MissionError;
use crate::ranking::{JsonFileRanking, Leaderboard, RankingEntry, RankingStorage};
use crate::session::{Difficulty, Screen, Session};

/// A user action coming from the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartMission {
        name: String,
        difficulty: Difficulty,
        budget: u32,
    },
    AddItem(String),
    RemoveItem(String),
    RegisterItem {
        name: String,
        price: u32,
    },
    ConfirmPurchase,
    WriteReflection(String),
    SaveRanking,
    Restart,
}

impl Action {
    /// Screen on which the action is legal.
    #[must_use]
    pub const fn screen(&self) -> Screen {
        match self {
            Self::StartMission { .. } => Screen::Start,
            Self::AddItem(_)
            | Self::RemoveItem(_)
            | Self::RegisterItem { .. }
            | Self::ConfirmPurchase => Screen::Shopping,
            Self::WriteReflection(_) | Self::SaveRanking | Self::Restart => Screen::Result,
        }
    }
}

/// What an action did, for the front end to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    MissionStarted,
    ItemAdded { item: String, quantity: u32 },
    ItemRemoved { item: String, quantity: u32 },
    ItemRegistered { name: String },
    /// The deadline passed before the action could run.
    TimedOut(ResultSummary),
    Finished(ResultSummary),
    ReflectionSaved,
    Ranked(Vec<RankingEntry>),
    Restarted,
}

/// Owns one player's session and applies actions to it.
#[derive(Debug)]
pub struct MissionController<S: RankingStorage = JsonFileRanking> {
    rules: MissionRules,
    catalog: Catalog,
    session: Session,
    finished_at: Option<DateTime<Utc>>,
    leaderboard: Option<Arc<Leaderboard<S>>>,
}

impl<S: RankingStorage> MissionController<S> {
    /// Create a controller on the start screen.
    ///
    /// The catalog is a session-local copy; runtime registrations do not
    /// leak into other sessions.
    #[must_use]
    pub fn new(
        rules: MissionRules,
        catalog: Catalog,
        leaderboard: Option<Arc<Leaderboard<S>>>,
    ) -> Self {
        Self {
            rules,
            catalog,
            session: Session::default(),
            finished_at: None,
            leaderboard,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn rules(&self) -> &MissionRules {
        &self.rules
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.session.screen
    }

    #[must_use]
    pub fn cart_total(&self) -> i64 {
        engine::cart_total(&self.session.cart, &self.catalog)
    }

    #[must_use]
    pub fn remaining_budget(&self) -> i64 {
        engine::remaining_budget(&self.session, &self.catalog)
    }

    /// Seconds left on the clock, or `None` when the timer is off or the
    /// mission is not running.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        (self.rules.timer_enabled && self.session.screen == Screen::Shopping)
            .then(|| self.session.remaining_seconds(now))
    }

    /// Run the cooperative timeout check. Returns `true` if the mission
    /// just moved to the result screen.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if !self.rules.timer_enabled || !engine::check_timeout(&mut self.session, now) {
            return false;
        }
        self.finish(now);
        true
    }

    /// Summary of the mission, frozen at the moment it finished.
    #[must_use]
    pub fn result_summary(&self, now: DateTime<Utc>) -> ResultSummary {
        engine::summarize(
            &self.session,
            &self.catalog,
            self.finished_at.unwrap_or(now),
            self.rules.scoring_enabled,
            self.rules.timer_enabled,
        )
    }

    /// Current leaderboard.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::RankingDisabled`] without a leaderboard and
    /// [`MissionError::Persistence`] if it cannot be read.
    pub fn ranking(&self) -> Result<Vec<RankingEntry>, MissionError> {
        let board = self.leaderboard()?;
        Ok(board.entries()?)
    }

    /// Apply one user action.
    ///
    /// The timeout check runs first. An action meant for the shopping screen
    /// that arrives after the deadline yields [`Outcome::TimedOut`].
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::WrongScreen`] for actions that do not belong
    /// to the current screen, plus whatever the action itself raises. The
    /// session is unchanged on error.
    pub fn handle(&mut self, action: Action, now: DateTime<Utc>) -> Result<Outcome, MissionError> {
        let timed_out = self.poll(now);
        if let Err(err) = self.session.require_screen(action.screen()) {
            if timed_out {
                return Ok(Outcome::TimedOut(self.result_summary(now)));
            }
            return Err(err);
        }

        log::debug!("{} screen: {action:?}", self.session.screen);
        match action {
            Action::StartMission {
                name,
                difficulty,
                budget,
            } => {
                self.session = Session::start_mission(&name, difficulty, budget, &self.rules, now)?;
                self.finished_at = None;
                Ok(Outcome::MissionStarted)
            }
            Action::AddItem(item) => {
                let quantity = engine::add_to_cart(&mut self.session, &self.catalog, &item)?;
                Ok(Outcome::ItemAdded { item, quantity })
            }
            Action::RemoveItem(item) => {
                let quantity = engine::remove_from_cart(&mut self.session, &item);
                Ok(Outcome::ItemRemoved { item, quantity })
            }
            Action::RegisterItem { name, price } => {
                self.catalog.register(&name, price)?;
                Ok(Outcome::ItemRegistered {
                    name: name.trim().to_string(),
                })
            }
            Action::ConfirmPurchase => {
                self.session.screen = Screen::Result;
                self.finish(now);
                Ok(Outcome::Finished(self.result_summary(now)))
            }
            Action::WriteReflection(text) => {
                self.session.reflection = text;
                Ok(Outcome::ReflectionSaved)
            }
            Action::SaveRanking => {
                let board = self.leaderboard()?;
                let entries = board.record_score(
                    &self.session.player_name,
                    self.session.score,
                    self.session.difficulty,
                )?;
                Ok(Outcome::Ranked(entries))
            }
            Action::Restart => {
                self.session.reset_to_start();
                self.finished_at = None;
                Ok(Outcome::Restarted)
            }
        }
    }

    fn finish(&mut self, now: DateTime<Utc>) {
        self.finished_at = Some(now);
        if self.rules.scoring_enabled {
            self.session.score = if self.rules.timer_enabled {
                engine::compute_score(&self.session, &self.catalog, now)
            } else {
                engine::untimed_score(&self.session, &self.catalog)
            };
        }
        log::info!(
            "mission finished for {}: total {}, score {}",
            self.session.player_name,
            self.cart_total(),
            self.session.score
        );
    }

    fn leaderboard(&self) -> Result<&Leaderboard<S>, MissionError> {
        if !self.rules.ranking_enabled {
            return Err(MissionError::RankingDisabled);
        }
        self.leaderboard
            .as_deref()
            .ok_or(MissionError::RankingDisabled)
    }
}
