//! Mission session state
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cart::Cart;
use crate::config::MissionRules;
use crate::constants::{
    ANONYMOUS_PLAYER, EASY_BONUS, EASY_BUDGETS, EASY_TIME_LIMIT_SECS, HARD_BONUS, HARD_BUDGETS,
    HARD_TIME_LIMIT_SECS, NORMAL_BONUS, NORMAL_BUDGETS, NORMAL_TIME_LIMIT_SECS,
};
use crate::error::MissionError;

/// Mission difficulty tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    /// Budgets a player may pick on this tier.
    #[must_use]
    pub const fn allowed_budgets(self) -> &'static [u32] {
        match self {
            Self::Easy => &EASY_BUDGETS,
            Self::Normal => &NORMAL_BUDGETS,
            Self::Hard => &HARD_BUDGETS,
        }
    }

    #[must_use]
    pub const fn time_limit_secs(self) -> u32 {
        match self {
            Self::Easy => EASY_TIME_LIMIT_SECS,
            Self::Normal => NORMAL_TIME_LIMIT_SECS,
            Self::Hard => HARD_TIME_LIMIT_SECS,
        }
    }

    /// Score multiplier applied to the final score.
    #[must_use]
    pub const fn bonus(self) -> i64 {
        match self {
            Self::Easy => EASY_BONUS,
            Self::Normal => NORMAL_BONUS,
            Self::Hard => HARD_BONUS,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Normal => write!(f, "Normal"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty {other:?}")),
        }
    }
}

/// Which screen of the three-step flow is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Start,
    Shopping,
    Result,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Shopping => write!(f, "shopping"),
            Self::Result => write!(f, "result"),
        }
    }
}

/// Mutable record of the current mission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub player_name: String,
    pub difficulty: Difficulty,
    pub budget: u32,
    pub time_limit_secs: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub cart: Cart,
    pub reflection: String,
    pub score: i64,
    pub screen: Screen,
}

impl Session {
    /// Begin a mission on the shopping screen.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::InvalidBudgetSelection`] when budget tiers are
    /// enforced and `budget` is not offered on `difficulty`.
    pub fn start_mission(
        name: &str,
        difficulty: Difficulty,
        budget: u32,
        rules: &MissionRules,
        now: DateTime<Utc>,
    ) -> Result<Self, MissionError> {
        if rules.enforce_budget_tiers && !difficulty.allowed_budgets().contains(&budget) {
            return Err(MissionError::InvalidBudgetSelection { difficulty, budget });
        }

        let name = name.trim();
        let player_name = if name.is_empty() {
            ANONYMOUS_PLAYER.to_string()
        } else {
            name.to_string()
        };

        log::info!("mission started: {player_name} ({difficulty}, budget {budget})");
        Ok(Self {
            player_name,
            difficulty,
            budget,
            time_limit_secs: difficulty.time_limit_secs(),
            started_at: Some(now),
            cart: Cart::new(),
            reflection: String::new(),
            score: 0,
            screen: Screen::Shopping,
        })
    }

    /// Clear every mutable field and return to the start screen.
    pub fn reset_to_start(&mut self) {
        *self = Self::default();
    }

    /// Whole seconds since the mission started; 0 before the start.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.started_at
            .map_or(0, |start| (now - start).num_seconds().max(0))
    }

    /// Seconds left on the clock. Negative once the deadline has passed.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        i64::from(self.time_limit_secs) - self.elapsed_seconds(now)
    }

    /// Fail unless the session is on `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::WrongScreen`] on mismatch.
    pub fn require_screen(&self, expected: Screen) -> Result<(), MissionError> {
        if self.screen == expected {
            Ok(())
        } else {
            Err(MissionError::WrongScreen {
                expected,
                actual: self.screen,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn start_mission_initializes_shopping_state() {
        let session =
            Session::start_mission("민지", Difficulty::Normal, 20_000, &MissionRules::default(), t0())
                .unwrap();
        assert_eq!(session.player_name, "민지");
        assert_eq!(session.screen, Screen::Shopping);
        assert_eq!(session.time_limit_secs, 120);
        assert_eq!(session.started_at, Some(t0()));
        assert!(session.cart.is_empty());
        assert_eq!(session.score, 0);
    }

    #[test]
    fn blank_name_defaults_to_anonymous() {
        let session =
            Session::start_mission("   ", Difficulty::Easy, 30_000, &MissionRules::default(), t0())
                .unwrap();
        assert_eq!(session.player_name, ANONYMOUS_PLAYER);
    }

    #[test]
    fn budget_outside_tier_is_rejected() {
        let err = Session::start_mission("a", Difficulty::Hard, 50_000, &MissionRules::default(), t0())
            .unwrap_err();
        assert!(matches!(
            err,
            MissionError::InvalidBudgetSelection {
                difficulty: Difficulty::Hard,
                budget: 50_000
            }
        ));
    }

    #[test]
    fn free_budget_rules_accept_any_amount() {
        let rules = MissionRules {
            enforce_budget_tiers: false,
            ..MissionRules::default()
        };
        let session = Session::start_mission("a", Difficulty::Hard, 12_345, &rules, t0()).unwrap();
        assert_eq!(session.budget, 12_345);
    }

    #[test]
    fn reset_clears_everything() {
        let mut session =
            Session::start_mission("a", Difficulty::Easy, 50_000, &MissionRules::default(), t0())
                .unwrap();
        session.cart.add_one("연필");
        session.reflection = "잘 샀다".to_string();
        session.score = 99;
        session.screen = Screen::Result;

        session.reset_to_start();
        assert_eq!(session, Session::default());
        assert_eq!(session.screen, Screen::Start);
        assert_eq!(session.budget, 0);
    }

    #[test]
    fn clock_math_goes_negative_past_deadline() {
        let session =
            Session::start_mission("a", Difficulty::Hard, 10_000, &MissionRules::default(), t0())
                .unwrap();
        assert_eq!(session.elapsed_seconds(t0() + Duration::seconds(15)), 15);
        assert_eq!(session.remaining_seconds(t0() + Duration::seconds(15)), 45);
        assert_eq!(session.remaining_seconds(t0() + Duration::seconds(90)), -30);
        assert_eq!(session.elapsed_seconds(t0() - Duration::seconds(5)), 0);
        assert_eq!(Session::default().elapsed_seconds(t0()), 0);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" normal ".parse::<Difficulty>().unwrap(), Difficulty::Normal);
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn require_screen_reports_mismatch() {
        let session = Session::default();
        assert!(session.require_screen(Screen::Start).is_ok());
        assert!(matches!(
            session.require_screen(Screen::Result),
            Err(MissionError::WrongScreen {
                expected: Screen::Result,
                actual: Screen::Start
            })
        ));
    }
}
