//! Mission rule toggles.
//!
//! The engine runs every variant of the mission from one code path; the
//! differences between them are expressed as these flags.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a rule combination cannot be played.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("ranking requires scoring to be enabled")]
    RankingWithoutScoring,
}

/// Feature flags for a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionRules {
    #[serde(default = "MissionRules::default_enabled")]
    pub scoring_enabled: bool,
    #[serde(default = "MissionRules::default_enabled")]
    pub ranking_enabled: bool,
    #[serde(default = "MissionRules::default_enabled")]
    pub enforce_budget_tiers: bool,
    #[serde(default = "MissionRules::default_enabled")]
    pub timer_enabled: bool,
}

impl MissionRules {
    const fn default_enabled() -> bool {
        true
    }

    /// The plain three-screen flow: no timer, scoring, ranking or tiers.
    #[must_use]
    pub const fn classic() -> Self {
        Self {
            scoring_enabled: false,
            ranking_enabled: false,
            enforce_budget_tiers: false,
            timer_enabled: false,
        }
    }

    /// Load rules from a JSON string. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check that the flags describe a playable mission.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::RankingWithoutScoring`] when ranking is enabled
    /// without scoring.
    pub const fn validate(&self) -> Result<(), RulesError> {
        if self.ranking_enabled && !self.scoring_enabled {
            return Err(RulesError::RankingWithoutScoring);
        }
        Ok(())
    }
}

impl Default for MissionRules {
    fn default() -> Self {
        Self {
            scoring_enabled: Self::default_enabled(),
            ranking_enabled: Self::default_enabled(),
            enforce_budget_tiers: Self::default_enabled(),
            timer_enabled: Self::default_enabled(),
        }
    }
}
