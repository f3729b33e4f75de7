//! Mission rules: budget admission control, timeout and scoring.
//!
//! Everything here is a plain function over [`Session`] and [`Catalog`];
//! screen checks are the controller's job.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::cart::Cart;
use crate::constants::{EFFICIENCY_POINTS_PER_PERCENT, TIME_POINTS_PER_SECOND};
use crate::error::MissionError;
use crate::session::{Difficulty, Screen, Session};

/// Total cost of the cart.
#[must_use]
pub fn cart_total(cart: &Cart, catalog: &Catalog) -> i64 {
    cart.total(catalog)
}

/// Budget left after the current cart. Negative when over budget.
#[must_use]
pub fn remaining_budget(session: &Session, catalog: &Catalog) -> i64 {
    i64::from(session.budget) - cart_total(&session.cart, catalog)
}

/// Add one unit of `item` if the budget still covers it.
///
/// Returns the new quantity of the item.
///
/// # Errors
///
/// Returns [`MissionError::UnknownItem`] for unlisted items and
/// [`MissionError::BudgetExceeded`] when the projected total would exceed
/// the budget. The cart is untouched on error.
pub fn add_to_cart(
    session: &mut Session,
    catalog: &Catalog,
    item: &str,
) -> Result<u32, MissionError> {
    let entry = catalog.lookup(item)?;
    let current_total = cart_total(&session.cart, catalog);
    let projected_total = current_total + i64::from(entry.unit_price);
    let remaining = i64::from(session.budget) - current_total;

    if i64::from(session.budget) - projected_total < 0 {
        log::warn!(
            "rejected {item:?} at {}: remaining budget {remaining}",
            entry.unit_price
        );
        return Err(MissionError::BudgetExceeded {
            item: item.to_string(),
            price: entry.unit_price,
            remaining,
        });
    }

    let quantity = session.cart.add_one(&entry.name);
    log::debug!("added {item:?} (qty {quantity}, total {projected_total})");
    Ok(quantity)
}

/// Remove one unit of `item`. Absent items are ignored.
///
/// Returns the remaining quantity of the item.
pub fn remove_from_cart(session: &mut Session, item: &str) -> u32 {
    let quantity = session.cart.remove_one(item);
    log::debug!("removed {item:?} (qty {quantity})");
    quantity
}

/// Move a shopping session past its deadline to the result screen.
///
/// Returns `true` when the transition happened.
pub fn check_timeout(session: &mut Session, now: DateTime<Utc>) -> bool {
    if session.screen != Screen::Shopping || session.remaining_seconds(now) > 0 {
        return false;
    }
    log::info!(
        "mission for {} timed out after {}s",
        session.player_name,
        session.elapsed_seconds(now)
    );
    session.screen = Screen::Result;
    true
}

/// Multiplier for the difficulty tier.
#[must_use]
pub const fn difficulty_bonus(difficulty: Difficulty) -> i64 {
    difficulty.bonus()
}

/// Whole percent of the budget spent, rounded down. A zero budget yields 0.
#[must_use]
pub fn efficiency_percent(used: i64, budget: u32) -> i64 {
    if budget == 0 {
        return 0;
    }
    used.max(0) * 100 / i64::from(budget)
}

/// Seconds left for scoring purposes, clamped at zero.
#[must_use]
pub fn time_left(session: &Session, now: DateTime<Utc>) -> i64 {
    session.remaining_seconds(now).max(0)
}

/// Score for the session as of `now`.
///
/// The efficiency term only counts when the cart fits the budget; the time
/// term always counts; the sum is multiplied by the difficulty bonus.
#[must_use]
pub fn compute_score(session: &Session, catalog: &Catalog, now: DateTime<Utc>) -> i64 {
    score_with_time_left(session, catalog, time_left(session, now))
}

/// Score for a mission played without a clock. There is no time term.
#[must_use]
pub fn untimed_score(session: &Session, catalog: &Catalog) -> i64 {
    score_with_time_left(session, catalog, 0)
}

fn score_with_time_left(session: &Session, catalog: &Catalog, time_left: i64) -> i64 {
    let used = cart_total(&session.cart, catalog);
    let remaining = i64::from(session.budget) - used;

    let mut score = 0;
    if remaining >= 0 {
        score += efficiency_percent(used, session.budget) * EFFICIENCY_POINTS_PER_PERCENT;
    }
    score += time_left * TIME_POINTS_PER_SECOND;
    score * difficulty_bonus(session.difficulty)
}

/// Whether the mission stayed within budget.
#[must_use]
pub fn is_success(session: &Session, catalog: &Catalog) -> bool {
    remaining_budget(session, catalog) >= 0
}

/// A purchased line as shown on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultLine {
    pub item: String,
    pub unit_price: u32,
    pub quantity: u32,
    pub subtotal: i64,
}

/// Complete summary of a mission for display on the result screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub player_name: String,
    pub difficulty: Difficulty,
    pub budget: u32,
    pub lines: Vec<ResultLine>,
    pub total: i64,
    pub remaining: i64,
    pub success: bool,
    pub score: Option<i64>,
    pub time_left: i64,
    pub timed_out: bool,
    pub reflection: String,
}

/// Build the result summary from the session.
///
/// `score` is `None` when scoring is disabled for the mission.
#[must_use]
pub fn summarize(
    session: &Session,
    catalog: &Catalog,
    now: DateTime<Utc>,
    scoring_enabled: bool,
    timer_enabled: bool,
) -> ResultSummary {
    let lines = session
        .cart
        .lines()
        .filter_map(|line| {
            catalog.find(&line.item).map(|entry| ResultLine {
                item: line.item.clone(),
                unit_price: entry.unit_price,
                quantity: line.quantity,
                subtotal: i64::from(entry.unit_price) * i64::from(line.quantity),
            })
        })
        .collect();
    let total = cart_total(&session.cart, catalog);
    let remaining = i64::from(session.budget) - total;

    ResultSummary {
        player_name: session.player_name.clone(),
        difficulty: session.difficulty,
        budget: session.budget,
        lines,
        total,
        remaining,
        success: remaining >= 0,
        score: scoring_enabled.then(|| {
            if timer_enabled {
                compute_score(session, catalog, now)
            } else {
                untimed_score(session, catalog)
            }
        }),
        time_left: if timer_enabled {
            time_left(session, now)
        } else {
            0
        },
        timed_out: timer_enabled
            && session.started_at.is_some()
            && session.remaining_seconds(now) <= 0,
        reflection: session.reflection.clone(),
    }
}
