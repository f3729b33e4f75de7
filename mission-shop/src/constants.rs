//! Centralized tuning constants for the mission engine.
//!
//! Budgets, time limits and score weights live here so that balancing the
//! mission can only happen through reviewed code changes.

// File locations -----------------------------------------------------------
pub const DEFAULT_RANKING_PATH: &str = "ranking.json";
pub const DEFAULT_CATALOG_PATH: &str = "catalog.csv";

// Player --------------------------------------------------------------------
pub const ANONYMOUS_PLAYER: &str = "Anonymous";

// Budgets (won) -------------------------------------------------------------
pub const EASY_BUDGETS: [u32; 2] = [30_000, 50_000];
pub const NORMAL_BUDGETS: [u32; 2] = [20_000, 30_000];
pub const HARD_BUDGETS: [u32; 2] = [10_000, 20_000];
/// Choices offered when budgets are not tied to a difficulty tier.
pub const CLASSIC_BUDGETS: [u32; 3] = [10_000, 30_000, 50_000];

// Time limits (seconds) -----------------------------------------------------
pub const EASY_TIME_LIMIT_SECS: u32 = 180;
pub const NORMAL_TIME_LIMIT_SECS: u32 = 120;
pub const HARD_TIME_LIMIT_SECS: u32 = 60;

// Scoring -------------------------------------------------------------------
pub const EFFICIENCY_POINTS_PER_PERCENT: i64 = 10;
pub const TIME_POINTS_PER_SECOND: i64 = 2;
pub const EASY_BONUS: i64 = 1;
pub const NORMAL_BONUS: i64 = 2;
pub const HARD_BONUS: i64 = 3;

// Ranking -------------------------------------------------------------------
pub const RANKING_CAPACITY: usize = 10;

// Catalog CSV columns -------------------------------------------------------
pub(crate) const CSV_COLUMN_NAME: &str = "name";
pub(crate) const CSV_COLUMN_PRICE: &str = "price";
pub(crate) const CSV_COLUMN_IMAGE: &str = "image_url";
