use chrono::{DateTime, Duration, TimeZone, Utc};
use mission_shop::{
    Action, BuiltinCatalog, Catalog, CatalogEntry, CatalogSource, Difficulty, MemoryRanking,
    MissionController, MissionError, MissionRules, Outcome, Session, add_to_cart, cart_total,
    compute_score, efficiency_percent, is_success, remaining_budget, remove_from_cart,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 14, 0, 0).unwrap()
}

fn free_rules() -> MissionRules {
    MissionRules {
        enforce_budget_tiers: false,
        ..MissionRules::default()
    }
}

fn session(budget: u32, difficulty: Difficulty) -> Session {
    Session::start_mission("player", difficulty, budget, &free_rules(), t0()).unwrap()
}

fn priced(prices: &[(&str, u32)]) -> Catalog {
    Catalog::from_entries(
        prices
            .iter()
            .map(|(name, price)| CatalogEntry::new(*name, *price))
            .collect(),
    )
    .unwrap()
}

#[test]
fn scenario_a_purchase_within_budget_succeeds() {
    let catalog = BuiltinCatalog.load_catalog().unwrap();
    let mut session = session(20_000, Difficulty::Normal);
    add_to_cart(&mut session, &catalog, "연필").unwrap();
    add_to_cart(&mut session, &catalog, "공책").unwrap();

    assert_eq!(cart_total(&session.cart, &catalog), 4_000);
    assert_eq!(remaining_budget(&session, &catalog), 16_000);
    assert!(is_success(&session, &catalog));
}

#[test]
fn scenario_b_item_over_budget_is_rejected() {
    let catalog = priced(&[("monitor", 15_000)]);
    let mut session = session(10_000, Difficulty::Easy);
    let before = session.cart.clone();

    let err = add_to_cart(&mut session, &catalog, "monitor").unwrap_err();
    assert!(matches!(err, MissionError::BudgetExceeded { .. }));
    assert_eq!(session.cart, before);
    assert_eq!(cart_total(&session.cart, &catalog), 0);
}

#[test]
fn scenario_c_hard_mission_score() {
    let catalog = priced(&[("kit", 10_000)]);
    let mut session = session(10_000, Difficulty::Hard);
    add_to_cart(&mut session, &catalog, "kit").unwrap();

    let now = t0() + Duration::seconds(30);
    assert_eq!(session.remaining_seconds(now), 30);
    assert_eq!(compute_score(&session, &catalog, now), 3_180);
}

#[test]
fn scenario_d_zero_budget_rejects_everything() {
    let catalog = BuiltinCatalog.load_catalog().unwrap();
    let mut session = session(0, Difficulty::Easy);
    for entry in &catalog {
        assert!(
            add_to_cart(&mut session, &catalog, &entry.name)
                .unwrap_err()
                .is_budget_exceeded()
        );
    }
    assert!(session.cart.is_empty());
    assert_eq!(efficiency_percent(0, 0), 0);

    let now = t0() + Duration::seconds(180);
    assert_eq!(compute_score(&session, &catalog, now), 0);
    assert!(is_success(&session, &catalog));
}

#[test]
fn successful_adds_never_leave_the_budget_negative() {
    let catalog = BuiltinCatalog.load_catalog().unwrap();
    let names: Vec<String> = catalog.iter().map(|e| e.name.clone()).collect();

    for budget in [0, 999, 1_000, 7_500, 10_000, 26_500, 50_000] {
        let mut session = session(budget, Difficulty::Easy);
        // Cycle through the catalog repeatedly so repeated items are re-validated.
        for round in 0..40 {
            let item = &names[round % names.len()];
            if add_to_cart(&mut session, &catalog, item).is_ok() {
                assert!(remaining_budget(&session, &catalog) >= 0);
            }
        }
        assert!(remaining_budget(&session, &catalog) >= 0);
    }
}

#[test]
fn remove_semantics_follow_quantity() {
    let catalog = BuiltinCatalog.load_catalog().unwrap();
    let mut session = session(50_000, Difficulty::Easy);
    add_to_cart(&mut session, &catalog, "지우개").unwrap();
    add_to_cart(&mut session, &catalog, "지우개").unwrap();
    add_to_cart(&mut session, &catalog, "필통").unwrap();

    assert_eq!(remove_from_cart(&mut session, "지우개"), 1);
    assert!(session.cart.find_line("지우개").is_some());
    assert_eq!(remove_from_cart(&mut session, "필통"), 0);
    assert!(session.cart.find_line("필통").is_none());

    let before = session.clone();
    assert_eq!(remove_from_cart(&mut session, "가방"), 0);
    assert_eq!(session, before);
}

#[test]
fn score_is_a_pure_function_of_its_inputs() {
    let catalog = BuiltinCatalog.load_catalog().unwrap();
    let mut session = session(30_000, Difficulty::Normal);
    add_to_cart(&mut session, &catalog, "필통").unwrap();
    add_to_cart(&mut session, &catalog, "공책").unwrap();
    let now = t0() + Duration::seconds(47);

    let first = compute_score(&session, &catalog, now);
    let second = compute_score(&session, &catalog, now);
    assert_eq!(first, second);
    // 26% * 10 + 73s * 2, doubled on Normal
    assert_eq!(first, 812);
}

#[test]
fn success_predicate_matches_remaining_sign() {
    let catalog = priced(&[("a", 1_000), ("b", 2_500)]);
    for budget in [0_u32, 1_000, 2_500, 3_499, 3_500, 3_501, 10_000] {
        let mut session = session(budget, Difficulty::Easy);
        // Fill the cart directly so over-budget carts are covered as well.
        session.cart.add_one("a");
        session.cart.add_one("b");
        let remaining = i64::from(budget) - 3_500;
        assert_eq!(remaining_budget(&session, &catalog), remaining);
        assert_eq!(is_success(&session, &catalog), remaining >= 0);
    }
}

#[test]
fn exact_budget_match_is_a_success() {
    let catalog = priced(&[("a", 10_000)]);
    let mut session = session(10_000, Difficulty::Hard);
    add_to_cart(&mut session, &catalog, "a").unwrap();
    assert_eq!(remaining_budget(&session, &catalog), 0);
    assert!(is_success(&session, &catalog));
}

#[test]
fn controller_plays_a_tiered_mission() {
    let mut ctl: MissionController<MemoryRanking> = MissionController::new(
        MissionRules::default(),
        BuiltinCatalog.load_catalog().unwrap(),
        None,
    );
    assert!(matches!(
        ctl.handle(
            Action::StartMission {
                name: "player".into(),
                difficulty: Difficulty::Hard,
                budget: 30_000,
            },
            t0(),
        ),
        Err(MissionError::InvalidBudgetSelection { .. })
    ));
    ctl.handle(
        Action::StartMission {
            name: "player".into(),
            difficulty: Difficulty::Hard,
            budget: 10_000,
        },
        t0(),
    )
    .unwrap();

    let now = t0() + Duration::seconds(5);
    ctl.handle(Action::AddItem("필통".into()), now).unwrap();
    let err = ctl
        .handle(Action::AddItem("가방".into()), now)
        .unwrap_err();
    assert!(err.is_budget_exceeded());
    assert_eq!(ctl.cart_total(), 5_000);

    let Outcome::Finished(summary) = ctl.handle(Action::ConfirmPurchase, now).unwrap() else {
        panic!("expected Finished");
    };
    assert!(summary.success);
    assert_eq!(summary.remaining, 5_000);
}
