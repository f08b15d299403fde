//! Property tests for the sort ledger and phase routing.

use proptest::prelude::*;
use valueslens::domain::models::{AssessmentConfig, Category, Phase, Session, UndoOutcome};

#[derive(Debug, Clone)]
enum Op {
    Assign(Category),
    Undo,
    Custom,
}

fn category() -> impl Strategy<Value = Category> {
    prop_oneof![Just(Category::Very), Just(Category::Somewhat), Just(Category::Less)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => category().prop_map(Op::Assign),
        3 => Just(Op::Undo),
        1 => Just(Op::Custom),
    ]
}

fn session(n: usize) -> Session {
    Session::new("prop", (0..n).map(|i| format!("v{i}")).collect())
}

fn apply(session: &mut Session, op: &Op) {
    match op {
        Op::Assign(category) => {
            let _ = session.assign_current(*category);
        }
        Op::Undo => {
            session.undo();
        }
        Op::Custom => {
            let _ = session.add_custom_value("My Own Value");
        }
    }
}

proptest! {
    /// Property: the cursor always equals the number of filed catalog values
    ///
    /// The custom value sits in `very` without ever being presented.
    #[test]
    fn prop_cursor_counts_filed_values(
        n in 1usize..15,
        ops in prop::collection::vec(op(), 0..60)
    ) {
        let mut session = session(n);
        for op in &ops {
            apply(&mut session, op);
            let ledger = session.ledger();
            let custom = usize::from(ledger.custom().is_some());
            prop_assert_eq!(ledger.cursor(), ledger.filed_count() - custom);
            prop_assert!(ledger.cursor() <= n);
            prop_assert!(session.check_invariants().is_ok());
        }
    }

    /// Property: assigning then undoing restores the ledger exactly
    #[test]
    fn prop_assign_then_undo_round_trips(
        n in 1usize..15,
        prefix in prop::collection::vec(category(), 0..14),
        category in category()
    ) {
        let mut session = session(n);
        for c in prefix.iter().take(n - 1) {
            session.assign_current(*c).unwrap();
        }
        let before = session.ledger().clone();

        let value_id = session.assign_current(category).unwrap();
        let outcome = session.undo();

        prop_assert_eq!(outcome, UndoOutcome::Reverted { value_id, category });
        prop_assert_eq!(session.ledger(), &before);
    }

    /// Property: the custom value never moves the cursor
    #[test]
    fn prop_custom_value_keeps_cursor(
        n in 1usize..15,
        filed in 0usize..15
    ) {
        let mut session = session(n);
        for _ in 0..filed.min(n) {
            session.assign_current(Category::Less).unwrap();
        }
        let cursor = session.ledger().cursor();

        let custom = session.add_custom_value("My Own Value").unwrap();
        prop_assert_eq!(session.ledger().cursor(), cursor);
        prop_assert_eq!(session.ledger().category_of(&custom.id), Some(Category::Very));
    }

    /// Property: routing lands on sort exactly while cards remain
    #[test]
    fn prop_route_is_sort_while_cards_remain(
        n in 1usize..15,
        filed in 0usize..15
    ) {
        let rules = AssessmentConfig::default();
        let mut session = session(n);
        for _ in 0..filed.min(n) {
            session.assign_current(Category::Very).unwrap();
        }

        let route = session.resume_route(&rules);
        if filed < n {
            prop_assert_eq!(route, Phase::Sort);
            prop_assert!(session.is_in_progress());
        } else {
            prop_assert_eq!(route, Phase::Select);
        }
    }
}

#[test]
fn test_undo_at_start_is_nothing() {
    let mut session = session(3);
    assert_eq!(session.undo(), UndoOutcome::Nothing);
    assert_eq!(session.ledger().cursor(), 0);
}
