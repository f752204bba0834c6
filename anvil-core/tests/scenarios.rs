//! End-to-end planning scenarios with the standard move palette.

use anvil_core::endings::enumerate_endings;
use anvil_core::planner::solve_mode;
use anvil_core::{
    is_range_safe, plan, validate, Constraint, Move, Rule, RuleClass, RuleSet, Session, Slot,
    SolveMode,
};

fn rule_at(slot: Slot, class: RuleClass) -> (Slot, Rule) {
    (slot, Rule::new(class, Constraint::AtSlot(slot)))
}

#[test]
fn test_punch_last_from_zero() {
    let rules = RuleSet::from_rules([rule_at(Slot::Last, RuleClass::Punch)]);
    let hints = plan(0, 2, &rules, false).expect("plan exists");
    assert_eq!(hints.plan(), vec![Move::Punch]);

    let history = hints.plan();
    assert!(validate(&history, &rules).valid);
}

#[test]
fn test_zero_to_one_without_rules() {
    let hints = plan(0, 1, &RuleSet::new(), true).expect("plan exists");
    let plan = hints.plan();
    assert_eq!(plan.len(), 2);
    let mut moves = plan.clone();
    moves.sort_by_key(|m| m.delta());
    assert_eq!(moves, vec![Move::Draw, Move::Shrink]);
    // Shrink must come first to stay above zero.
    assert_eq!(plan, vec![Move::Shrink, Move::Draw]);
    assert!(is_range_safe(0, &hints.deltas()));
}

#[test]
fn test_shrink_last_near_top_has_no_solution() {
    let rules = RuleSet::from_rules([rule_at(Slot::Last, RuleClass::Shrink)]);
    assert!(plan(148, 150, &rules, false).is_none());
}

#[test]
fn test_on_target_with_unmet_rule_forces_moves() {
    let rules = RuleSet::from_rules([rule_at(Slot::Last, RuleClass::Punch)]);
    let history = [Move::Draw, Move::Bend];
    let report = validate(&history, &rules);
    assert!(!report.valid);
    assert_eq!(solve_mode(50, 50, report.valid), SolveMode::MandatoryFirst);

    let hints = plan(50, 50, &rules, report.valid).expect("plan exists");
    assert!(!hints.is_empty());
    assert_eq!(50 + hints.deltas().iter().sum::<i32>(), 50);
    assert!(is_range_safe(50, &hints.deltas()));
    assert_eq!(hints.plan().last(), Some(&Move::Punch));
}

#[test]
fn test_on_target_every_single_rule_has_a_cycle() {
    const CLASSES: [RuleClass; 6] = [
        RuleClass::Hit,
        RuleClass::Draw,
        RuleClass::Punch,
        RuleClass::Bend,
        RuleClass::Upset,
        RuleClass::Shrink,
    ];
    const CONSTRAINTS: [Constraint; 5] = [
        Constraint::AtSlot(Slot::Last),
        Constraint::AtSlot(Slot::SecondLast),
        Constraint::AtSlot(Slot::ThirdLast),
        Constraint::NotLast,
        Constraint::Any,
    ];
    for slot in Slot::ALL {
        for class in CLASSES {
            for constraint in CONSTRAINTS {
                let rule = Rule::new(class, constraint);
                let rules = RuleSet::from_rules([(slot, rule)]);
                let report = validate(&[], &rules);
                assert!(!report.valid);

                let hints = plan(50, 50, &rules, report.valid)
                    .unwrap_or_else(|| panic!("no cycle for {} in slot {:?}", rule.label(), slot));
                let deltas = hints.deltas();
                assert!(!deltas.is_empty());
                assert_eq!(deltas.iter().sum::<i32>(), 0, "{}", rule.label());
                assert!(is_range_safe(50, &deltas));
                assert!(
                    validate(&hints.plan(), &rules).valid,
                    "{} not satisfied by {:?}",
                    rule.label(),
                    hints.plan()
                );
            }
        }
    }
}

#[test]
fn test_two_rules_on_last_slot_unsatisfiable() {
    let rules = RuleSet::from_rules([
        rule_at(Slot::Last, RuleClass::Punch),
        (Slot::SecondLast, Rule::new(RuleClass::Hit, Constraint::AtSlot(Slot::Last))),
    ]);
    assert!(enumerate_endings(&rules).is_empty());
    for (start, target) in [(0, 0), (0, 2), (75, 80), (150, 3)] {
        assert!(plan(start, target, &rules, false).is_none());
        assert!(plan(start, target, &rules, true).is_none());
    }
}

#[test]
fn test_session_walkthrough() {
    let rules = RuleSet::from_rules([
        rule_at(Slot::Last, RuleClass::Hit),
        rule_at(Slot::SecondLast, RuleClass::Draw),
    ]);
    let mut session = Session::with(100, 76, rules);
    let mut steps = 0;
    while !session.is_done() {
        let next = session
            .hints()
            .and_then(|h| h.next())
            .expect("session keeps a plan while walking it");
        assert!(session.perform(next));
        steps += 1;
        assert!(steps < 20, "plan did not converge");
    }
    assert_eq!(steps, 2);
    assert_eq!(session.start(), 76);
    assert!(session.validation().valid);
    assert_eq!(session.recent(), &[Move::Draw, Move::HardHit]);
}
