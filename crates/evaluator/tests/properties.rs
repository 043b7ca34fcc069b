use proptest::prelude::*;

use common::{IndicatorSnapshot, PriceSnapshot};
use conditions::{ConditionInstance, ConditionKind, Operand, Threshold, Zone};
use evaluator::{evaluate, try_evaluate, Indeterminate};

fn value_snap(v: f64) -> IndicatorSnapshot {
    IndicatorSnapshot::new().with("ind", "value", v)
}

fn lines_snap(a: f64, b: f64) -> IndicatorSnapshot {
    IndicatorSnapshot::new().with("ind", "a", a).with("ind", "b", b)
}

fn on_value(kind: ConditionKind) -> ConditionInstance {
    ConditionInstance::new("ind", kind)
}

fn value() -> Operand {
    Operand::series("value")
}

/// Every single-series edge-triggered condition for a threshold/zone.
fn edge_conditions(t: f64, lo: f64, hi: f64) -> Vec<ConditionInstance> {
    let zone = Zone::new(lo, hi).unwrap();
    vec![
        on_value(ConditionKind::CrossesAbove { operand: value(), threshold: Threshold::Value(t) }),
        on_value(ConditionKind::CrossesBelow { operand: value(), threshold: Threshold::Value(t) }),
        on_value(ConditionKind::Equals { operand: value(), target: Threshold::Value(t) }),
        on_value(ConditionKind::EntersZone { operand: value(), zone }),
        on_value(ConditionKind::ExitsZone { operand: value(), zone }),
    ]
}

type Predicate = Box<dyn Fn(f64) -> bool>;

fn level_conditions(t: f64, lo: f64, hi: f64) -> Vec<(ConditionInstance, Predicate)> {
    let zone = Zone::new(lo, hi).unwrap();
    vec![
        (
            on_value(ConditionKind::GreaterThan { operand: value(), threshold: Threshold::Value(t) }),
            Box::new(move |c: f64| c > t) as Predicate,
        ),
        (
            on_value(ConditionKind::LessThan { operand: value(), threshold: Threshold::Value(t) }),
            Box::new(move |c: f64| c < t) as Predicate,
        ),
        (
            on_value(ConditionKind::WithinZone { operand: value(), zone }),
            Box::new(move |c: f64| c >= lo && c <= hi) as Predicate,
        ),
        (
            on_value(ConditionKind::OutsideZone { operand: value(), zone }),
            Box::new(move |c: f64| c < lo || c > hi) as Predicate,
        ),
    ]
}

fn ordered_pair() -> impl Strategy<Value = (f64, f64)> {
    (-1_000.0f64..1_000.0, 0.0f64..500.0).prop_map(|(lo, width)| (lo, lo + width))
}

proptest! {
    /// Once an edge condition fires, a steady next bar never re-fires it.
    #[test]
    fn edge_conditions_do_not_refire_while_steady(
        prev in -1_000.0f64..1_000.0,
        cur in -1_000.0f64..1_000.0,
        t in -1_000.0f64..1_000.0,
        (lo, hi) in ordered_pair(),
    ) {
        for c in edge_conditions(t, lo, hi) {
            if evaluate(&c, &value_snap(cur), Some(&value_snap(prev)), None, None) {
                prop_assert!(
                    !evaluate(&c, &value_snap(cur), Some(&value_snap(cur)), None, None),
                    "{} re-fired while steady", c.condition_type()
                );
            }
        }
    }

    #[test]
    fn line_crosses_do_not_refire_while_steady(
        pa in -10.0f64..10.0, pb in -10.0f64..10.0,
        ca in -10.0f64..10.0, cb in -10.0f64..10.0,
    ) {
        let kinds = [
            ConditionKind::LineCrossesAbove { series1: "a".into(), series2: "b".into() },
            ConditionKind::LineCrossesBelow { series1: "a".into(), series2: "b".into() },
        ];
        for kind in kinds {
            let c = ConditionInstance::new("ind", kind);
            let cur = lines_snap(ca, cb);
            if evaluate(&c, &cur, Some(&lines_snap(pa, pb)), None, None) {
                prop_assert!(!evaluate(&c, &cur, Some(&cur), None, None));
            }
        }
    }

    /// Level conditions depend on the current bar only.
    #[test]
    fn level_conditions_ignore_the_previous_bar(
        prev in proptest::option::of(-1_000.0f64..1_000.0),
        cur in -1_000.0f64..1_000.0,
        t in -1_000.0f64..1_000.0,
        (lo, hi) in ordered_pair(),
    ) {
        let prev_snap = prev.map(value_snap);
        for (c, predicate) in level_conditions(t, lo, hi) {
            let got = evaluate(&c, &value_snap(cur), prev_snap.as_ref(), None, None);
            prop_assert_eq!(got, predicate(cur), "{}", c.condition_type());
        }
    }

    #[test]
    fn crosses_above_and_below_mirror_each_other(
        t in -1_000.0f64..1_000.0,
        below in 0.001f64..100.0,
        above in 0.001f64..100.0,
    ) {
        let up = on_value(ConditionKind::CrossesAbove { operand: value(), threshold: Threshold::Value(t) });
        let down = on_value(ConditionKind::CrossesBelow { operand: value(), threshold: Threshold::Value(t) });
        let (lo, hi) = (value_snap(t - below), value_snap(t + above));

        prop_assert!(evaluate(&up, &hi, Some(&lo), None, None));
        prop_assert!(evaluate(&down, &lo, Some(&hi), None, None));

        // Staying on one side fires neither.
        let (hi2, lo2) = (value_snap(t + above * 2.0), value_snap(t - below * 2.0));
        prop_assert!(!evaluate(&up, &hi2, Some(&hi), None, None));
        prop_assert!(!evaluate(&down, &hi2, Some(&hi), None, None));
        prop_assert!(!evaluate(&up, &lo2, Some(&lo), None, None));
        prop_assert!(!evaluate(&down, &lo2, Some(&lo), None, None));
    }

    /// Delta conditions look only at the difference, never at the level.
    #[test]
    fn delta_conditions_depend_on_difference_only(
        base in -1_000.0f64..1_000.0,
        shift in -1_000.0f64..1_000.0,
        delta in -20.0f64..20.0,
        amount in 0.0f64..10.0,
    ) {
        // Stay clear of the boundary, where float rounding of the difference decides.
        prop_assume!(delta.abs() > 1e-6 && (delta.abs() - amount).abs() > 1e-6);
        let kinds = [
            ConditionKind::IncreasesBy { operand: value(), amount },
            ConditionKind::DecreasesBy { operand: value(), amount },
            ConditionKind::ChangesBy { operand: value(), amount },
        ];
        for kind in kinds {
            let c = on_value(kind);
            let a = evaluate(&c, &value_snap(base + delta), Some(&value_snap(base)), None, None);
            let b = evaluate(
                &c,
                &value_snap(shift + delta),
                Some(&value_snap(shift)),
                None,
                None,
            );
            prop_assert_eq!(a, b, "{}", c.condition_type());
        }
    }

    /// Arbitrary, possibly empty or non-finite snapshots never panic, and an
    /// absent series always evaluates to false.
    #[test]
    fn evaluation_never_panics(
        cur in proptest::option::of(proptest::num::f64::ANY),
        prev in proptest::option::of(proptest::num::f64::ANY),
        price in proptest::option::of(proptest::num::f64::ANY),
        t in -1_000.0f64..1_000.0,
        (lo, hi) in ordered_pair(),
    ) {
        let snap = |v: Option<f64>| match v {
            Some(v) => value_snap(v),
            None => IndicatorSnapshot::new(),
        };
        let price_snap = price.map(PriceSnapshot::flat);
        let mut all: Vec<ConditionInstance> = edge_conditions(t, lo, hi);
        all.extend(level_conditions(t, lo, hi).into_iter().map(|(c, _)| c));
        all.push(on_value(ConditionKind::ChangesBy { operand: Operand::Price, amount: 1.0 }));
        all.push(on_value(ConditionKind::LineCrossesAbove { series1: "value".into(), series2: "b".into() }));

        for c in &all {
            let fired = evaluate(c, &snap(cur), Some(&snap(prev)), price_snap.as_ref(), price_snap.as_ref());
            if cur.is_none() && !c.requires_price() {
                prop_assert!(!fired);
            }
        }
    }
}

#[test]
fn first_bar_is_indeterminate_for_every_edge_and_delta_type() {
    let mut all = edge_conditions(50.0, 40.0, 60.0);
    all.push(on_value(ConditionKind::IncreasesBy { operand: value(), amount: 1.0 }));
    all.push(ConditionInstance::new(
        "ind",
        ConditionKind::LineCrossesAbove { series1: "value".into(), series2: "value".into() },
    ));
    for c in all {
        assert_eq!(
            try_evaluate(&c, &value_snap(55.0), None, None, None),
            Err(Indeterminate::NoPreviousBar),
            "{}",
            c.condition_type()
        );
    }
}
