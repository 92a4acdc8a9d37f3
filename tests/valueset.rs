use std::sync::Arc;
use serde_json::json;
use vivid::config::ParseConfig;
use vivid::datatype::{Number, ParsedValue, Scalar};
use vivid::error::VividError;
use vivid::{items, value_set, ValueSet};

fn setup() -> Arc<ParseConfig> {
    Arc::new(ParseConfig::default())
}

fn int(i: i64) -> ParsedValue {
    ParsedValue::Scalar(Scalar::Number(Number::Int(i)))
}

#[test]
fn union_and_difference_operators() {
    let low = value_set![(1, 3)].expect("parse ok");
    let high = value_set![(4, 6)].expect("parse ok");
    let whole = value_set![(1, 6)].expect("parse ok");
    assert_eq!(&low + &high, whole);
    assert_eq!(&whole - &high, low);
    assert!((&low - &whole).is_empty());
    let mixed = value_set!["a", 1, vec![2, 3]].expect("parse ok");
    let less = &mixed - &value_set!["a", vec![3, 2]].expect("parse ok");
    assert_eq!(less.values(), &[int(1)]);
}

#[test]
fn membership_and_order() {
    let hours = value_set!["0,...,23"].expect("parse ok");
    assert!(hours.contains(&int(12)));
    assert!(!hours.contains(&int(24)));
    let office = value_set![(9, 17)].expect("parse ok");
    assert!(office < hours);
    assert!(hours > office);
    assert!(office <= office.clone());
    let colors = value_set!["red", "green"].expect("parse ok");
    assert_eq!(colors.partial_cmp(&hours), None);
}

#[test]
fn valuations() {
    assert!(value_set![9].expect("parse ok").is_valuation());
    assert!(value_set!["red"].expect("parse ok").is_valuation());
    assert!(value_set![vec![1, 2]].expect("parse ok").is_valuation());
    assert!(!value_set![(9, 11)].expect("parse ok").is_valuation());
    assert!(!value_set![1, 5].expect("parse ok").is_valuation());
    assert!(!ValueSet::empty(setup()).expect("valid config").is_valuation());
}

#[test]
fn discretization() {
    let hours = value_set![(9, 11)].expect("parse ok");
    assert_eq!(hours.discretize(), vec![int(9), int(10), int(11)]);
    let steps = value_set![(0.0, 0.3)].expect("parse ok");
    assert_eq!(steps.discretize().len(), 4);
    let mixed = value_set![(1, 2), "a"].expect("parse ok");
    assert_eq!(mixed.discretize().len(), 3);
}

#[test]
fn the_float_step_must_be_positive() {
    for tolerance in [0.0, -0.1, f64::NAN, f64::INFINITY] {
        let config = ParseConfig { float_merge_tolerance: tolerance, ..ParseConfig::default() }.shared();
        assert!(matches!(
            ValueSet::with_config(items![(0.0, 1.0)], Arc::clone(&config)),
            Err(VividError::Config(_))
        ));
        assert!(matches!(ValueSet::from_json(&json!([[0.0, 1.0]]), Arc::clone(&config)), Err(VividError::Config(_))));
        assert!(ValueSet::empty(Arc::clone(&config)).is_err());
        assert!(ValueSet::singleton(int(1), config).is_err());
        assert!(matches!(ParseConfig::default().with_tolerance(tolerance), Err(VividError::Config(_))));
    }
    let coarse = ParseConfig::default().with_tolerance(0.25).expect("positive tolerance").shared();
    let quarters = ValueSet::with_config(items![(0.0, 1.0)], coarse).expect("parse ok");
    assert_eq!(quarters.discretize().len(), 5);
}

#[test]
fn display_and_indexing() {
    let set = value_set!["a", (1, 3)].expect("parse ok");
    assert_eq!(set.to_string(), "{(1, 3), 'a'}");
    assert_eq!(set[1], ParsedValue::Scalar(Scalar::Str("a".into())));
    assert_eq!((&set).into_iter().count(), 2);
}

#[test]
fn insertion_renormalizes() {
    let mut set = value_set![(1, 3)].expect("parse ok");
    set.insert(items![4, (5, 8), "x"]).expect("parse ok");
    assert_eq!(set, value_set!["x", (1, 8)].expect("parse ok"));
    assert!(set.insert(items!["{1,,2}"]).is_err());
    assert_eq!(set.len(), 2);
}

#[test]
fn equality_ignores_order() {
    let one = value_set![1, "b", vec!["c", "d"]].expect("parse ok");
    let two = value_set![vec!["d", "c"], "b", 1].expect("parse ok");
    assert_eq!(one, two);
}

#[test]
fn from_json_uses_the_given_config() {
    let config = Arc::new(ParseConfig::default().flattening(true));
    let set = ValueSet::from_json(&json!([1, [2, [3]]]), Arc::clone(&config)).expect("parse ok");
    assert_eq!(set.values(), &[int(1), int(2), int(3)]);
    assert!(Arc::ptr_eq(set.config(), &config));
}
