use std::sync::Arc;
use vivid::config::ParseConfig;
use vivid::datatype::{Number, ParsedValue, Scalar};
use vivid::equivalence::nested_equivalence;
use vivid::parse::{parse, ParseItem};
use vivid::valueset::ValueSet;
use vivid::items;

fn setup() -> ParseConfig {
    ParseConfig::default()
}

fn parsed(items: Vec<ParseItem>) -> Vec<ParsedValue> {
    parse(&items, &setup()).expect("parse ok")
}

fn int(i: i64) -> ParsedValue {
    ParsedValue::Scalar(Scalar::Number(Number::Int(i)))
}

#[test]
fn order_does_not_matter_at_any_level() {
    let left = parsed(items![1, vec![2, 3]]);
    let right = parsed(items![vec![3, 2], 1]);
    assert!(nested_equivalence(&left, &right, &setup(), false));
    let left = parsed(items!["{{1}, {1, 2}}", "a"]);
    let right = parsed(items!["a", "{{2, 1}, {1}}"]);
    assert!(nested_equivalence(&left, &right, &setup(), false));
}

#[test]
fn depth_must_match() {
    let left = parsed(items![1, vec![2]]);
    let right = parsed(items![1, 2]);
    assert!(!nested_equivalence(&left, &right, &setup(), false));
}

#[test]
fn shrinking_peels_singleton_wrappers() {
    let wrapped = parsed(items![vec![vec!["x"]]]);
    let bare = parsed(items!["x"]);
    assert!(nested_equivalence(&wrapped, &bare, &setup(), true));
    assert!(!nested_equivalence(&wrapped, &bare, &setup(), false));
}

#[test]
fn groups_pair_off_one_to_one() {
    let group = ParsedValue::Group(vec![int(1)]);
    let other = ParsedValue::Group(vec![int(2)]);
    let twice = vec![group.clone(), group.clone()];
    assert!(!nested_equivalence(&twice, &[group.clone()], &setup(), false));
    assert!(!nested_equivalence(&twice, &[group.clone(), other.clone()], &setup(), false));
    assert!(nested_equivalence(&[other.clone(), group.clone()], &[group, other], &setup(), false));
}

#[test]
fn strings_and_numbers_differ() {
    assert!(!nested_equivalence(&parsed(items!["1"]), &parsed(items![1]), &setup(), false));
    assert!(!nested_equivalence(&parsed(items![true]), &parsed(items![1]), &setup(), false));
    assert!(!nested_equivalence(&parsed(items!["a", "b"]), &parsed(items!["a"]), &setup(), false));
}

#[test]
fn ellipsis_pair_and_scalars_are_equivalent() {
    for config in [setup(), setup().flattening(true)] {
        let config = Arc::new(config);
        let ellipsis = ValueSet::with_config(items!["1,...,5"], Arc::clone(&config)).expect("parse ok");
        let pair = ValueSet::with_config(items![(1, 5)], Arc::clone(&config)).expect("parse ok");
        let scalars = ValueSet::with_config(items![1, 2, 3, 4, 5], Arc::clone(&config)).expect("parse ok");
        assert_eq!(ellipsis, pair);
        assert_eq!(pair, scalars);
        assert_eq!(scalars, ellipsis);
        let shorter = ValueSet::with_config(items![1, 2, 3, 5], config).expect("parse ok");
        assert_ne!(shorter, ellipsis);
    }
}
