use std::collections::BTreeMap;
use vivid::construct::{Attribute, AttributeStructure, AttributeSystem};
use vivid::error::VividError;
use vivid::state::{NamedState, State};
use vivid::value_set;
use vivid::vocabulary::{ConstantAssignment, Vocabulary};

fn system(objects: &[&str]) -> AttributeSystem {
    let structure = AttributeStructure::new(vec![
        Attribute::new("hour", value_set!["0,...,23"].expect("parse ok")).expect("valid attribute").into(),
        Attribute::new("color", value_set!["red", "green"].expect("parse ok")).expect("valid attribute").into(),
        Attribute::new("weight", value_set![(0.0, 1.0)].expect("parse ok")).expect("valid attribute").into(),
    ])
    .expect("valid structure");
    AttributeSystem::new(structure, objects.iter().map(|o| o.to_string()).collect()).expect("valid system")
}

// a state over one object with everything but the hour pinned down
fn setup() -> State {
    let mut state = State::new(system(&["a"]));
    state.set_ascription("color", "a", value_set!["red"].expect("parse ok")).expect("within domain");
    state.set_ascription("weight", "a", value_set![0.5].expect("parse ok")).expect("within domain");
    state
}

#[test]
fn new_states_start_from_the_attribute_values() {
    let state = State::new(system(&["a", "b"]));
    assert_eq!(state.ascriptions().count(), 6);
    assert_eq!(
        state.ascription("hour", "b").expect("present"),
        &value_set![(0, 23)].expect("parse ok")
    );
    assert!(!state.is_world());
}

#[test]
fn one_world_per_value() {
    let mut state = setup();
    state.set_ascription("hour", "a", value_set![(9, 11)].expect("parse ok")).expect("within domain");
    let worlds = state.worlds();
    assert_eq!(worlds.len(), 3);
    for (world, hour) in worlds.iter().zip(9..) {
        assert!(world.is_world());
        assert!(world.is_extension_of(&state));
        assert_eq!(world.ascription("hour", "a").expect("present"), &value_set![hour].expect("parse ok"));
    }
}

#[test]
fn worlds_multiply() {
    let mut state = setup();
    state.set_ascription("hour", "a", value_set![(9, 11)].expect("parse ok")).expect("within domain");
    state.set_ascription("color", "a", value_set!["red", "green"].expect("parse ok")).expect("within domain");
    assert_eq!(state.worlds().len(), 6);
}

#[test]
fn float_ascriptions_step_by_the_tolerance() {
    let mut state = setup();
    state.set_ascription("hour", "a", value_set![9].expect("parse ok")).expect("within domain");
    state.set_ascription("weight", "a", value_set![(0.5, 0.7)].expect("parse ok")).expect("within domain");
    assert_eq!(state.worlds().len(), 3);
}

#[test]
fn a_world_is_its_own_only_world() {
    let mut state = setup();
    state.set_ascription("hour", "a", value_set![12].expect("parse ok")).expect("within domain");
    assert!(state.is_world());
    assert_eq!(state.worlds(), vec![state.clone()]);
}

#[test]
fn an_empty_ascription_has_no_worlds() {
    let mut state = setup();
    state.set_ascription("hour", "a", value_set![].expect("parse ok")).expect("within domain");
    assert!(state.worlds().is_empty());
}

#[test]
fn ascriptions_stay_within_the_attribute() {
    let mut state = setup();
    assert!(matches!(
        state.set_ascription("hour", "a", value_set![(20, 30)].expect("parse ok")),
        Err(VividError::Domain(_))
    ));
    assert!(matches!(
        state.set_ascription("hour", "z", value_set![1].expect("parse ok")),
        Err(VividError::Lookup(_))
    ));
    assert!(matches!(
        state.set_ascription("size", "a", value_set![1].expect("parse ok")),
        Err(VividError::Lookup(_))
    ));
    assert!(matches!(state.ascription("size", "a"), Err(VividError::Lookup(_))));
}

#[test]
fn extension_order() {
    let broad = State::new(system(&["a"]));
    let narrow = setup();
    assert!(narrow.is_extension_of(&broad));
    assert!(!broad.is_extension_of(&narrow));
    assert!(narrow < broad);
    let mut other = State::new(system(&["a"]));
    other.set_ascription("color", "a", value_set!["green"].expect("parse ok")).expect("within domain");
    assert_eq!(narrow.partial_cmp(&other), None);
    let elsewhere = State::new(system(&["b"]));
    assert!(!elsewhere.is_extension_of(&broad));
}

#[test]
fn named_states_share_the_system() {
    let vocabulary = Vocabulary::new(vec!["alice".into()], Vec::new(), Vec::new()).expect("valid vocabulary");
    let mapping: BTreeMap<String, String> = [("alice".to_string(), "a".to_string())].into();
    let constants = ConstantAssignment::new(vocabulary.clone(), system(&["a"]), mapping.clone())
        .expect("valid assignment");
    let named = NamedState::new(setup(), constants).expect("same system");
    assert_eq!(named.constants().get("alice"), Some("a"));

    let constants = ConstantAssignment::new(vocabulary, system(&["a", "b"]), mapping).expect("valid assignment");
    assert!(matches!(NamedState::new(setup(), constants), Err(VividError::InputMismatch(_))));
}
