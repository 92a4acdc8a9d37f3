use std::collections::BTreeMap;
use vivid::construct::{Attribute, AttributeStructure, AttributeSystem, Component, Relation};
use vivid::error::VividError;
use vivid::interpretation::{AttributeInterpretation, InterpretationEntry, ProfilePair};
use vivid::point::Geometric;
use vivid::value_set;
use vivid::vocabulary::{ConstantAssignment, RelationSymbol, Vocabulary, VariableAssignment};

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn hour() -> Attribute {
    Attribute::new("hour", value_set!["0,...,23"].expect("parse ok")).expect("valid attribute")
}

fn color() -> Attribute {
    Attribute::new("color", value_set!["red", "green"].expect("parse ok")).expect("valid attribute")
}

fn earlier() -> Relation {
    Relation::new("R1(h1, h2) <=> h1 < h2", strings(&["hour", "hour"]), 1).expect("valid relation")
}

fn setup() -> AttributeStructure {
    AttributeStructure::new(vec![hour().into(), color().into(), earlier().into()]).expect("valid structure")
}

fn vocabulary() -> Vocabulary {
    Vocabulary::new(
        strings(&["alice", "bob"]),
        vec![RelationSymbol::new("Earlier", 2).expect("valid symbol")],
        strings(&["x"]),
    )
    .expect("valid vocabulary")
}

fn entry(symbol: &str, subscript: u32, profile: &[(&str, usize)]) -> InterpretationEntry {
    InterpretationEntry {
        symbol: symbol.to_string(),
        subscript,
        profile: profile.iter().map(|(label, index)| ProfilePair::new(*label, *index)).collect(),
    }
}

#[test]
fn attributes_need_a_label() {
    let values = value_set![1].expect("parse ok");
    assert!(matches!(Attribute::new("  ", values), Err(VividError::Type(_))));
    assert_eq!(hour().to_string(), "hour: {(0, 23)}");
}

#[test]
fn relation_definitions() {
    let relation = earlier();
    assert_eq!(relation.arity(), 2);
    assert_eq!(relation.arguments(), &strings(&["h1", "h2"])[..]);
    assert_eq!(relation.body(), "h1 < h2");
    assert!(relation.geometric().is_none());

    let malformed = |definition: &str, subscript: u32| {
        matches!(
            Relation::new(definition, strings(&["hour", "hour"]), subscript),
            Err(VividError::Malformed { .. })
        )
    };
    assert!(malformed("R2(h1, h2) <=> h1 < h2", 1), "subscript mismatch");
    assert!(malformed("R1(h1, h2) => h1 < h2", 1), "missing equivalence");
    assert!(malformed("R1(h1, h1) <=> h1 < 3", 1), "repeated argument");
    assert!(malformed("R1(h1, 2h) <=> h1 < 3", 1), "bad argument name");
    assert!(malformed("R1(h1, h2) <=>   ", 1), "no body");
    assert!(matches!(
        Relation::new("R1(h1) <=> h1 < 3", strings(&["hour", "hour"]), 1),
        Err(VividError::Cardinality(_))
    ));
}

#[test]
fn geometric_relations_are_recognized() {
    let relation = Relation::new(
        "R3(p, a, b) <=> is_on(p, b, a)",
        strings(&["position", "position", "position"]),
        3,
    )
    .expect("valid relation");
    let call = relation.geometric().expect("geometric body");
    assert_eq!(call.kind(), Geometric::IsOn);
    assert_eq!(call.arguments(), &[0, 2, 1]);
    assert!(matches!(
        Relation::new("R3(p, q) <=> is_on(p, q)", strings(&["position", "position"]), 3),
        Err(VividError::Malformed { .. })
    ));
}

#[test]
fn relations_range_over_known_attributes() {
    let mut structure = AttributeStructure::new(vec![color().into()]).expect("valid structure");
    assert!(matches!(structure.insert(earlier()), Err(VividError::Domain(_))));
    assert_eq!(structure.cardinality(), 1);
    assert!(structure.subscripts().is_empty());
    // the attribute may arrive in the same batch as the relation
    let structure = AttributeStructure::new(vec![earlier().into(), hour().into()]).expect("valid structure");
    assert_eq!(structure.subscripts(), vec![1]);
}

#[test]
fn component_order_does_not_matter() {
    let one = setup();
    let two = AttributeStructure::new(vec![earlier().into(), color().into(), hour().into()])
        .expect("valid structure");
    assert_eq!(one, two);
    assert_eq!(one.labels(), vec!["color", "hour"]);
    let three = AttributeStructure::default()
        .with(color())
        .and_then(|s| s.with(AttributeStructure::new(vec![hour().into(), earlier().into()])?))
        .expect("valid structure");
    assert_eq!(one, three);
}

#[test]
fn duplicates_are_rejected() {
    let mut structure = setup();
    assert!(matches!(structure.insert(hour()), Err(VividError::Cardinality(_))));
    let again = Relation::new("R1(a, b) <=> a > b", strings(&["hour", "hour"]), 1).expect("valid relation");
    assert!(matches!(structure.insert(again), Err(VividError::Cardinality(_))));
    let batch: Vec<Component> = vec![
        Attribute::new("weight", value_set![(1, 10)].expect("parse ok")).expect("valid attribute").into(),
        color().into(),
    ];
    assert!(structure.insert(AttributeStructure::default()).is_ok());
    assert!(AttributeStructure::new(batch.clone()).is_ok());
    // a failed insert leaves nothing behind
    let before = structure.clone();
    assert!(structure.insert(AttributeStructure::new(batch).expect("valid structure")).is_err());
    assert_eq!(structure, before);
    assert!(structure.attribute("weight").is_err());
}

#[test]
fn removal() {
    let mut structure = setup();
    assert!(matches!(structure.remove_attribute("hour"), Err(VividError::Domain(_))));
    assert!(matches!(structure.remove_attribute("size"), Err(VividError::Lookup(_))));
    assert!(matches!(structure.remove_relation(7), Err(VividError::Lookup(_))));
    structure.remove_relation(1).expect("present");
    structure.remove_attribute("hour").expect("no longer used");
    assert_eq!(structure.labels(), vec!["color"]);
    assert!(matches!(structure.relation(1), Err(VividError::Lookup(_))));
}

#[test]
fn substructures() {
    let whole = setup();
    let part = AttributeStructure::new(vec![
        Attribute::new("hour", value_set![(9, 17)].expect("parse ok")).expect("valid attribute").into(),
    ])
    .expect("valid structure");
    assert!(part.is_substructure_of(&whole));
    assert!(!whole.is_substructure_of(&part));
    assert!(whole.is_substructure_of(&whole));
}

#[test]
fn systems_have_distinct_objects() {
    assert!(matches!(
        AttributeSystem::new(setup(), strings(&["a", "b", "a"])),
        Err(VividError::Cardinality(_))
    ));
    assert!(matches!(AttributeSystem::new(setup(), strings(&["a", ""])), Err(VividError::Type(_))));
    let system = AttributeSystem::new(setup(), strings(&["a", "b"])).expect("valid system");
    assert!(system.has_object("b"));
    assert!(!system.has_object("c"));
}

#[test]
fn vocabularies() {
    assert!(matches!(
        Vocabulary::new(strings(&["a"]), Vec::new(), strings(&["a"])),
        Err(VividError::Cardinality(_))
    ));
    let symbol = RelationSymbol::new("Near", 2).expect("valid symbol");
    assert!(matches!(
        Vocabulary::new(Vec::new(), vec![symbol.clone(), symbol], Vec::new()),
        Err(VividError::Cardinality(_))
    ));
    assert!(matches!(RelationSymbol::new("Near", 0), Err(VividError::Cardinality(_))));
    assert!(matches!(RelationSymbol::new("", 1), Err(VividError::Type(_))));

    let mut vocabulary = vocabulary();
    assert!(matches!(vocabulary.add_variable("bob"), Err(VividError::Cardinality(_))));
    vocabulary.add_variable("y").expect("fresh variable");
    assert!(vocabulary.is_variable("y"));
    assert!(matches!(vocabulary.relation_symbol("Later"), Err(VividError::Lookup(_))));
    // sorted contents make the order of construction irrelevant
    let reordered = Vocabulary::new(
        strings(&["bob", "alice"]),
        vec![RelationSymbol::new("Earlier", 2).expect("valid symbol")],
        strings(&["x"]),
    )
    .expect("valid vocabulary");
    assert_eq!(reordered, self::vocabulary());
}

#[test]
fn assignments_check_terms_and_objects() {
    let system = AttributeSystem::new(setup(), strings(&["a", "b"])).expect("valid system");
    let mapping = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
        pairs.iter().map(|(t, o)| (t.to_string(), o.to_string())).collect()
    };
    let constants = ConstantAssignment::new(vocabulary(), system.clone(), mapping(&[("alice", "a")]))
        .expect("valid assignment");
    assert_eq!(constants.get("alice"), Some("a"));
    assert_eq!(constants.get("bob"), None);
    assert!(matches!(
        ConstantAssignment::new(vocabulary(), system.clone(), mapping(&[("x", "a")])),
        Err(VividError::Lookup(_))
    ));
    assert!(matches!(
        ConstantAssignment::new(vocabulary(), system.clone(), mapping(&[("alice", "z")])),
        Err(VividError::Lookup(_))
    ));
    assert!(VariableAssignment::new(vocabulary(), system.clone(), mapping(&[("x", "b")])).is_ok());
    assert!(matches!(
        VariableAssignment::new(vocabulary(), system, mapping(&[("alice", "b")])),
        Err(VividError::Lookup(_))
    ));
}

#[test]
fn interpretations() {
    let interpret = |entries: Vec<InterpretationEntry>| {
        AttributeInterpretation::new(vocabulary(), setup(), entries)
    };
    let interpretation = interpret(vec![entry("Earlier", 1, &[("hour", 1), ("hour", 2)])])
        .expect("valid interpretation");
    assert_eq!(interpretation.subscript_of("Earlier"), Some(1));
    assert_eq!(interpretation.symbol_of(1), Some("Earlier"));
    let (relation, profile) = interpretation.resolve("Earlier").expect("interpreted");
    assert_eq!(relation.subscript(), 1);
    assert_eq!(profile[1], ProfilePair::new("hour", 2));

    assert!(matches!(
        interpret(vec![entry("Earlier", 1, &[("hour", 1), ("hour", 3)])]),
        Err(VividError::Bounds { index: 3, max: 2 })
    ));
    assert!(matches!(
        interpret(vec![entry("Earlier", 1, &[("hour", 0), ("hour", 1)])]),
        Err(VividError::Bounds { index: 0, .. })
    ));
    assert!(matches!(
        interpret(vec![entry("Earlier", 1, &[("color", 1), ("hour", 2)])]),
        Err(VividError::Domain(_))
    ));
    assert!(matches!(
        interpret(vec![entry("Earlier", 1, &[("hour", 1)])]),
        Err(VividError::Cardinality(_))
    ));
    assert!(matches!(
        interpret(vec![entry("Later", 1, &[("hour", 1), ("hour", 2)])]),
        Err(VividError::Lookup(_))
    ));
    assert!(matches!(
        interpret(vec![entry("Earlier", 4, &[("hour", 1), ("hour", 2)])]),
        Err(VividError::Lookup(_))
    ));
    assert!(matches!(
        interpret(vec![
            entry("Earlier", 1, &[("hour", 1), ("hour", 2)]),
            entry("Earlier", 1, &[("hour", 2), ("hour", 1)]),
        ]),
        Err(VividError::Cardinality(_))
    ));
    assert!(matches!(interpretation.resolve("Missing"), Err(VividError::Lookup(_))));
}
