use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use vivid::construct::{Attribute, AttributeStructure, AttributeSystem};
use vivid::parse::ParseItem;
use vivid::state::State;
use vivid::{value_set, ValueSet};

// ------------- Value sets -------------
fn scattered(n: i64) -> Vec<ParseItem> {
    // every third integer as a range of two, so nothing collapses
    (0..n).map(|i| ParseItem::from((3 * i, 3 * i + 1))).collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parse ellipsis", |b| b.iter(|| value_set![black_box("0,...,1000")]));
    c.bench_function("parse nested", |b| {
        b.iter(|| value_set![black_box("{1, {2, 3}, {4, {5, 'a'}}, 6,...,9}")])
    });
    for n in [10, 100, 1000] {
        c.bench_function(&format!("parse {} ranges", n), |b| {
            b.iter(|| ValueSet::new(black_box(scattered(n))))
        });
    }

    let hours = value_set!["0,...,10000"].unwrap();
    let pieces = ValueSet::new(scattered(1000)).unwrap();
    println!("{} ranges", pieces.len());
    c.bench_function("subset 1k", |b| b.iter(|| pieces.is_subset(black_box(&hours))));
    c.bench_function("difference 1k", |b| b.iter(|| black_box(&hours) - &pieces));

    // ------------- Worlds -------------
    let structure = AttributeStructure::new(vec![
        Attribute::new("hour", value_set!["0,...,23"].unwrap()).unwrap().into(),
        Attribute::new("color", value_set!["red", "green", "blue"].unwrap()).unwrap().into(),
    ])
    .unwrap();
    let system = AttributeSystem::new(structure, vec!["a".into(), "b".into()]).unwrap();
    let mut state = State::new(system);
    state.set_ascription("hour", "a", value_set![(9, 17)].unwrap()).unwrap();
    println!("{} worlds", state.worlds().len());
    c.bench_function("worlds", |b| b.iter(|| black_box(&state).worlds()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
