//! Vivid – attribute systems and the three valued evaluation of formulae over them.
//!
//! Vivid models what is known about a set of objects as an *attribute system*:
//! * An [`construct::Attribute`] names a domain of values (e.g. `hour` ranging over `0,...,23`).
//! * A [`construct::Relation`] is an n-ary predicate over attributes with a textual definition
//!   such as `R1(h1, h2) <=> h1 < h2`.
//! * An [`construct::AttributeStructure`] holds attributes and the relations over them.
//! * An [`construct::AttributeSystem`] pairs a structure with named objects.
//! * A [`state::State`] ascribes a [`valueset::ValueSet`] to every (attribute, object) pair;
//!   a state whose ascriptions are single values is a *world*.
//!
//! ## Value sets
//! Value sets are built from a small literal language: scalars, strings, booleans,
//! numeric pairs `(low, high)`, nested lists, bracketed strings such as `"{1, {2, 3}}"`
//! and ellipsis ranges such as `"0,...,23"`. Parsing ([`parse`]) merges overlapping and
//! adjacent ranges, absorbs scalars next to ranges and removes duplicates, so that
//! [`equivalence::nested_equivalence`], [`algebra::is_subset`] and
//! [`algebra::set_difference`] work on a canonical form.
//!
//! ## Truth values
//! A [`formula::Formula`] names a relation symbol of a [`vocabulary::Vocabulary`] and
//! applies it to constants and variables. An [`interpretation::AttributeInterpretation`]
//! maps the symbol to a relation and binds its arguments to the formula's terms. The
//! formula is evaluated in every world of a state: true if it holds in all of them,
//! false if it holds in none, unknown otherwise. Relation bodies are decided by an
//! [`expression::ExpressionEvaluator`]; the default one is pest based.
//!
//! ## Configuration
//! Parsing is governed by a [`config::ParseConfig`] (flattening of nested groups, the float
//! step, and the registry of opaque object types such as [`point::Point`]). The binary reads
//! [`config::Settings`] from an optional `vivid.toml` and `VIVID_*` environment variables.
//!
//! ## Quick Start
//! ```
//! use vivid::value_set;
//! let hours = value_set!["0,...,23"].unwrap();
//! let office = value_set![(9, 17)].unwrap();
//! assert!(office.is_subset(&hours));
//! assert_eq!((&hours - &office).len(), 2);
//! ```

pub mod error;
pub mod config;
pub mod datatype;
pub mod point;
pub mod parse;
pub mod equivalence;
pub mod algebra;
pub mod valueset;
pub mod construct;
pub mod vocabulary;
pub mod interpretation;
pub mod state;
pub mod expression;
pub mod formula;
pub mod model;

pub use error::{Result, VividError};
pub use valueset::ValueSet;

/// Parse items of mixed types, ready for [`parse::parse`] or [`ValueSet::new`].
#[macro_export]
macro_rules! items {
    ($($item:expr),* $(,)?) => {
        vec![$($crate::parse::ParseItem::from($item)),*]
    };
}

/// Builds a [`ValueSet`] under the default configuration.
#[macro_export]
macro_rules! value_set {
    ($($item:expr),* $(,)?) => {
        $crate::valueset::ValueSet::new($crate::items![$($item),*])
    };
}
