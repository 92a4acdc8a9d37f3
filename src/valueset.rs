use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Index, Sub};
use std::sync::Arc;
use serde_json::Value as Json;
use tracing::warn;

use crate::algebra::{is_subset, set_difference};
use crate::config::{default_config, ParseConfig};
use crate::datatype::{ParsedValue, Scalar};
use crate::equivalence::nested_equivalence;
use crate::error::Result;
use crate::parse::{normalize, parse, parse_json, ParseItem};

// discretizing beyond this many values is most likely a mistake
const LARGE_DISCRETIZATION: usize = 100_000;

/// A canonical set of values, kept together with the configuration it was
/// parsed under.
#[derive(Clone, Debug)]
pub struct ValueSet {
    values: Vec<ParsedValue>,
    config: Arc<ParseConfig>,
}

impl ValueSet {
    pub fn new(items: Vec<ParseItem>) -> Result<Self> {
        Self::with_config(items, default_config())
    }
    pub fn with_config(items: Vec<ParseItem>, config: Arc<ParseConfig>) -> Result<Self> {
        let values = parse(&items, &config)?;
        Ok(Self { values, config })
    }
    pub fn from_json(value: &Json, config: Arc<ParseConfig>) -> Result<Self> {
        let values = parse_json(value, &config)?;
        Ok(Self { values, config })
    }
    pub fn empty(config: Arc<ParseConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            values: Vec::new(),
            config,
        })
    }
    pub fn singleton(value: ParsedValue, config: Arc<ParseConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_values(vec![value], config))
    }
    /// The set holding just `value`, under this set's configuration.
    pub fn pinned_to(&self, value: ParsedValue) -> ValueSet {
        Self::from_values(vec![value], Arc::clone(&self.config))
    }
    // callers hand in a configuration that has already been validated
    fn from_values(values: Vec<ParsedValue>, config: Arc<ParseConfig>) -> Self {
        Self {
            values: normalize(values, &config, true),
            config,
        }
    }
    pub fn values(&self) -> &[ParsedValue] {
        &self.values
    }
    pub fn config(&self) -> &Arc<ParseConfig> {
        &self.config
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, ParsedValue> {
        self.values.iter()
    }
    pub fn contains(&self, value: &ParsedValue) -> bool {
        is_subset(std::slice::from_ref(value), &self.values, &self.config)
    }
    pub fn insert(&mut self, items: Vec<ParseItem>) -> Result<()> {
        let mut values = parse(&items, &self.config)?;
        values.extend(self.values.drain(..));
        self.values = normalize(values, &self.config, true);
        Ok(())
    }
    pub fn union(&self, other: &ValueSet) -> ValueSet {
        let values = self.values.iter().chain(&other.values).cloned().collect();
        Self::from_values(values, Arc::clone(&self.config))
    }
    pub fn difference(&self, other: &ValueSet) -> ValueSet {
        Self {
            values: set_difference(&self.values, &other.values, &self.config),
            config: Arc::clone(&self.config),
        }
    }
    pub fn is_subset(&self, other: &ValueSet) -> bool {
        is_subset(&self.values, &other.values, &self.config)
    }
    /// A single concrete value, the only kind of ascription a world has.
    pub fn is_valuation(&self) -> bool {
        self.values.len() == 1 && !self.values[0].is_range()
    }
    /// Every concrete value, with ranges expanded.
    pub fn discretize(&self) -> Vec<ParsedValue> {
        let df = self.config.float_merge_tolerance;
        let mut discrete = Vec::new();
        for value in &self.values {
            match value {
                ParsedValue::Range(interval) => discrete.extend(
                    interval
                        .points(df)
                        .into_iter()
                        .map(|n| ParsedValue::Scalar(Scalar::Number(n))),
                ),
                other => discrete.push(other.clone()),
            }
        }
        if discrete.len() > LARGE_DISCRETIZATION {
            warn!(values = discrete.len(), set = %self, "large discretization");
        }
        discrete
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        nested_equivalence(&self.values, &other.values, &self.config, false)
    }
}
impl PartialOrd for ValueSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.is_subset(other) {
            Some(Ordering::Less)
        } else if other.is_subset(self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}
impl Add for &ValueSet {
    type Output = ValueSet;
    fn add(self, other: &ValueSet) -> ValueSet {
        self.union(other)
    }
}
impl Sub for &ValueSet {
    type Output = ValueSet;
    fn sub(self, other: &ValueSet) -> ValueSet {
        self.difference(other)
    }
}
impl Index<usize> for ValueSet {
    type Output = ParsedValue;
    fn index(&self, index: usize) -> &ParsedValue {
        &self.values[index]
    }
}
impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a ParsedValue;
    type IntoIter = std::slice::Iter<'a, ParsedValue>;
    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(ToString::to_string).collect();
        write!(f, "{{{}}}", values.join(", "))
    }
}
