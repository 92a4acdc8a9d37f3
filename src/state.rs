use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::construct::AttributeSystem;
use crate::datatype::ParsedValue;
use crate::error::{Result, VividError};
use crate::valueset::ValueSet;
use crate::vocabulary::ConstantAssignment;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AscriptionKey {
    pub label: String,
    pub object: String,
}

impl AscriptionKey {
    pub fn new(label: impl Into<String>, object: impl Into<String>) -> Self {
        Self { label: label.into(), object: object.into() }
    }
}
impl fmt::Display for AscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.label, self.object)
    }
}

// ------------- State -------------
/// The values each object may still take for each attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    system: Arc<AttributeSystem>,
    ascriptions: BTreeMap<AscriptionKey, ValueSet>,
}

impl State {
    /// Every ascription starts out as the full value set of its attribute.
    pub fn new(system: AttributeSystem) -> Self {
        let mut ascriptions = BTreeMap::new();
        for attribute in system.structure().attributes() {
            for object in system.objects() {
                ascriptions.insert(
                    AscriptionKey::new(attribute.label(), object.as_str()),
                    attribute.values().clone(),
                );
            }
        }
        Self {
            system: Arc::new(system),
            ascriptions,
        }
    }
    pub fn system(&self) -> &AttributeSystem {
        &self.system
    }
    pub fn ascription(&self, label: &str, object: &str) -> Result<&ValueSet> {
        self.ascriptions
            .get(&AscriptionKey::new(label, object))
            .ok_or_else(|| VividError::Lookup(format!("no ascription for ({}, {})", label, object)))
    }
    pub fn ascriptions(&self) -> impl Iterator<Item = (&AscriptionKey, &ValueSet)> {
        self.ascriptions.iter()
    }
    /// Narrows an ascription; the values must lie within the attribute's.
    pub fn set_ascription(&mut self, label: &str, object: &str, values: ValueSet) -> Result<()> {
        let key = AscriptionKey::new(label, object);
        if !self.ascriptions.contains_key(&key) {
            return Err(VividError::Lookup(format!("no ascription for {}", key)));
        }
        let attribute = self.system.structure().attribute(label)?;
        if !values.is_subset(attribute.values()) {
            return Err(VividError::Domain(format!(
                "{} is not within the values of '{}'",
                values, label
            )));
        }
        self.ascriptions.insert(key, values);
        Ok(())
    }
    pub fn is_world(&self) -> bool {
        self.ascriptions.values().all(ValueSet::is_valuation)
    }
    /// One world per combination of concrete values. Recomputed on every
    /// call, the count is the product of the discretized ascription sizes.
    pub fn worlds(&self) -> Vec<State> {
        let keys: Vec<&AscriptionKey> = self.ascriptions.keys().collect();
        let choices: Vec<(Vec<ParsedValue>, &ValueSet)> = self
            .ascriptions
            .values()
            .map(|values| (values.discretize(), values))
            .collect();
        let total = choices.iter().map(|(options, _)| options.len()).product::<usize>();
        debug!(worlds = total, ascriptions = keys.len(), "enumerating worlds");
        let mut worlds = Vec::with_capacity(total);
        if total == 0 {
            return worlds;
        }
        let mut cursor = vec![0usize; choices.len()];
        loop {
            let ascriptions = keys
                .iter()
                .zip(&choices)
                .zip(&cursor)
                .map(|((key, (options, values)), &i)| {
                    let pinned = values.pinned_to(options[i].clone());
                    ((*key).clone(), pinned)
                })
                .collect();
            worlds.push(State {
                system: Arc::clone(&self.system),
                ascriptions,
            });
            // advance like an odometer, the last key turning fastest
            let mut position = cursor.len();
            loop {
                if position == 0 {
                    return worlds;
                }
                position -= 1;
                cursor[position] += 1;
                if cursor[position] < choices[position].0.len() {
                    break;
                }
                cursor[position] = 0;
            }
        }
    }
    /// Whether every ascription of this state lies within the other's.
    pub fn is_extension_of(&self, other: &State) -> bool {
        self.system == other.system
            && self.ascriptions.iter().all(|(key, values)| {
                other
                    .ascriptions
                    .get(key)
                    .is_some_and(|theirs| values.is_subset(theirs))
            })
    }
}
impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.is_extension_of(other) {
            Some(Ordering::Less)
        } else if other.is_extension_of(self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (key, values) in &self.ascriptions {
            writeln!(f, "{} -> {}", key, values)?;
        }
        Ok(())
    }
}

// ------------- NamedState -------------
/// A state together with the objects its constants denote.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedState {
    state: State,
    constants: ConstantAssignment,
}

impl NamedState {
    pub fn new(state: State, constants: ConstantAssignment) -> Result<Self> {
        if state.system() != constants.system() {
            return Err(VividError::InputMismatch(
                "the constant assignment is over a different attribute system".into(),
            ));
        }
        Ok(Self { state, constants })
    }
    pub fn state(&self) -> &State {
        &self.state
    }
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }
    pub fn constants(&self) -> &ConstantAssignment {
        &self.constants
    }
}
