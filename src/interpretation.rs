// used to keep the one-to-one mapping between relation symbols and subscripts
use bimap::BiMap;
use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

use crate::construct::{AttributeStructure, NameHasher, Relation};
use crate::error::{Result, VividError};
use crate::vocabulary::Vocabulary;

/// Binds one relation argument: the attribute it ranges over, and which
/// term of a formula (counting from 1) supplies its object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePair {
    pub label: String,
    pub index: usize,
}

impl ProfilePair {
    pub fn new(label: impl Into<String>, index: usize) -> Self {
        Self { label: label.into(), index }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationEntry {
    pub symbol: String,
    pub subscript: u32,
    pub profile: Vec<ProfilePair>,
}

#[derive(Clone, Debug)]
pub struct AttributeInterpretation {
    vocabulary: Vocabulary,
    structure: AttributeStructure,
    table: BiMap<String, u32>,
    profiles: HashMap<String, Vec<ProfilePair>, NameHasher>,
}

impl AttributeInterpretation {
    pub fn new(
        vocabulary: Vocabulary,
        structure: AttributeStructure,
        entries: Vec<InterpretationEntry>,
    ) -> Result<Self> {
        let mut table = BiMap::new();
        let mut profiles = HashMap::<String, Vec<ProfilePair>, NameHasher>::default();
        for entry in entries {
            let symbol = vocabulary.relation_symbol(&entry.symbol)?;
            let relation = structure.relation(entry.subscript)?;
            if entry.profile.len() != relation.arity() {
                return Err(VividError::Cardinality(format!(
                    "the profile of '{}' has {} pairs but R{} takes {} arguments",
                    entry.symbol,
                    entry.profile.len(),
                    entry.subscript,
                    relation.arity()
                )));
            }
            for (pair, label) in entry.profile.iter().zip(relation.domain()) {
                if pair.index == 0 || pair.index > symbol.arity() {
                    return Err(VividError::Bounds {
                        index: pair.index,
                        max: symbol.arity(),
                    });
                }
                if pair.label != *label {
                    return Err(VividError::Domain(format!(
                        "the profile of '{}' binds '{}' where R{} ranges over '{}'",
                        entry.symbol, pair.label, entry.subscript, label
                    )));
                }
            }
            table
                .insert_no_overwrite(entry.symbol.clone(), entry.subscript)
                .map_err(|(symbol, subscript)| {
                    VividError::Cardinality(format!(
                        "'{}' and R{} are already interpreted",
                        symbol, subscript
                    ))
                })?;
            profiles.insert(entry.symbol, entry.profile);
        }
        Ok(Self { vocabulary, structure, table, profiles })
    }
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
    pub fn structure(&self) -> &AttributeStructure {
        &self.structure
    }
    pub fn subscript_of(&self, symbol: &str) -> Option<u32> {
        self.table.get_by_left(symbol).copied()
    }
    pub fn symbol_of(&self, subscript: u32) -> Option<&str> {
        self.table.get_by_right(&subscript).map(String::as_str)
    }
    /// The relation a symbol stands for, with its profile.
    pub fn resolve(&self, symbol: &str) -> Result<(&Relation, &[ProfilePair])> {
        let subscript = self.subscript_of(symbol).ok_or_else(|| {
            VividError::Lookup(format!("'{}' has no entry in the interpretation", symbol))
        })?;
        let profile = self.profiles.get(symbol).ok_or_else(|| {
            VividError::Lookup(format!("'{}' has no profile in the interpretation", symbol))
        })?;
        Ok((self.structure.relation(subscript)?, profile))
    }
    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
impl fmt::Display for AttributeInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut entries: Vec<(&String, &u32)> = self.table.iter().collect();
        entries.sort();
        for (symbol, subscript) in entries {
            let profile: Vec<String> = self
                .profiles
                .get(symbol)
                .map(|p| p.iter().map(|pair| format!("({}, {})", pair.label, pair.index)).collect())
                .unwrap_or_default();
            writeln!(f, "{} -> R{}: [{}]", symbol, subscript, profile.join(", "))?;
        }
        Ok(())
    }
}
