use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};

use crate::construct::{first_duplicate, AttributeSystem};
use crate::error::{Result, VividError};

// ------------- RelationSymbol -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationSymbol {
    name: String,
    arity: usize,
}

impl RelationSymbol {
    pub fn new(name: impl Into<String>, arity: usize) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(VividError::Type("a relation symbol needs a name".into()));
        }
        if arity == 0 {
            return Err(VividError::Cardinality(format!(
                "relation symbol '{}' must take at least one argument",
                name
            )));
        }
        Ok(Self { name, arity })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn arity(&self) -> usize {
        self.arity
    }
}
impl fmt::Display for RelationSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

// ------------- Vocabulary -------------
/// Constants, relation symbols and variables, kept sorted so that equal
/// vocabularies compare equal whatever order they were given in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
    constants: Vec<String>,
    relation_symbols: Vec<RelationSymbol>,
    variables: Vec<String>,
}

impl Vocabulary {
    pub fn new(
        constants: Vec<String>,
        relation_symbols: Vec<RelationSymbol>,
        variables: Vec<String>,
    ) -> Result<Self> {
        let mut vocabulary = Self {
            constants: Vec::new(),
            relation_symbols,
            variables: Vec::new(),
        };
        if let Some(twice) = first_duplicate(vocabulary.relation_symbols.iter().map(RelationSymbol::name)) {
            return Err(VividError::Cardinality(format!("duplicate relation symbol '{}'", twice)));
        }
        vocabulary.relation_symbols.sort_by(|a, b| a.name.cmp(&b.name));
        for constant in constants {
            vocabulary.add_constant(constant)?;
        }
        for variable in variables {
            vocabulary.add_variable(variable)?;
        }
        Ok(vocabulary)
    }
    pub fn add_constant(&mut self, constant: impl Into<String>) -> Result<()> {
        let constant = constant.into();
        self.check_term(&constant)?;
        let position = self.constants.binary_search(&constant).unwrap_or_else(|p| p);
        self.constants.insert(position, constant);
        Ok(())
    }
    pub fn add_variable(&mut self, variable: impl Into<String>) -> Result<()> {
        let variable = variable.into();
        self.check_term(&variable)?;
        let position = self.variables.binary_search(&variable).unwrap_or_else(|p| p);
        self.variables.insert(position, variable);
        Ok(())
    }
    fn check_term(&self, term: &str) -> Result<()> {
        if term.trim().is_empty() {
            return Err(VividError::Type("terms must be non-empty strings".into()));
        }
        if self.contains_term(term) {
            return Err(VividError::Cardinality(format!(
                "'{}' is already a constant or variable",
                term
            )));
        }
        Ok(())
    }
    pub fn constants(&self) -> &[String] {
        &self.constants
    }
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
    pub fn relation_symbols(&self) -> &[RelationSymbol] {
        &self.relation_symbols
    }
    pub fn relation_symbol(&self, name: &str) -> Result<&RelationSymbol> {
        self.relation_symbols
            .iter()
            .find(|symbol| symbol.name == name)
            .ok_or_else(|| VividError::Lookup(format!("no relation symbol '{}'", name)))
    }
    pub fn is_constant(&self, term: &str) -> bool {
        self.constants.iter().any(|c| c == term)
    }
    pub fn is_variable(&self, term: &str) -> bool {
        self.variables.iter().any(|v| v == term)
    }
    pub fn contains_term(&self, term: &str) -> bool {
        self.is_constant(term) || self.is_variable(term)
    }
}
impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbols: Vec<String> = self.relation_symbols.iter().map(ToString::to_string).collect();
        write!(
            f,
            "([{}], [{}], [{}])",
            self.constants.join(", "),
            symbols.join(", "),
            self.variables.join(", ")
        )
    }
}

// ------------- Assignments -------------
fn checked_mapping(
    vocabulary: &Vocabulary,
    system: &AttributeSystem,
    mapping: BTreeMap<String, String>,
    is_term: fn(&Vocabulary, &str) -> bool,
    kind: &str,
) -> Result<BTreeMap<String, String>> {
    for (term, object) in &mapping {
        if !is_term(vocabulary, term) {
            return Err(VividError::Lookup(format!("'{}' is not a {} of the vocabulary", term, kind)));
        }
        if !system.has_object(object) {
            return Err(VividError::Lookup(format!("'{}' is not an object of the system", object)));
        }
    }
    Ok(mapping)
}

/// A partial map from constants to objects.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantAssignment {
    vocabulary: Vocabulary,
    system: AttributeSystem,
    mapping: BTreeMap<String, String>,
}

impl ConstantAssignment {
    pub fn new(
        vocabulary: Vocabulary,
        system: AttributeSystem,
        mapping: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mapping = checked_mapping(&vocabulary, &system, mapping, Vocabulary::is_constant, "constant")?;
        Ok(Self { vocabulary, system, mapping })
    }
    pub fn get(&self, constant: &str) -> Option<&str> {
        self.mapping.get(constant).map(String::as_str)
    }
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
    pub fn system(&self) -> &AttributeSystem {
        &self.system
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.mapping.iter()
    }
}

/// A partial map from variables to objects.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableAssignment {
    vocabulary: Vocabulary,
    system: AttributeSystem,
    mapping: BTreeMap<String, String>,
}

impl VariableAssignment {
    pub fn new(
        vocabulary: Vocabulary,
        system: AttributeSystem,
        mapping: BTreeMap<String, String>,
    ) -> Result<Self> {
        let mapping = checked_mapping(&vocabulary, &system, mapping, Vocabulary::is_variable, "variable")?;
        Ok(Self { vocabulary, system, mapping })
    }
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.mapping.get(variable).map(String::as_str)
    }
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
    pub fn system(&self) -> &AttributeSystem {
        &self.system
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.mapping.iter()
    }
}
