// relations are kept ordered by subscript
use std::collections::BTreeMap;

// duplicate detection over labels and names
use core::hash::BuildHasherDefault;
use std::collections::HashSet;
use seahash::SeaHasher;

// used to validate relation definitions
use regex::Regex;
use lazy_static::lazy_static;

// used to print out readable forms of a construct
use std::fmt;

// our own stuff that we need
use crate::error::{Result, VividError};
use crate::point::Geometric;
use crate::valueset::ValueSet;

pub type NameHasher = BuildHasherDefault<SeaHasher>;

lazy_static! {
    static ref DEFINITION: Regex =
        Regex::new(r"(?s)^\s*R\s*(\d+)\s*\(([^()]*)\)\s*<=>\s*(.*?)\s*$").unwrap();
    static ref ARGUMENT: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref MARKER: Regex = Regex::new(r"^([a-z_]+)\s*\(([^()]*)\)$").unwrap();
}

/// The first name occurring more than once, if any.
pub fn first_duplicate<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::<&str, NameHasher>::default();
    names.into_iter().find(|name| !seen.insert(*name))
}

fn checked_name(name: impl Into<String>, what: &str) -> Result<String> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(VividError::Type(format!("{} must be a non-empty string", what)));
    }
    Ok(name.trim().to_string())
}

// ------------- Attribute -------------
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    label: String,
    values: ValueSet,
}

impl Attribute {
    pub fn new(label: impl Into<String>, values: ValueSet) -> Result<Self> {
        Ok(Self {
            label: checked_name(label, "an attribute label")?,
            values,
        })
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn values(&self) -> &ValueSet {
        &self.values
    }
    // values are replaced as a whole, never edited in place
    pub fn set_values(&mut self, values: ValueSet) {
        self.values = values;
    }
}
impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.values)
    }
}

// ------------- Relation -------------
/// A relation body consisting of one call to a geometric function, with the
/// positions of the relation arguments it is called on.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometricCall {
    kind: Geometric,
    arguments: Vec<usize>,
}

impl GeometricCall {
    pub fn kind(&self) -> Geometric {
        self.kind
    }
    pub fn arguments(&self) -> &[usize] {
        &self.arguments
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    definition: String,
    domain: Vec<String>,
    subscript: u32,
    arguments: Vec<String>,
    body: String,
    geometric: Option<GeometricCall>,
}

impl Relation {
    /// Validates `R<subscript>(<arg>, ..., <arg>) <=> <body>` against the
    /// given subscript and domain.
    pub fn new(definition: &str, domain: Vec<String>, subscript: u32) -> Result<Self> {
        let captures = DEFINITION.captures(definition).ok_or_else(|| {
            VividError::malformed(
                "a definition reads R<subscript>(<arguments>) <=> <expression>",
                definition,
            )
        })?;
        let stated: u32 = captures[1].parse().map_err(|_| {
            VividError::malformed("the subscript is not a valid number", definition)
        })?;
        if stated != subscript {
            return Err(VividError::malformed(
                format!("the definition names R{} but the subscript is {}", stated, subscript),
                definition,
            ));
        }
        let arguments: Vec<String> = captures[2].split(',').map(|a| a.trim().to_string()).collect();
        if let Some(bad) = arguments.iter().find(|a| !ARGUMENT.is_match(a)) {
            return Err(VividError::malformed(
                format!("'{}' is not a valid argument name", bad),
                definition,
            ));
        }
        if let Some(twice) = first_duplicate(arguments.iter().map(String::as_str)) {
            return Err(VividError::malformed(
                format!("argument '{}' appears more than once", twice),
                definition,
            ));
        }
        let body = captures[3].to_string();
        if body.is_empty() {
            return Err(VividError::malformed("the definition has no body", definition));
        }
        if domain.len() != arguments.len() {
            return Err(VividError::Cardinality(format!(
                "R{} takes {} arguments but its domain has {} labels",
                subscript,
                arguments.len(),
                domain.len()
            )));
        }
        let geometric = geometric_call(&body, &arguments, definition)?;
        Ok(Self {
            definition: definition.trim().to_string(),
            domain,
            subscript,
            arguments,
            body,
            geometric,
        })
    }
    pub fn definition(&self) -> &str {
        &self.definition
    }
    pub fn domain(&self) -> &[String] {
        &self.domain
    }
    pub fn subscript(&self) -> u32 {
        self.subscript
    }
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
    pub fn body(&self) -> &str {
        &self.body
    }
    pub fn geometric(&self) -> Option<&GeometricCall> {
        self.geometric.as_ref()
    }
}

fn geometric_call(body: &str, arguments: &[String], definition: &str) -> Result<Option<GeometricCall>> {
    let Some(captures) = MARKER.captures(body) else {
        return Ok(None);
    };
    let Some(kind) = Geometric::from_name(&captures[1]) else {
        return Ok(None);
    };
    let called: Vec<&str> = captures[2].split(',').map(str::trim).collect();
    if called.len() != kind.arity() {
        return Err(VividError::malformed(
            format!("{} takes {} arguments", kind, kind.arity()),
            definition,
        ));
    }
    let positions = called
        .iter()
        .map(|name| {
            arguments.iter().position(|a| a == name).ok_or_else(|| {
                VividError::malformed(
                    format!("'{}' is not an argument of the relation", name),
                    definition,
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(GeometricCall { kind, arguments: positions }))
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} over ({})", self.definition, self.domain.join(", "))
    }
}

// ------------- AttributeStructure -------------
#[derive(Clone, Debug)]
pub enum Component {
    Attribute(Attribute),
    Relation(Relation),
    Structure(AttributeStructure),
}
impl From<Attribute> for Component {
    fn from(attribute: Attribute) -> Self { Component::Attribute(attribute) }
}
impl From<Relation> for Component {
    fn from(relation: Relation) -> Self { Component::Relation(relation) }
}
impl From<AttributeStructure> for Component {
    fn from(structure: AttributeStructure) -> Self { Component::Structure(structure) }
}

/// Attributes ordered by label, and relations by subscript. Every label a
/// relation ranges over belongs to one of the attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeStructure {
    attributes: Vec<Attribute>,
    relations: BTreeMap<u32, Relation>,
}

impl AttributeStructure {
    pub fn new(components: Vec<Component>) -> Result<Self> {
        let mut structure = Self::default();
        structure.merge(components)?;
        Ok(structure)
    }
    /// Adds a component; on error the structure is left untouched.
    pub fn insert(&mut self, component: impl Into<Component>) -> Result<()> {
        let mut next = self.clone();
        next.merge(vec![component.into()])?;
        *self = next;
        Ok(())
    }
    pub fn with(mut self, component: impl Into<Component>) -> Result<Self> {
        self.merge(vec![component.into()])?;
        Ok(self)
    }
    // attributes go in before relations so that domains can be checked
    fn merge(&mut self, components: Vec<Component>) -> Result<()> {
        let mut attributes = Vec::new();
        let mut relations = Vec::new();
        for component in components {
            gather(component, &mut attributes, &mut relations);
        }
        for attribute in attributes {
            self.add_attribute(attribute)?;
        }
        for relation in relations {
            self.add_relation(relation)?;
        }
        Ok(())
    }
    fn add_attribute(&mut self, attribute: Attribute) -> Result<()> {
        match self
            .attributes
            .binary_search_by(|a| a.label().cmp(attribute.label()))
        {
            Ok(_) => Err(VividError::Cardinality(format!(
                "duplicate attribute label '{}'",
                attribute.label()
            ))),
            Err(position) => {
                self.attributes.insert(position, attribute);
                Ok(())
            }
        }
    }
    fn add_relation(&mut self, relation: Relation) -> Result<()> {
        if self.relations.contains_key(&relation.subscript()) {
            return Err(VividError::Cardinality(format!(
                "duplicate relation subscript {}",
                relation.subscript()
            )));
        }
        if let Some(missing) = relation
            .domain()
            .iter()
            .find(|label| self.attribute(label).is_err())
        {
            return Err(VividError::Domain(format!(
                "R{} ranges over '{}', which is not an attribute of the structure",
                relation.subscript(),
                missing
            )));
        }
        self.relations.insert(relation.subscript(), relation);
        Ok(())
    }
    pub fn remove_attribute(&mut self, label: &str) -> Result<Attribute> {
        let position = self
            .attributes
            .binary_search_by(|a| a.label().cmp(label))
            .map_err(|_| VividError::Lookup(format!("no attribute labelled '{}'", label)))?;
        if let Some(relation) = self
            .relations
            .values()
            .find(|r| r.domain().iter().any(|l| l == label))
        {
            return Err(VividError::Domain(format!(
                "'{}' is still in the domain of R{}",
                label,
                relation.subscript()
            )));
        }
        Ok(self.attributes.remove(position))
    }
    pub fn remove_relation(&mut self, subscript: u32) -> Result<Relation> {
        self.relations
            .remove(&subscript)
            .ok_or_else(|| VividError::Lookup(format!("no relation R{}", subscript)))
    }
    pub fn attribute(&self, label: &str) -> Result<&Attribute> {
        self.attributes
            .binary_search_by(|a| a.label().cmp(label))
            .map(|position| &self.attributes[position])
            .map_err(|_| VividError::Lookup(format!("no attribute labelled '{}'", label)))
    }
    pub fn relation(&self, subscript: u32) -> Result<&Relation> {
        self.relations
            .get(&subscript)
            .ok_or_else(|| VividError::Lookup(format!("no relation R{}", subscript)))
    }
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }
    pub fn labels(&self) -> Vec<&str> {
        self.attributes.iter().map(Attribute::label).collect()
    }
    pub fn subscripts(&self) -> Vec<u32> {
        self.relations.keys().copied().collect()
    }
    pub fn cardinality(&self) -> usize {
        self.attributes.len()
    }
    pub fn is_substructure_of(&self, other: &AttributeStructure) -> bool {
        self.attributes.iter().all(|a| {
            other
                .attribute(a.label())
                .is_ok_and(|o| a.values().is_subset(o.values()))
        }) && self
            .relations
            .values()
            .all(|r| other.relation(r.subscript()).is_ok_and(|o| o == r))
    }
}

fn gather(component: Component, attributes: &mut Vec<Attribute>, relations: &mut Vec<Relation>) {
    match component {
        Component::Attribute(attribute) => attributes.push(attribute),
        Component::Relation(relation) => relations.push(relation),
        Component::Structure(structure) => {
            attributes.extend(structure.attributes);
            relations.extend(structure.relations.into_values());
        }
    }
}

impl fmt::Display for AttributeStructure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts: Vec<String> = self.attributes.iter().map(ToString::to_string).collect();
        parts.extend(self.relations.values().map(ToString::to_string));
        write!(f, "({})", parts.join("; "))
    }
}

// ------------- AttributeSystem -------------
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSystem {
    structure: AttributeStructure,
    objects: Vec<String>,
}

impl AttributeSystem {
    pub fn new(structure: AttributeStructure, objects: Vec<String>) -> Result<Self> {
        let objects = objects
            .into_iter()
            .map(|o| checked_name(o, "an object name"))
            .collect::<Result<Vec<_>>>()?;
        if let Some(twice) = first_duplicate(objects.iter().map(String::as_str)) {
            return Err(VividError::Cardinality(format!("duplicate object '{}'", twice)));
        }
        Ok(Self { structure, objects })
    }
    pub fn structure(&self) -> &AttributeStructure {
        &self.structure
    }
    pub fn objects(&self) -> &[String] {
        &self.objects
    }
    pub fn has_object(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o == name)
    }
}
impl fmt::Display for AttributeSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} over {{{}}}", self.structure, self.objects.join(", "))
    }
}
