use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, info};

use crate::config::ParseConfig;
use crate::construct::{Attribute, AttributeStructure, AttributeSystem, Component, Relation};
use crate::error::Result;
use crate::expression::ExpressionEvaluator;
use crate::formula::{Formula, TruthValue};
use crate::interpretation::{AttributeInterpretation, InterpretationEntry};
use crate::state::{NamedState, State};
use crate::valueset::ValueSet;
use crate::vocabulary::{ConstantAssignment, RelationSymbol, VariableAssignment, Vocabulary};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub label: String,
    pub values: Json,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelationSpec {
    pub definition: String,
    pub domain: Vec<String>,
    pub subscript: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymbolSpec {
    pub name: String,
    pub arity: usize,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularySpec {
    pub constants: Vec<String>,
    pub relation_symbols: Vec<SymbolSpec>,
    pub variables: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AscriptionSpec {
    pub label: String,
    pub object: String,
    pub values: Json,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormulaSpec {
    pub name: String,
    pub terms: Vec<String>,
}

/// A whole scenario as read from a JSON file. Value sets are JSON arrays in
/// the literal language, e.g. `["0,...,23"]` or `["{'red', 'blue'}", true]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Model {
    pub attributes: Vec<AttributeSpec>,
    #[serde(default)]
    pub relations: Vec<RelationSpec>,
    pub objects: Vec<String>,
    #[serde(default)]
    pub vocabulary: VocabularySpec,
    #[serde(default)]
    pub interpretation: Vec<InterpretationEntry>,
    #[serde(default)]
    pub constants: BTreeMap<String, String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub ascriptions: Vec<AscriptionSpec>,
    #[serde(default)]
    pub formulas: Vec<FormulaSpec>,
}

impl Model {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let model = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            attributes = model.attributes.len(),
            formulas = model.formulas.len(),
            "model loaded"
        );
        Ok(model)
    }
    pub fn build(&self, config: Arc<ParseConfig>) -> Result<Scenario> {
        let mut components: Vec<Component> = Vec::new();
        for spec in &self.attributes {
            let values = ValueSet::from_json(&spec.values, Arc::clone(&config))?;
            components.push(Attribute::new(spec.label.as_str(), values)?.into());
        }
        for spec in &self.relations {
            components.push(Relation::new(&spec.definition, spec.domain.clone(), spec.subscript)?.into());
        }
        let structure = AttributeStructure::new(components)?;
        let system = AttributeSystem::new(structure.clone(), self.objects.clone())?;
        let symbols = self
            .vocabulary
            .relation_symbols
            .iter()
            .map(|s| RelationSymbol::new(s.name.as_str(), s.arity))
            .collect::<Result<Vec<_>>>()?;
        let vocabulary = Vocabulary::new(
            self.vocabulary.constants.clone(),
            symbols,
            self.vocabulary.variables.clone(),
        )?;
        let interpretation =
            AttributeInterpretation::new(vocabulary.clone(), structure, self.interpretation.clone())?;
        let constants = ConstantAssignment::new(vocabulary.clone(), system.clone(), self.constants.clone())?;
        let variables = VariableAssignment::new(vocabulary.clone(), system.clone(), self.variables.clone())?;
        let mut state = State::new(system);
        for spec in &self.ascriptions {
            let values = ValueSet::from_json(&spec.values, Arc::clone(&config))?;
            state.set_ascription(&spec.label, &spec.object, values)?;
        }
        let formulas = self
            .formulas
            .iter()
            .map(|f| Formula::new(vocabulary.clone(), f.name.as_str(), f.terms.clone()))
            .collect::<Result<Vec<_>>>()?;
        debug!(formulas = formulas.len(), "scenario built");
        Ok(Scenario {
            interpretation,
            named_state: NamedState::new(state, constants)?,
            variables,
            formulas,
        })
    }
}

/// Everything needed to evaluate the formulas of a model.
#[derive(Clone, Debug)]
pub struct Scenario {
    interpretation: AttributeInterpretation,
    named_state: NamedState,
    variables: VariableAssignment,
    formulas: Vec<Formula>,
}

impl Scenario {
    pub fn interpretation(&self) -> &AttributeInterpretation {
        &self.interpretation
    }
    pub fn named_state(&self) -> &NamedState {
        &self.named_state
    }
    pub fn variables(&self) -> &VariableAssignment {
        &self.variables
    }
    pub fn formulas(&self) -> &[Formula] {
        &self.formulas
    }
    pub fn evaluate(&self, evaluator: &dyn ExpressionEvaluator) -> Result<Vec<(Formula, TruthValue)>> {
        self.formulas
            .iter()
            .map(|formula| {
                let truth = formula.assign_truth_value(
                    &self.interpretation,
                    &self.named_state,
                    &self.variables,
                    evaluator,
                )?;
                info!(%formula, %truth, "evaluated");
                Ok((formula.clone(), truth))
            })
            .collect()
    }
}
