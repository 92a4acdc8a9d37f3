use std::fmt;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::construct::Relation;
use crate::datatype::{Number, ParsedValue, Scalar};
use crate::error::{Result, VividError};
use crate::expression::ExpressionEvaluator;
use crate::interpretation::AttributeInterpretation;
use crate::point::Point;
use crate::state::{NamedState, State};
use crate::vocabulary::{VariableAssignment, Vocabulary};

// ------------- TruthValue -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TruthValue {
    True,
    False,
    Unknown,
}
impl From<bool> for TruthValue {
    fn from(b: bool) -> Self {
        if b { TruthValue::True } else { TruthValue::False }
    }
}
impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TruthValue::True => write!(f, "true"),
            TruthValue::False => write!(f, "false"),
            TruthValue::Unknown => write!(f, "unknown"),
        }
    }
}

// ------------- Formula -------------
#[derive(Clone, Debug, PartialEq)]
pub struct Formula {
    vocabulary: Vocabulary,
    name: String,
    terms: Vec<String>,
}

impl Formula {
    pub fn new(vocabulary: Vocabulary, name: impl Into<String>, terms: Vec<String>) -> Result<Self> {
        let name = name.into();
        vocabulary.relation_symbol(&name)?;
        if let Some(stranger) = terms.iter().find(|t| !vocabulary.contains_term(t)) {
            return Err(VividError::Domain(format!(
                "'{}' is neither a constant nor a variable of the vocabulary",
                stranger
            )));
        }
        Ok(Self { vocabulary, name, terms })
    }
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Supervaluation over the worlds of the named state: true when the
    /// relation holds in all of them, false when it holds in none, unknown
    /// otherwise. A term denoting no object makes the formula unknown.
    pub fn assign_truth_value(
        &self,
        interpretation: &AttributeInterpretation,
        named_state: &NamedState,
        variables: &VariableAssignment,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<TruthValue> {
        self.check_inputs(interpretation, named_state, variables)?;
        let (relation, profile) = interpretation.resolve(&self.name)?;
        if profile.len() != relation.arity() {
            return Err(VividError::Cardinality(format!(
                "the profile of '{}' has {} pairs but R{} takes {} arguments",
                self.name,
                profile.len(),
                relation.subscript(),
                relation.arity()
            )));
        }
        let mut bindings = Vec::with_capacity(profile.len());
        for pair in profile {
            if pair.index == 0 || pair.index > self.terms.len() {
                return Err(VividError::Bounds {
                    index: pair.index,
                    max: self.terms.len(),
                });
            }
            let term = &self.terms[pair.index - 1];
            match named_state.constants().get(term).or_else(|| variables.get(term)) {
                Some(object) => bindings.push((pair.label.as_str(), object)),
                None => {
                    debug!(formula = %self, term = %term, "term denotes no object");
                    return Ok(TruthValue::Unknown);
                }
            }
        }
        let template = Template::new(relation)?;
        let worlds = named_state.state().worlds();
        let mut satisfied = 0;
        for world in &worlds {
            let arguments = bindings
                .iter()
                .map(|(label, object)| valuation(world, label, object))
                .collect::<Result<Vec<_>>>()?;
            let holds = template.holds(&arguments, evaluator)?;
            trace!(formula = %self, holds, "world evaluated");
            if holds {
                satisfied += 1;
            }
        }
        debug!(formula = %self, worlds = worlds.len(), satisfied, "aggregating worlds");
        Ok(if satisfied == worlds.len() {
            TruthValue::True
        } else if satisfied == 0 {
            TruthValue::False
        } else {
            TruthValue::Unknown
        })
    }

    fn check_inputs(
        &self,
        interpretation: &AttributeInterpretation,
        named_state: &NamedState,
        variables: &VariableAssignment,
    ) -> Result<()> {
        let vocabularies = [
            ("interpretation", interpretation.vocabulary()),
            ("constant assignment", named_state.constants().vocabulary()),
            ("variable assignment", variables.vocabulary()),
        ];
        if let Some((what, _)) = vocabularies.iter().find(|(_, v)| **v != self.vocabulary) {
            return Err(VividError::InputMismatch(format!(
                "the {} is over a different vocabulary than {}",
                what, self
            )));
        }
        if variables.system() != named_state.state().system() {
            return Err(VividError::InputMismatch(
                "the variable assignment is over a different attribute system".into(),
            ));
        }
        if interpretation.structure() != named_state.state().system().structure() {
            return Err(VividError::InputMismatch(
                "the interpretation is over a different attribute structure".into(),
            ));
        }
        Ok(())
    }
}

fn valuation<'a>(world: &'a State, label: &str, object: &str) -> Result<&'a ParsedValue> {
    let values = world.ascription(label, object)?;
    match values.values() {
        [value] => Ok(value),
        _ => Err(VividError::Evaluation(format!(
            "({}, {}) is not a single value in {}",
            label, object, values
        ))),
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name, self.terms.join(", "))
    }
}

// ------------- Substitution -------------
// A relation body with one pattern matching any of its argument names. The
// alternation lists longer names first, and every name is replaced in a
// single pass, so substituted values are never scanned again.
struct Template<'a> {
    relation: &'a Relation,
    names: Regex,
}

impl<'a> Template<'a> {
    fn new(relation: &'a Relation) -> Result<Self> {
        let mut names: Vec<&str> = relation.arguments().iter().map(String::as_str).collect();
        names.sort_by_key(|name| std::cmp::Reverse(name.len()));
        let alternation: Vec<String> = names.into_iter().map(regex::escape).collect();
        let names = Regex::new(&format!(r"\b(?:{})\b", alternation.join("|")))
            .map_err(|e| VividError::Evaluation(e.to_string()))?;
        Ok(Self { relation, names })
    }

    fn holds(&self, arguments: &[&ParsedValue], evaluator: &dyn ExpressionEvaluator) -> Result<bool> {
        if let Some(call) = self.relation.geometric() {
            let points = call
                .arguments()
                .iter()
                .map(|&i| as_point(arguments[i]))
                .collect::<Result<Vec<_>>>()?;
            return call.kind().holds(&points);
        }
        let rendered = arguments
            .iter()
            .map(|value| render(value))
            .collect::<Result<Vec<_>>>()?;
        let expression = self.names.replace_all(self.relation.body(), |captures: &Captures| {
            let name = &captures[0];
            self.relation
                .arguments()
                .iter()
                .position(|argument| argument == name)
                .map_or_else(|| name.to_string(), |i| rendered[i].clone())
        });
        trace!(%expression, "evaluating");
        evaluator.evaluate(&expression)
    }
}

fn as_point(value: &ParsedValue) -> Result<&Point> {
    match value {
        ParsedValue::Opaque(object) => object
            .downcast_ref::<Point>()
            .ok_or_else(|| VividError::Type(format!("{} is not a point", object))),
        other => Err(VividError::Type(format!("{} is not a point", other))),
    }
}

fn render(value: &ParsedValue) -> Result<String> {
    match value {
        ParsedValue::Scalar(Scalar::Number(n)) => {
            let text = match n {
                Number::Int(i) => i.to_string(),
                Number::Float(x) => format!("{:?}", x),
            };
            Ok(if n.as_f64() < 0.0 { format!("({})", text) } else { text })
        }
        ParsedValue::Scalar(Scalar::Bool(true)) => Ok("True".into()),
        ParsedValue::Scalar(Scalar::Bool(false)) => Ok("False".into()),
        ParsedValue::Scalar(Scalar::Str(s)) if !s.contains('\'') => Ok(format!("'{}'", s)),
        ParsedValue::Scalar(Scalar::Str(s)) => Ok(format!("\"{}\"", s)),
        other => Err(VividError::Evaluation(format!(
            "{} cannot be substituted into an expression",
            other
        ))),
    }
}

// ------------- AssumptionBase -------------
/// Distinct formulas over one vocabulary, taken to hold.
#[derive(Clone, Debug, PartialEq)]
pub struct AssumptionBase {
    vocabulary: Vocabulary,
    formulas: Vec<Formula>,
}

impl AssumptionBase {
    pub fn new(formulas: Vec<Formula>) -> Result<Self> {
        let vocabulary = formulas
            .first()
            .map(|f| f.vocabulary().clone())
            .ok_or_else(|| VividError::Cardinality("an assumption base needs a formula".into()))?;
        for (i, formula) in formulas.iter().enumerate() {
            if *formula.vocabulary() != vocabulary {
                return Err(VividError::InputMismatch(format!(
                    "{} is over a different vocabulary",
                    formula
                )));
            }
            if formulas[..i].contains(formula) {
                return Err(VividError::Cardinality(format!("{} is assumed twice", formula)));
            }
        }
        Ok(Self { vocabulary, formulas })
    }
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
    pub fn formulas(&self) -> &[Formula] {
        &self.formulas
    }
    pub fn len(&self) -> usize {
        self.formulas.len()
    }
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}

// ------------- Context -------------
#[derive(Clone, Debug, PartialEq)]
pub struct Context {
    assumption_base: AssumptionBase,
    named_state: NamedState,
}

impl Context {
    pub fn new(assumption_base: AssumptionBase, named_state: NamedState) -> Result<Self> {
        if *named_state.constants().vocabulary() != assumption_base.vocabulary {
            return Err(VividError::InputMismatch(
                "the named state is over a different vocabulary than the assumptions".into(),
            ));
        }
        Ok(Self { assumption_base, named_state })
    }
    pub fn assumption_base(&self) -> &AssumptionBase {
        &self.assumption_base
    }
    pub fn named_state(&self) -> &NamedState {
        &self.named_state
    }
    /// Whether the formula is true in every world where all assumptions are.
    pub fn entails(
        &self,
        formula: &Formula,
        interpretation: &AttributeInterpretation,
        variables: &VariableAssignment,
        evaluator: &dyn ExpressionEvaluator,
    ) -> Result<bool> {
        for world in self.named_state.state().worlds() {
            let named_world = NamedState::new(world, self.named_state.constants().clone())?;
            let mut assumed = true;
            for assumption in &self.assumption_base.formulas {
                let truth = assumption.assign_truth_value(interpretation, &named_world, variables, evaluator)?;
                if truth != TruthValue::True {
                    assumed = false;
                    break;
                }
            }
            if assumed
                && formula.assign_truth_value(interpretation, &named_world, variables, evaluator)?
                    != TruthValue::True
            {
                debug!(%formula, "a world satisfying the assumptions falsifies the formula");
                return Ok(false);
            }
        }
        Ok(true)
    }
}
