use std::f64::consts;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::datatype::FLOAT_EPSILON;
use crate::error::{Result, VividError};

#[derive(Parser)]
#[grammar = "expression.pest"]
struct ExpressionParser;

/// Decides boolean and arithmetic expressions such as
/// `10 >= 9 and not (2 ^ 3 = 7)`.
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &str) -> Result<bool>;
}

/// Understands `+ - * / ^`, the comparisons `= == != > < >= <=`, `!`/`not`,
/// `and`, `or`, the constants `PI E True False`, quoted strings and the
/// functions `sin cos tan abs trunc round sgn`. A numeric result is true
/// when it is not zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct Evaluator;

impl ExpressionEvaluator for Evaluator {
    fn evaluate(&self, expression: &str) -> Result<bool> {
        let root = ExpressionParser::parse(Rule::expression, expression)
            .map_err(|e| VividError::Evaluation(format!("cannot parse '{}': {}", expression, e)))?
            .next()
            .and_then(|expression| expression.into_inner().next())
            .ok_or_else(|| VividError::Evaluation(format!("'{}' is empty", expression)))?;
        operand(root)?.truth()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Operand {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl Operand {
    fn number(&self) -> Result<f64> {
        match self {
            Operand::Number(n) => Ok(*n),
            Operand::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Operand::Text(t) => Err(VividError::Evaluation(format!("'{}' is not a number", t))),
        }
    }
    fn truth(&self) -> Result<bool> {
        match self {
            Operand::Boolean(b) => Ok(*b),
            Operand::Number(n) => Ok(*n != 0.0),
            Operand::Text(t) => Err(VividError::Evaluation(format!("'{}' is not a truth value", t))),
        }
    }
    fn equals(&self, other: &Operand) -> Result<bool> {
        match (self, other) {
            (Operand::Text(a), Operand::Text(b)) => Ok(a == b),
            (Operand::Text(_), _) | (_, Operand::Text(_)) => Err(VividError::Evaluation(
                "a string can only be compared with a string".into(),
            )),
            _ => Ok((self.number()? - other.number()?).abs() <= FLOAT_EPSILON),
        }
    }
}

fn unexpected(pair: &Pair<Rule>) -> VividError {
    VividError::Evaluation(format!("unexpected '{}'", pair.as_str()))
}

fn operand(pair: Pair<Rule>) -> Result<Operand> {
    match pair.as_rule() {
        Rule::disjunction | Rule::conjunction => {
            let disjunctive = pair.as_rule() == Rule::disjunction;
            let terms: Vec<Pair<Rule>> = pair
                .into_inner()
                .filter(|p| !matches!(p.as_rule(), Rule::or_op | Rule::and_op))
                .collect();
            if terms.len() == 1 {
                return terms.into_iter().next().map_or_else(|| Ok(Operand::Boolean(false)), operand);
            }
            let mut result = !disjunctive;
            for term in terms {
                let truth = operand(term)?.truth()?;
                if disjunctive && truth {
                    result = true;
                    break;
                }
                if !disjunctive && !truth {
                    result = false;
                    break;
                }
            }
            Ok(Operand::Boolean(result))
        }
        Rule::negation => {
            let mut negations = 0;
            let mut value = None;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::not_op => negations += 1,
                    _ => value = Some(operand(inner)?),
                }
            }
            let value = value.ok_or_else(|| VividError::Evaluation("nothing to negate".into()))?;
            if negations == 0 {
                Ok(value)
            } else {
                Ok(Operand::Boolean(value.truth()? ^ (negations % 2 == 1)))
            }
        }
        Rule::comparison => {
            let mut inner = pair.into_inner();
            let left = inner.next().ok_or_else(|| VividError::Evaluation("empty comparison".into()))?;
            let left = operand(left)?;
            let (Some(op), Some(right)) = (inner.next(), inner.next()) else {
                return Ok(left);
            };
            let right = operand(right)?;
            let holds = match op.as_str() {
                "=" | "==" => left.equals(&right)?,
                "!=" => !left.equals(&right)?,
                ">=" => left.number()? >= right.number()? - FLOAT_EPSILON,
                "<=" => left.number()? <= right.number()? + FLOAT_EPSILON,
                ">" => left.number()? > right.number()? + FLOAT_EPSILON,
                "<" => left.number()? < right.number()? - FLOAT_EPSILON,
                _ => return Err(unexpected(&op)),
            };
            Ok(Operand::Boolean(holds))
        }
        Rule::sum | Rule::product => {
            let mut inner = pair.into_inner();
            let first = inner.next().ok_or_else(|| VividError::Evaluation("empty term".into()))?;
            let first = operand(first)?;
            let mut rest = inner.peekable();
            if rest.peek().is_none() {
                return Ok(first);
            }
            let mut total = first.number()?;
            while let (Some(op), Some(next)) = (rest.next(), rest.next()) {
                let next = operand(next)?.number()?;
                total = match op.as_str() {
                    "+" => total + next,
                    "-" => total - next,
                    "*" => total * next,
                    "/" if next == 0.0 => {
                        return Err(VividError::Evaluation("division by zero".into()));
                    }
                    "/" => total / next,
                    _ => return Err(unexpected(&op)),
                };
            }
            Ok(Operand::Number(total))
        }
        Rule::signed => {
            let mut negative = false;
            let mut signs = 0;
            let mut value = None;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::sign => {
                        signs += 1;
                        negative ^= inner.as_str() == "-";
                    }
                    _ => value = Some(operand(inner)?),
                }
            }
            let value = value.ok_or_else(|| VividError::Evaluation("a sign without a value".into()))?;
            match (signs, negative) {
                (0, _) => Ok(value),
                (_, true) => Ok(Operand::Number(-value.number()?)),
                (_, false) => Ok(Operand::Number(value.number()?)),
            }
        }
        Rule::power => {
            let mut inner = pair.into_inner();
            let base = inner.next().ok_or_else(|| VividError::Evaluation("empty power".into()))?;
            let base = operand(base)?;
            match (inner.next(), inner.next()) {
                (Some(_), Some(exponent)) => {
                    Ok(Operand::Number(base.number()?.powf(operand(exponent)?.number()?)))
                }
                _ => Ok(base),
            }
        }
        Rule::call => {
            let mut inner = pair.into_inner();
            let (Some(function), Some(argument)) = (inner.next(), inner.next()) else {
                return Err(VividError::Evaluation("incomplete function call".into()));
            };
            let x = operand(argument)?.number()?;
            let y = match function.as_str() {
                "sin" => x.sin(),
                "cos" => x.cos(),
                "tan" => x.tan(),
                "abs" => x.abs(),
                "trunc" => x.trunc(),
                "round" => x.round(),
                "sgn" if x > 0.0 => 1.0,
                "sgn" if x < 0.0 => -1.0,
                "sgn" => 0.0,
                _ => return Err(unexpected(&function)),
            };
            Ok(Operand::Number(y))
        }
        Rule::constant => match pair.as_str() {
            "PI" => Ok(Operand::Number(consts::PI)),
            "E" => Ok(Operand::Number(consts::E)),
            "True" => Ok(Operand::Boolean(true)),
            "False" => Ok(Operand::Boolean(false)),
            _ => Err(unexpected(&pair)),
        },
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .map(Operand::Number)
            .map_err(|_| unexpected(&pair)),
        Rule::string => {
            let text = pair.into_inner().next().map(|p| p.as_str().to_string()).unwrap_or_default();
            Ok(Operand::Text(text))
        }
        _ => Err(unexpected(&pair)),
    }
}
