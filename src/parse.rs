// used to recognize numeric and quoted tokens in value-set literals
use regex::Regex;
use lazy_static::lazy_static;
use serde_json::Value as Json;
use std::cmp::Ordering;
use tracing::trace;

use crate::config::ParseConfig;
use crate::datatype::{Interval, Number, OpaqueObject, ParsedValue, Scalar};
use crate::equivalence::nested_equivalence;
use crate::error::{Result, VividError};

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"^[+-]?\d+$").unwrap();
    static ref FLOAT: Regex = Regex::new(r"^[+-]?(\d+\.\d*|\.\d+|\d+)([eE][+-]?\d+)?$").unwrap();
    static ref QUOTED: Regex = Regex::new(r#"^(?:'([^']*)'|"([^"]*)")$"#).unwrap();
}

const ELLIPSIS: &str = "...";
const OPENERS: [char; 3] = ['{', '(', '['];
const BRACKETS: [char; 6] = ['{', '}', '(', ')', '[', ']'];

/// One raw member of a value set before normalization.
#[derive(Clone, Debug)]
pub enum ParseItem {
    Scalar(Scalar),
    Pair(Number, Number),
    List(Vec<ParseItem>),
    Object(OpaqueObject),
}

impl From<Scalar> for ParseItem {
    fn from(scalar: Scalar) -> Self { ParseItem::Scalar(scalar) }
}
impl From<i32> for ParseItem {
    fn from(i: i32) -> Self { ParseItem::Scalar(i.into()) }
}
impl From<i64> for ParseItem {
    fn from(i: i64) -> Self { ParseItem::Scalar(i.into()) }
}
impl From<f64> for ParseItem {
    fn from(x: f64) -> Self { ParseItem::Scalar(x.into()) }
}
impl From<bool> for ParseItem {
    fn from(b: bool) -> Self { ParseItem::Scalar(b.into()) }
}
impl From<&str> for ParseItem {
    fn from(s: &str) -> Self { ParseItem::Scalar(s.into()) }
}
impl From<String> for ParseItem {
    fn from(s: String) -> Self { ParseItem::Scalar(s.into()) }
}
impl From<OpaqueObject> for ParseItem {
    fn from(object: OpaqueObject) -> Self { ParseItem::Object(object) }
}
impl<A: Into<Number>, B: Into<Number>> From<(A, B)> for ParseItem {
    fn from((low, high): (A, B)) -> Self { ParseItem::Pair(low.into(), high.into()) }
}
impl<T: Into<ParseItem>> From<Vec<T>> for ParseItem {
    fn from(items: Vec<T>) -> Self { ParseItem::List(items.into_iter().map(Into::into).collect()) }
}
impl From<&ParsedValue> for ParseItem {
    fn from(value: &ParsedValue) -> Self {
        match value {
            ParsedValue::Scalar(scalar) => ParseItem::Scalar(scalar.clone()),
            ParsedValue::Range(interval) => ParseItem::Pair(interval.low(), interval.high()),
            ParsedValue::Group(values) => ParseItem::List(values.iter().map(ParseItem::from).collect()),
            ParsedValue::Opaque(object) => ParseItem::Object(object.clone()),
        }
    }
}

/// Parses raw items into the canonical form of a value set: ranges merged
/// and sorted first, then scalars, groups and objects in order of first
/// appearance with duplicates removed.
pub fn parse(items: &[ParseItem], config: &ParseConfig) -> Result<Vec<ParsedValue>> {
    config.validate()?;
    let values = items
        .iter()
        .map(|item| classify(item, config, 0))
        .collect::<Result<Vec<_>>>()?;
    Ok(normalize(values, config, true))
}

/// Parses a JSON array; nested arrays are groups and strings follow the
/// literal mini-language.
pub fn parse_json(value: &Json, config: &ParseConfig) -> Result<Vec<ParsedValue>> {
    match value {
        Json::Array(items) => {
            let items = items.iter().map(item_from_json).collect::<Result<Vec<_>>>()?;
            parse(&items, config)
        }
        other => Err(VividError::Type(format!(
            "a value set must be a list, found {}",
            json_kind(other)
        ))),
    }
}

pub fn item_from_json(value: &Json) -> Result<ParseItem> {
    match value {
        Json::Bool(b) => Ok(ParseItem::from(*b)),
        Json::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(ParseItem::from(i)),
            (None, Some(x)) => Ok(ParseItem::from(x)),
            _ => Err(VividError::Type(format!("unsupported number {}", n))),
        },
        Json::String(s) => Ok(ParseItem::from(s.as_str())),
        Json::Array(items) => Ok(ParseItem::List(
            items.iter().map(item_from_json).collect::<Result<Vec<_>>>()?,
        )),
        other => Err(VividError::Type(format!(
            "{} is not a valid value-set member",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "a list",
        Json::Object(_) => "a dictionary",
    }
}

// ------------- Classification -------------
fn classify(item: &ParseItem, config: &ParseConfig, depth: usize) -> Result<ParsedValue> {
    match item {
        ParseItem::Scalar(Scalar::Str(text)) => classify_text(text, config, depth),
        ParseItem::Scalar(scalar) => Ok(ParsedValue::Scalar(scalar.clone())),
        ParseItem::Pair(low, high) => Interval::bounded(*low, *high).ok_or_else(|| {
            VividError::malformed(
                "the low bound exceeds the high bound",
                format!("({}, {})", low, high),
            )
        }),
        ParseItem::List(items) => {
            let values = items
                .iter()
                .map(|item| classify(item, config, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            Ok(ParsedValue::Group(normalize(values, config, false)))
        }
        ParseItem::Object(object) => {
            if config.registry.recognizes(object.tag()) {
                Ok(ParsedValue::Opaque(object.clone()))
            } else {
                Err(VividError::Type(format!(
                    "object type '{}' is not registered",
                    object.tag()
                )))
            }
        }
    }
}

fn classify_text(text: &str, config: &ParseConfig, depth: usize) -> Result<ParsedValue> {
    let trimmed = text.trim();
    if trimmed.starts_with(OPENERS) {
        parse_grouping(trimmed, config, depth)
    } else if trimmed.contains(ELLIPSIS) && trimmed.contains(',') {
        parse_ellipsis(trimmed)
    } else if let Some(object) = config.registry.from_literal(trimmed) {
        Ok(ParsedValue::Opaque(object))
    } else {
        Ok(ParsedValue::Scalar(Scalar::Str(text.to_string())))
    }
}

fn closer(open: char) -> char {
    match open {
        '{' => '}',
        '(' => ')',
        _ => ']',
    }
}

fn parse_grouping(text: &str, config: &ParseConfig, depth: usize) -> Result<ParsedValue> {
    let open = text.chars().next().unwrap_or_default();
    let close = closer(open);
    if text.len() < 2 || !text.ends_with(close) {
        return Err(VividError::malformed("mismatched grouping characters", text));
    }
    let inner = text[1..text.len() - 1].trim();
    let shape = structural(inner)
        .ok_or_else(|| VividError::malformed("an unterminated quote or literal call", text))?;
    if let Some(stranger) = shape
        .iter()
        .map(|&(_, c)| c)
        .find(|c| BRACKETS.contains(c) && *c != open && *c != close)
    {
        return Err(VividError::malformed(
            format!("'{}' mixed into a '{}{}' grouping", stranger, open, close),
            text,
        ));
    }
    if inner.is_empty() {
        return if depth == 0 {
            Ok(ParsedValue::Group(Vec::new()))
        } else {
            Err(VividError::malformed("empty nested grouping", text))
        };
    }
    let tokens = split_top_level(inner, open, close)
        .ok_or_else(|| VividError::malformed("unbalanced grouping characters", text))?;
    if tokens.iter().any(|token| token.is_empty()) {
        return Err(VividError::malformed("empty element", text));
    }
    let elements = group_elements(&tokens, open, config, depth, text)?;
    Ok(ParsedValue::Group(normalize(elements, config, false)))
}

// The characters that give a grouping its shape, with their byte offsets.
// Quoted elements and the arguments of literal calls such as `P(1, 2)` are
// skipped. `None` when a quote or a call is left open.
fn structural(inner: &str) -> Option<Vec<(usize, char)>> {
    let mut shape = Vec::new();
    let mut quote: Option<char> = None;
    let mut call_depth = 0usize;
    let mut previous: Option<char> = None;
    for (i, c) in inner.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
        } else if matches!(c, '\'' | '"')
            && previous.is_none_or(|p| p == ',' || BRACKETS.contains(&p))
        {
            // only a quote opening an element starts quoted text
            quote = Some(c);
        } else if c == '('
            && (call_depth > 0 || previous.is_some_and(|p| p.is_alphanumeric() || p == '_'))
        {
            call_depth += 1;
        } else if call_depth > 0 {
            if c == ')' {
                call_depth -= 1;
            }
        } else {
            shape.push((i, c));
        }
        if !c.is_whitespace() {
            previous = Some(c);
        }
    }
    (quote.is_none() && call_depth == 0).then_some(shape)
}

fn split_top_level(inner: &str, open: char, close: char) -> Option<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in structural(inner)? {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return None;
            }
        } else if c == ',' && depth == 0 {
            tokens.push(inner[start..i].trim());
            start = i + 1;
        }
    }
    if depth != 0 {
        return None;
    }
    tokens.push(inner[start..].trim());
    Some(tokens)
}

fn group_elements(
    tokens: &[&str],
    open: char,
    config: &ParseConfig,
    depth: usize,
    literal: &str,
) -> Result<Vec<ParsedValue>> {
    if tokens.first() == Some(&ELLIPSIS) || tokens.last() == Some(&ELLIPSIS) {
        return Err(VividError::malformed(
            "an ellipsis at the boundary describes an infinite set",
            literal,
        ));
    }
    let mut elements = Vec::with_capacity(tokens.len());
    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index];
        if token.starts_with(open) {
            elements.push(parse_grouping(token, config, depth + 1)?);
        } else if tokens.get(index + 1) == Some(&ELLIPSIS) {
            let mut bounds = vec![numeric_token(token, literal)?];
            while tokens.get(index + 1) == Some(&ELLIPSIS) {
                bounds.push(numeric_token(tokens[index + 2], literal)?);
                index += 2;
            }
            elements.push(span(&bounds, literal)?);
        } else if token == ELLIPSIS {
            return Err(VividError::malformed(
                "an ellipsis must stand between two numbers",
                literal,
            ));
        } else {
            elements.push(literal_token(token, config));
        }
        index += 1;
    }
    Ok(elements)
}

fn parse_ellipsis(text: &str) -> Result<ParsedValue> {
    let tokens: Vec<&str> = text.split(',').map(str::trim).collect();
    if tokens.iter().any(|token| token.is_empty()) {
        return Err(VividError::malformed("empty element", text));
    }
    if tokens.first() == Some(&ELLIPSIS) || tokens.last() == Some(&ELLIPSIS) {
        return Err(VividError::malformed(
            "an ellipsis at the boundary describes an infinite set",
            text,
        ));
    }
    if tokens.windows(2).any(|pair| pair[0] == ELLIPSIS && pair[1] == ELLIPSIS) {
        return Err(VividError::malformed("consecutive ellipses", text));
    }
    let bounds = tokens
        .iter()
        .filter(|token| **token != ELLIPSIS)
        .map(|token| numeric_token(token, text))
        .collect::<Result<Vec<_>>>()?;
    span(&bounds, text)
}

fn span(bounds: &[Number], literal: &str) -> Result<ParsedValue> {
    let low = bounds.iter().copied().reduce(Number::min);
    let high = bounds.iter().copied().reduce(Number::max);
    low.zip(high)
        .and_then(|(low, high)| Interval::bounded(low, high))
        .ok_or_else(|| VividError::malformed("an ellipsis needs numeric bounds", literal))
}

fn number_token(token: &str) -> Option<Number> {
    if INTEGER.is_match(token) {
        token.parse::<i64>().ok().map(Number::Int)
    } else if FLOAT.is_match(token) {
        token.parse::<f64>().ok().map(Number::Float)
    } else {
        None
    }
}

fn numeric_token(token: &str, literal: &str) -> Result<Number> {
    number_token(token).ok_or_else(|| {
        VividError::malformed(format!("'{}' is not a number", token), literal)
    })
}

fn literal_token(token: &str, config: &ParseConfig) -> ParsedValue {
    if let Some(number) = number_token(token) {
        return ParsedValue::Scalar(Scalar::Number(number));
    }
    match token {
        "True" | "true" => return ParsedValue::Scalar(Scalar::Bool(true)),
        "False" | "false" => return ParsedValue::Scalar(Scalar::Bool(false)),
        _ => {}
    }
    if let Some(captures) = QUOTED.captures(token) {
        let text = captures.get(1).or_else(|| captures.get(2)).map_or("", |m| m.as_str());
        return ParsedValue::Scalar(Scalar::Str(text.to_string()));
    }
    match config.registry.from_literal(token) {
        Some(object) => ParsedValue::Opaque(object),
        None => ParsedValue::Scalar(Scalar::Str(token.to_string())),
    }
}

// ------------- Normalization -------------
/// Brings one level of parsed values into canonical form. Groups are left
/// as they are, except in flatten mode where their contents are hoisted.
pub(crate) fn normalize(
    values: Vec<ParsedValue>,
    config: &ParseConfig,
    dedupe: bool,
) -> Vec<ParsedValue> {
    let values = if config.flatten_nested_groups {
        flatten(values)
    } else {
        values
    };
    let df = config.float_merge_tolerance;
    let mut ranges = Vec::new();
    let mut others = Vec::new();
    for value in values {
        match value {
            ParsedValue::Range(interval) => ranges.push(interval),
            other => others.push(other),
        }
    }
    loop {
        ranges = collapse(ranges, df);
        if !absorb(&mut ranges, &mut others, df) {
            break;
        }
    }
    if dedupe {
        others = deduplicate(others, config);
    }
    ranges.sort_by(|a, b| a.low().partial_cmp(&b.low()).unwrap_or(Ordering::Equal));
    ranges
        .into_iter()
        .map(ParsedValue::Range)
        .chain(others)
        .collect()
}

/// Merges overlapping or adjacent ranges until none are left.
pub(crate) fn collapse(mut ranges: Vec<Interval>, df: f64) -> Vec<Interval> {
    'scan: loop {
        for i in 0..ranges.len() {
            for j in (i + 1)..ranges.len() {
                if ranges[i].reaches(&ranges[j], df) {
                    let merged = ranges[i].hull(&ranges[j]);
                    trace!(left = %ranges[i], right = %ranges[j], %merged, "collapsing ranges");
                    ranges.swap_remove(j);
                    ranges[i] = merged;
                    continue 'scan;
                }
            }
        }
        return ranges;
    }
}

// A range takes in every numeric scalar lying inside it or one step away.
fn absorb(ranges: &mut [Interval], others: &mut Vec<ParsedValue>, df: f64) -> bool {
    let mut absorbed = false;
    others.retain(|value| {
        let Some(number) = value.as_number() else {
            return true;
        };
        match ranges.iter_mut().find(|range| range.absorbs(number, df)) {
            Some(range) => {
                *range = range.extended_to(number);
                absorbed = true;
                false
            }
            None => true,
        }
    });
    absorbed
}

fn deduplicate(values: Vec<ParsedValue>, config: &ParseConfig) -> Vec<ParsedValue> {
    let mut kept: Vec<ParsedValue> = Vec::with_capacity(values.len());
    for value in values {
        let duplicate = kept.iter().any(|seen| match (seen, &value) {
            (ParsedValue::Group(a), ParsedValue::Group(b)) => nested_equivalence(a, b, config, false),
            (a, b) => a == b,
        });
        if !duplicate {
            kept.push(value);
        }
    }
    kept
}

fn flatten(values: Vec<ParsedValue>) -> Vec<ParsedValue> {
    let mut flat = Vec::with_capacity(values.len());
    for value in values {
        match value {
            ParsedValue::Group(inner) => flat.extend(flatten(inner)),
            other => flat.push(other),
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_only_at_top_level_commas() {
        let tokens = split_top_level("1, {2, 3}, 4", '{', '}').expect("balanced");
        assert_eq!(tokens, vec!["1", "{2, 3}", "4"]);
        assert!(split_top_level("1}, {2", '{', '}').is_none());
    }

    #[test]
    fn quotes_and_calls_are_not_split() {
        let tokens = split_top_level("'a, b', P(1, 2), \"}\", c", '{', '}').expect("balanced");
        assert_eq!(tokens, vec!["'a, b'", "P(1, 2)", "\"}\"", "c"]);
        // an apostrophe inside a word is plain text
        assert_eq!(split_top_level("it's, b", '{', '}').expect("balanced"), vec!["it's", "b"]);
        assert!(split_top_level("'a, b", '{', '}').is_none());
        assert!(split_top_level("P(1, 2", '{', '}').is_none());
    }

    #[test]
    fn literal_tokens() {
        let config = ParseConfig::default();
        assert_eq!(literal_token("7", &config), ParsedValue::Scalar(Scalar::Number(Number::Int(7))));
        assert_eq!(literal_token("2.5", &config), ParsedValue::Scalar(Scalar::Number(Number::Float(2.5))));
        assert_eq!(literal_token("true", &config), ParsedValue::Scalar(Scalar::Bool(true)));
        assert_eq!(literal_token("'a b'", &config), ParsedValue::Scalar(Scalar::Str("a b".into())));
        assert_eq!(literal_token("abc", &config), ParsedValue::Scalar(Scalar::Str("abc".into())));
    }

    #[test]
    fn collapse_reaches_fixpoint() {
        let ranges = vec![
            Interval::new(Number::Int(1), Number::Int(3)).expect("range"),
            Interval::new(Number::Int(7), Number::Int(9)).expect("range"),
            Interval::new(Number::Int(4), Number::Int(6)).expect("range"),
        ];
        let collapsed = collapse(ranges, 0.1);
        assert_eq!(collapsed, vec![Interval::new(Number::Int(1), Number::Int(9)).expect("range")]);
    }
}
