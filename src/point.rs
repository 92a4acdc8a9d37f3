use std::fmt;
use lazy_static::lazy_static;
use regex::Regex;

use crate::datatype::{FLOAT_EPSILON, ObjectType, OpaqueObject};
use crate::error::{Result, VividError};
use crate::parse::ParseItem;

lazy_static! {
    static ref LITERAL: Regex = Regex::new(r"^\s*P\s*\(([^()]*)\)\s*$").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coordinate {
    At(f64),
    Free,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Coordinate::At(x) => write!(f, "{}", x),
            Coordinate::Free => write!(f, "x"),
        }
    }
}

/// A point in space-time. The free coordinate `x` stands for any value, and
/// a point made only of free coordinates is the generic point of its
/// dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    coordinates: Vec<Coordinate>,
}

impl ObjectType for Point {
    const TAG: &'static str = "point";
    fn dimension(&self) -> usize {
        self.coordinates.len()
    }
    fn is_generic(&self) -> bool {
        self.coordinates.iter().all(|c| *c == Coordinate::Free)
    }
}

impl Point {
    pub fn new(coordinates: impl IntoIterator<Item = f64>) -> Self {
        Self {
            coordinates: coordinates.into_iter().map(Coordinate::At).collect(),
        }
    }
    pub fn generic(dimension: usize) -> Self {
        Self {
            coordinates: vec![Coordinate::Free; dimension],
        }
    }
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }
    /// Reads `P(1, 2.5)` or `P(x, x)`.
    pub fn from_literal(text: &str) -> Option<Point> {
        let captures = LITERAL.captures(text)?;
        let coordinates = captures[1]
            .split(',')
            .map(|c| match c.trim() {
                "x" => Some(Coordinate::Free),
                number => number.parse::<f64>().ok().map(Coordinate::At),
            })
            .collect::<Option<Vec<_>>>()?;
        if coordinates.is_empty() {
            return None;
        }
        Some(Self { coordinates })
    }
    fn located(&self) -> Result<Vec<f64>> {
        self.coordinates
            .iter()
            .map(|c| match c {
                Coordinate::At(x) => Ok(*x),
                Coordinate::Free => Err(VividError::Evaluation(format!(
                    "point {} has free coordinates",
                    self
                ))),
            })
            .collect()
    }
    fn located_with(&self, others: &[&Point]) -> Result<Vec<Vec<f64>>> {
        let mut located = vec![self.located()?];
        for other in others {
            if other.dimension() != self.dimension() {
                return Err(VividError::Type(format!(
                    "points {} and {} differ in dimension",
                    self, other
                )));
            }
            located.push(other.located()?);
        }
        Ok(located)
    }
    /// Whether this point lies on the segment from `a` to `b`.
    pub fn is_on(&self, a: &Point, b: &Point) -> Result<bool> {
        let located = self.located_with(&[a, b])?;
        Ok(on_segment(&located[0], &located[1], &located[2]))
    }
    pub fn not_same_point(&self, other: &Point) -> Result<bool> {
        let located = self.located_with(&[other])?;
        Ok(located[0]
            .iter()
            .zip(&located[1])
            .any(|(p, q)| (p - q).abs() > FLOAT_EPSILON))
    }
    /// The first coordinate is the clock reading.
    pub fn clocks_unequal(&self, other: &Point) -> Result<bool> {
        let located = self.located_with(&[other])?;
        match (located[0].first(), located[1].first()) {
            (Some(p), Some(q)) => Ok((p - q).abs() > FLOAT_EPSILON),
            _ => Ok(false),
        }
    }
    /// Whether the worldlines `a1..a2` and `b1..b2` meet at this point.
    pub fn meets(&self, a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> Result<bool> {
        let located = self.located_with(&[a1, a2, b1, b2])?;
        Ok(on_segment(&located[0], &located[1], &located[2])
            && on_segment(&located[0], &located[3], &located[4]))
    }
}

fn on_segment(p: &[f64], a: &[f64], b: &[f64]) -> bool {
    let direction: Vec<f64> = b.iter().zip(a).map(|(b, a)| b - a).collect();
    let offset: Vec<f64> = p.iter().zip(a).map(|(p, a)| p - a).collect();
    let length = dot(&direction, &direction);
    if length <= FLOAT_EPSILON {
        return dot(&offset, &offset).sqrt() <= FLOAT_EPSILON;
    }
    let t = dot(&offset, &direction) / length;
    let residual: f64 = offset
        .iter()
        .zip(&direction)
        .map(|(o, d)| (o - t * d).powi(2))
        .sum();
    residual.sqrt() <= 1e-6 && (-FLOAT_EPSILON..=1.0 + FLOAT_EPSILON).contains(&t)
}

fn dot(u: &[f64], v: &[f64]) -> f64 {
    u.iter().zip(v).map(|(a, b)| a * b).sum()
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let coordinates: Vec<String> = self.coordinates.iter().map(ToString::to_string).collect();
        write!(f, "P({})", coordinates.join(", "))
    }
}

impl From<Point> for OpaqueObject {
    fn from(point: Point) -> Self {
        OpaqueObject::new(point)
    }
}
impl From<Point> for ParseItem {
    fn from(point: Point) -> Self {
        ParseItem::Object(OpaqueObject::new(point))
    }
}

/// Literal constructor registered for the point kind.
pub fn literal(text: &str) -> Option<OpaqueObject> {
    Point::from_literal(text).map(OpaqueObject::new)
}

// ------------- Geometric relations -------------
/// Relation bodies that are a single call to one of these functions are
/// computed on points directly instead of going through the evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Geometric {
    IsOn,
    NotSamePoint,
    ClocksUnequal,
    Meets,
}

impl Geometric {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "is_on" => Some(Geometric::IsOn),
            "not_same_point" => Some(Geometric::NotSamePoint),
            "clocks_unequal" => Some(Geometric::ClocksUnequal),
            "meets" => Some(Geometric::Meets),
            _ => None,
        }
    }
    pub fn name(&self) -> &'static str {
        match self {
            Geometric::IsOn => "is_on",
            Geometric::NotSamePoint => "not_same_point",
            Geometric::ClocksUnequal => "clocks_unequal",
            Geometric::Meets => "meets",
        }
    }
    pub fn arity(&self) -> usize {
        match self {
            Geometric::IsOn => 3,
            Geometric::NotSamePoint | Geometric::ClocksUnequal => 2,
            Geometric::Meets => 5,
        }
    }
    pub fn holds(&self, points: &[&Point]) -> Result<bool> {
        if points.len() != self.arity() {
            return Err(VividError::Cardinality(format!(
                "{} takes {} points, got {}",
                self.name(),
                self.arity(),
                points.len()
            )));
        }
        match self {
            Geometric::IsOn => points[0].is_on(points[1], points[2]),
            Geometric::NotSamePoint => points[0].not_same_point(points[1]),
            Geometric::ClocksUnequal => points[0].clocks_unequal(points[1]),
            Geometric::Meets => points[0].meets(points[1], points[2], points[3], points[4]),
        }
    }
}

impl fmt::Display for Geometric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
