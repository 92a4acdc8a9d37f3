// used to compare numbers across their integer and float forms
use std::cmp::Ordering;
// used to print out readable forms of a data type
use std::fmt;
// used to recover the concrete type behind an opaque object
use std::any::Any;
// opaque objects are shared, never taken apart
use std::sync::Arc;

/// Slack used whenever two floats are compared for equality or adjacency.
pub const FLOAT_EPSILON: f64 = 1e-9;

// ------------- Number -------------
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }
    pub fn to_float(self) -> Number {
        Number::Float(self.as_f64())
    }
    pub fn min(self, other: Number) -> Number {
        if other < self { other } else { self }
    }
    pub fn max(self, other: Number) -> Number {
        if other > self { other } else { self }
    }
}
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            _ => (self.as_f64() - other.as_f64()).abs() <= FLOAT_EPSILON,
        }
    }
}
impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            _ if self == other => Some(Ordering::Equal),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{:?}", x),
        }
    }
}
impl From<i32> for Number {
    fn from(i: i32) -> Self { Number::Int(i as i64) }
}
impl From<i64> for Number {
    fn from(i: i64) -> Self { Number::Int(i) }
}
impl From<f64> for Number {
    fn from(x: f64) -> Self { Number::Float(x) }
}

// ------------- Scalar -------------
#[derive(Clone, Debug)]
pub enum Scalar {
    Bool(bool),
    Number(Number),
    Str(String),
}

impl Scalar {
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }
}
// Booleans are not numbers here, so True and 1 stay distinct values.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Number(a), Scalar::Number(b)) => a == b,
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            _ => false,
        }
    }
}
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Bool(true) => write!(f, "True"),
            Scalar::Bool(false) => write!(f, "False"),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Str(s) => write!(f, "'{}'", s),
        }
    }
}
impl From<Number> for Scalar {
    fn from(n: Number) -> Self { Scalar::Number(n) }
}
impl From<i32> for Scalar {
    fn from(i: i32) -> Self { Scalar::Number(i.into()) }
}
impl From<i64> for Scalar {
    fn from(i: i64) -> Self { Scalar::Number(i.into()) }
}
impl From<f64> for Scalar {
    fn from(x: f64) -> Self { Scalar::Number(x.into()) }
}
impl From<bool> for Scalar {
    fn from(b: bool) -> Self { Scalar::Bool(b) }
}
impl From<&str> for Scalar {
    fn from(s: &str) -> Self { Scalar::Str(s.to_string()) }
}
impl From<String> for Scalar {
    fn from(s: String) -> Self { Scalar::Str(s) }
}

// ------------- Interval -------------
/// An inclusive numeric range with `low < high`. Both bounds are floats as
/// soon as either of them is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    low: Number,
    high: Number,
}

impl Interval {
    pub fn new(low: Number, high: Number) -> Option<Interval> {
        match Interval::bounded(low, high)? {
            ParsedValue::Range(interval) => Some(interval),
            _ => None,
        }
    }
    /// The value covering `low..=high`: a range, a bare scalar when the
    /// bounds coincide, or nothing when they are reversed.
    pub fn bounded(low: Number, high: Number) -> Option<ParsedValue> {
        let (low, high) = if low.is_float() || high.is_float() {
            (low.to_float(), high.to_float())
        } else {
            (low, high)
        };
        match low.partial_cmp(&high)? {
            Ordering::Less => Some(ParsedValue::Range(Interval { low, high })),
            Ordering::Equal => Some(ParsedValue::Scalar(Scalar::Number(low))),
            Ordering::Greater => None,
        }
    }
    pub fn low(&self) -> Number {
        self.low
    }
    pub fn high(&self) -> Number {
        self.high
    }
    pub fn is_float(&self) -> bool {
        self.low.is_float()
    }
    pub fn contains(&self, n: Number) -> bool {
        self.low <= n && n <= self.high
    }
    pub fn strictly_contains(&self, n: Number) -> bool {
        self.low < n && n < self.high
    }
    pub fn encloses(&self, other: &Interval) -> bool {
        self.low <= other.low && other.high <= self.high
    }
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.low <= other.high && other.low <= self.high
    }
    /// Overlapping, or adjacent by one unit (integers) or by the float
    /// differential (as soon as a float is involved).
    pub fn reaches(&self, other: &Interval, df: f64) -> bool {
        let unit = if self.is_float() || other.is_float() { df } else { 1.0 };
        other.low.as_f64() <= self.high.as_f64() + unit + FLOAT_EPSILON
            && self.low.as_f64() <= other.high.as_f64() + unit + FLOAT_EPSILON
    }
    /// Whether the scalar lies inside the range or one step outside of it.
    pub fn absorbs(&self, n: Number, df: f64) -> bool {
        let unit = if self.is_float() || n.is_float() { df } else { 1.0 };
        n.as_f64() >= self.low.as_f64() - unit - FLOAT_EPSILON
            && n.as_f64() <= self.high.as_f64() + unit + FLOAT_EPSILON
    }
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval::coerced(self.low.min(other.low), self.high.max(other.high))
    }
    pub fn extended_to(&self, n: Number) -> Interval {
        let low = if n < self.low { n } else { self.low };
        let high = if n > self.high { n } else { self.high };
        Interval::coerced(low, high)
    }
    /// The largest point of this range's kind lying strictly below `x`.
    pub fn below(&self, x: Number, df: f64) -> Number {
        if self.is_float() {
            return Number::Float(x.as_f64() - df);
        }
        match x {
            Number::Int(i) => Number::Int(i - 1),
            Number::Float(f) => Number::Int(f.ceil() as i64 - 1),
        }
    }
    /// The smallest point of this range's kind lying strictly above `x`.
    pub fn above(&self, x: Number, df: f64) -> Number {
        if self.is_float() {
            return Number::Float(x.as_f64() + df);
        }
        match x {
            Number::Int(i) => Number::Int(i + 1),
            Number::Float(f) => Number::Int(f.floor() as i64 + 1),
        }
    }
    /// Every discrete value covered: a step of one for integer ranges and
    /// the float differential for float ranges.
    pub fn points(&self, df: f64) -> Vec<Number> {
        match (self.low, self.high) {
            (Number::Int(low), Number::Int(high)) => (low..=high).map(Number::Int).collect(),
            _ => {
                let (low, high) = (self.low.as_f64(), self.high.as_f64());
                let steps = ((high - low) / df + FLOAT_EPSILON).floor() as usize;
                let mut points: Vec<Number> = (0..=steps)
                    .map(|i| Number::Float(low + i as f64 * df))
                    .collect();
                if let Some(last) = points.last() {
                    if (high - last.as_f64()).abs() > FLOAT_EPSILON {
                        points.push(Number::Float(high));
                    }
                }
                points
            }
        }
    }
    fn coerced(low: Number, high: Number) -> Interval {
        if low.is_float() || high.is_float() {
            Interval { low: low.to_float(), high: high.to_float() }
        } else {
            Interval { low, high }
        }
    }
}
impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.low, self.high)
    }
}

// ------------- Opaque objects -------------
pub trait ObjectType: fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static {
    // static stuff which needs to be implemented downstream
    const TAG: &'static str;
    fn dimension(&self) -> usize;
    // instance callable with pre-made implementation
    fn is_generic(&self) -> bool {
        false
    }
}

// Object safe face of ObjectType, so that differently typed objects can
// live side by side in one value set.
trait Object: fmt::Debug + fmt::Display + Send + Sync {
    fn tag(&self) -> &'static str;
    fn dimension(&self) -> usize;
    fn is_generic(&self) -> bool;
    fn same_as(&self, other: &dyn Object) -> bool;
    fn as_any(&self) -> &dyn Any;
}
impl<T: ObjectType> Object for T {
    fn tag(&self) -> &'static str {
        T::TAG
    }
    fn dimension(&self) -> usize {
        ObjectType::dimension(self)
    }
    fn is_generic(&self) -> bool {
        ObjectType::is_generic(self)
    }
    fn same_as(&self, other: &dyn Object) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| o == self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone)]
pub struct OpaqueObject(Arc<dyn Object>);

impl OpaqueObject {
    pub fn new<T: ObjectType>(object: T) -> Self {
        Self(Arc::new(object))
    }
    pub fn tag(&self) -> &'static str {
        self.0.tag()
    }
    pub fn dimension(&self) -> usize {
        self.0.dimension()
    }
    pub fn is_generic(&self) -> bool {
        self.0.is_generic()
    }
    pub fn downcast_ref<T: ObjectType>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
    /// Equal objects match, and a generic object matches every object of
    /// its own kind and dimension.
    pub fn matches(&self, other: &OpaqueObject) -> bool {
        self == other
            || ((self.is_generic() || other.is_generic())
                && self.tag() == other.tag()
                && self.dimension() == other.dimension())
    }
}
impl PartialEq for OpaqueObject {
    fn eq(&self, other: &Self) -> bool {
        self.0.same_as(&*other.0)
    }
}
impl fmt::Debug for OpaqueObject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
impl fmt::Display for OpaqueObject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ------------- Parsed values -------------
/// The canonical unit produced by the parser.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedValue {
    Scalar(Scalar),
    Range(Interval),
    Group(Vec<ParsedValue>),
    Opaque(OpaqueObject),
}

impl ParsedValue {
    pub fn as_number(&self) -> Option<Number> {
        match self {
            ParsedValue::Scalar(scalar) => scalar.as_number(),
            _ => None,
        }
    }
    pub fn is_range(&self) -> bool {
        matches!(self, ParsedValue::Range(_))
    }
    /// Nesting depth: zero for anything that is not a group.
    pub fn depth(&self) -> usize {
        match self {
            ParsedValue::Group(values) => 1 + depth_of(values),
            _ => 0,
        }
    }
}

pub fn depth_of(values: &[ParsedValue]) -> usize {
    values.iter().map(ParsedValue::depth).max().unwrap_or(0)
}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParsedValue::Scalar(scalar) => write!(f, "{}", scalar),
            ParsedValue::Range(interval) => write!(f, "{}", interval),
            ParsedValue::Group(values) => {
                let inner: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{{{}}}", inner.join(", "))
            }
            ParsedValue::Opaque(object) => write!(f, "{}", object),
        }
    }
}
impl From<Scalar> for ParsedValue {
    fn from(scalar: Scalar) -> Self { ParsedValue::Scalar(scalar) }
}
impl From<Interval> for ParsedValue {
    fn from(interval: Interval) -> Self { ParsedValue::Range(interval) }
}
impl From<OpaqueObject> for ParsedValue {
    fn from(object: OpaqueObject) -> Self { ParsedValue::Opaque(object) }
}
