use tracing::trace;

use crate::config::ParseConfig;
use crate::datatype::{Interval, OpaqueObject, ParsedValue, Scalar};
use crate::equivalence::nested_equivalence;
use crate::parse::{collapse, normalize};

// A parsed value set taken apart by kind of member.
struct Components<'a> {
    objects: Vec<&'a OpaqueObject>,
    groups: Vec<&'a [ParsedValue]>,
    scalars: Vec<&'a Scalar>,
    ranges: Vec<Interval>,
}

impl<'a> Components<'a> {
    fn of(values: &'a [ParsedValue]) -> Self {
        let mut components = Components {
            objects: Vec::new(),
            groups: Vec::new(),
            scalars: Vec::new(),
            ranges: Vec::new(),
        };
        for value in values {
            match value {
                ParsedValue::Opaque(object) => components.objects.push(object),
                ParsedValue::Group(inner) => components.groups.push(inner),
                ParsedValue::Scalar(scalar) => components.scalars.push(scalar),
                ParsedValue::Range(interval) => components.ranges.push(*interval),
            }
        }
        components
    }
    fn has_object(&self, object: &OpaqueObject) -> bool {
        self.objects.iter().any(|own| own.matches(object))
    }
    fn has_group(&self, group: &[ParsedValue], config: &ParseConfig) -> bool {
        self.groups
            .iter()
            .any(|own| nested_equivalence(group, own, config, false))
    }
    fn covers_scalar(&self, scalar: &Scalar) -> bool {
        self.scalars.iter().any(|own| *own == scalar)
            || scalar
                .as_number()
                .is_some_and(|n| self.ranges.iter().any(|range| range.contains(n)))
    }
    fn encloses(&self, interval: &Interval) -> bool {
        self.ranges.iter().any(|range| range.encloses(interval))
    }
}

/// Whether every member of `left` is a member of `right`.
pub fn is_subset(left: &[ParsedValue], right: &[ParsedValue], config: &ParseConfig) -> bool {
    let left = normalize(left.to_vec(), config, true);
    let right = normalize(right.to_vec(), config, true);
    subset_of(&left, &right, config)
}

fn subset_of(left: &[ParsedValue], right: &[ParsedValue], config: &ParseConfig) -> bool {
    if left.is_empty() {
        return true;
    }
    if right.is_empty() {
        return false;
    }
    let minuend = Components::of(left);
    let subtrahend = Components::of(right);
    minuend.objects.iter().all(|object| subtrahend.has_object(object))
        && minuend.groups.iter().all(|group| subtrahend.has_group(group, config))
        && minuend.scalars.iter().all(|scalar| subtrahend.covers_scalar(scalar))
        && minuend.ranges.iter().all(|range| subtrahend.encloses(range))
}

/// The members of `left` not in `right`, in canonical form.
///
/// Subtrahend ranges are cut out of minuend ranges up to their endpoints, so
/// `(1, 5) - (5, 10)` leaves `(1, 4)`. A subtrahend scalar splits a range only
/// when it lies strictly inside it: `(1, 10) - 10` is still `(1, 10)`, in line
/// with `is_subset`, where scalars never cover a range. The difference is
/// empty exactly when `left` is a subset of `right`.
pub fn set_difference(
    left: &[ParsedValue],
    right: &[ParsedValue],
    config: &ParseConfig,
) -> Vec<ParsedValue> {
    let left = normalize(left.to_vec(), config, true);
    let right = normalize(right.to_vec(), config, true);
    if subset_of(&left, &right, config) {
        return Vec::new();
    }
    if right.is_empty() {
        return left;
    }
    let minuend = Components::of(&left);
    let subtrahend = Components::of(&right);
    let mut residue: Vec<ParsedValue> = Vec::new();
    residue.extend(
        minuend
            .objects
            .iter()
            .filter(|object| !subtrahend.has_object(object))
            .map(|object| ParsedValue::Opaque((*object).clone())),
    );
    residue.extend(
        minuend
            .groups
            .iter()
            .filter(|group| !subtrahend.has_group(group, config))
            .map(|group| ParsedValue::Group(group.to_vec())),
    );
    residue.extend(
        minuend
            .scalars
            .iter()
            .filter(|scalar| !subtrahend.covers_scalar(scalar))
            .map(|scalar| ParsedValue::Scalar((*scalar).clone())),
    );
    residue.extend(range_difference(
        &minuend.ranges,
        &subtrahend,
        config.float_merge_tolerance,
    ));
    normalize(residue, config, true)
}

fn range_difference(minuend: &[Interval], subtrahend: &Components, df: f64) -> Vec<ParsedValue> {
    let mut pieces: Vec<ParsedValue> = minuend
        .iter()
        .filter(|range| !subtrahend.encloses(range))
        .map(|range| ParsedValue::Range(*range))
        .collect();
    for point in subtrahend.scalars.iter().filter_map(|scalar| scalar.as_number()) {
        pieces = pieces
            .into_iter()
            .flat_map(|piece| match piece {
                ParsedValue::Range(range) if range.strictly_contains(point) => {
                    trace!(%range, %point, "splitting range");
                    let low = range.below(point, df).max(range.low());
                    let high = range.above(point, df).min(range.high());
                    [Interval::bounded(range.low(), low), Interval::bounded(high, range.high())]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                }
                other => vec![other],
            })
            .collect();
    }
    let mut settled = Vec::new();
    let mut work = Vec::new();
    for piece in pieces {
        match piece {
            ParsedValue::Range(range) => work.push(range),
            other => settled.push(other),
        }
    }
    let mut work: Vec<Interval> = collapse(work, df);
    // ranges clear of every subtrahend range stay as they are
    work.retain(|range| {
        let touched = subtrahend.ranges.iter().any(|other| range.overlaps(other));
        if !touched {
            settled.push(ParsedValue::Range(*range));
        }
        touched
    });
    for other in &subtrahend.ranges {
        let mut next = Vec::with_capacity(work.len());
        for range in work {
            for piece in forge(&range, other, df) {
                match piece {
                    ParsedValue::Range(residue) => next.push(residue),
                    degenerate => settled.push(degenerate),
                }
            }
        }
        work = next;
    }
    settled.extend(collapse(work, df).into_iter().map(ParsedValue::Range));
    settled
}

/// Removes `other` from `range`, leaving nothing, one residue on either
/// side, or a residue on both sides.
fn forge(range: &Interval, other: &Interval, df: f64) -> Vec<ParsedValue> {
    if !range.overlaps(other) {
        return vec![ParsedValue::Range(*range)];
    }
    let mut residue = Vec::with_capacity(2);
    if range.low() < other.low() {
        let high = range.below(other.low(), df).max(range.low());
        residue.extend(Interval::bounded(range.low(), high));
    }
    if other.high() < range.high() {
        let low = range.above(other.high(), df).min(range.high());
        residue.extend(Interval::bounded(low, range.high()));
    }
    trace!(%range, %other, pieces = residue.len(), "forged range");
    residue
}
