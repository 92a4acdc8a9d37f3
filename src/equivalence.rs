use crate::config::ParseConfig;
use crate::datatype::{depth_of, FLOAT_EPSILON, Number, ParsedValue};
use crate::parse::normalize;

/// Deep, order independent equality of two parsed structures.
///
/// Both sides are normalized without removing duplicates, so that two
/// equivalent groups on one side still have to be matched by two groups on
/// the other. With `shrink`, singleton groups wrapping the whole input are
/// peeled off first, making `[[[x]]]` equivalent to `[x]`.
///
/// Numeric content is compared as the set of points it covers, so the
/// scalars `1, 2, 3` are equivalent to the range `(1, 3)`. Strings,
/// booleans and objects must pair off one to one. Groups must pair off by a
/// perfect matching of recursively equivalent groups. The recursion always
/// descends into strictly smaller groups, so it terminates.
pub fn nested_equivalence(
    left: &[ParsedValue],
    right: &[ParsedValue],
    config: &ParseConfig,
    shrink: bool,
) -> bool {
    let mut left = normalize(left.to_vec(), config, false);
    let mut right = normalize(right.to_vec(), config, false);
    if shrink {
        left = unwrap_singletons(left);
        right = unwrap_singletons(right);
    }
    equivalent_levels(&left, &right)
}

fn unwrap_singletons(mut values: Vec<ParsedValue>) -> Vec<ParsedValue> {
    while values.len() == 1 && matches!(values[0], ParsedValue::Group(_)) {
        match values.pop() {
            Some(ParsedValue::Group(inner)) => values = inner,
            _ => break,
        }
    }
    values
}

fn equivalent_levels(left: &[ParsedValue], right: &[ParsedValue]) -> bool {
    if depth_of(left) != depth_of(right) {
        return false;
    }
    let (left_groups, left_flat) = split(left);
    let (right_groups, right_flat) = split(right);
    same_cover(&cover(&left_flat), &cover(&right_flat))
        && pair_off(&left_flat, &right_flat)
        && groups_equivalent(&left_groups, &right_groups)
}

fn split(values: &[ParsedValue]) -> (Vec<&[ParsedValue]>, Vec<&ParsedValue>) {
    let mut groups = Vec::new();
    let mut flat = Vec::new();
    for value in values {
        match value {
            ParsedValue::Group(inner) => groups.push(inner.as_slice()),
            other => flat.push(other),
        }
    }
    (groups, flat)
}

// ------------- Numeric cover -------------
#[derive(Clone, Copy, Debug)]
struct Piece {
    low: f64,
    high: f64,
    integral: bool,
}

fn cover(values: &[&ParsedValue]) -> Vec<Piece> {
    let mut pieces: Vec<Piece> = values
        .iter()
        .filter_map(|value| match value {
            ParsedValue::Range(interval) => Some(Piece {
                low: interval.low().as_f64(),
                high: interval.high().as_f64(),
                integral: !interval.is_float(),
            }),
            ParsedValue::Scalar(_) => value.as_number().map(|n| Piece {
                low: n.as_f64(),
                high: n.as_f64(),
                integral: matches!(n, Number::Int(_)),
            }),
            _ => None,
        })
        .collect();
    pieces.sort_by(|a, b| a.low.total_cmp(&b.low));
    let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match merged.last_mut() {
            Some(last)
                if piece.low <= last.high + FLOAT_EPSILON
                    || (last.integral
                        && piece.integral
                        && (piece.low - last.high - 1.0).abs() <= FLOAT_EPSILON) =>
            {
                last.high = last.high.max(piece.high);
                last.integral &= piece.integral;
            }
            _ => merged.push(piece),
        }
    }
    merged
}

fn same_cover(left: &[Piece], right: &[Piece]) -> bool {
    left.len() == right.len()
        && left.iter().zip(right).all(|(a, b)| {
            (a.low - b.low).abs() <= FLOAT_EPSILON && (a.high - b.high).abs() <= FLOAT_EPSILON
        })
}

// Everything flat that is not a number: strings, booleans and objects.
fn pair_off(left: &[&ParsedValue], right: &[&ParsedValue]) -> bool {
    let mut unmatched: Vec<&ParsedValue> = right
        .iter()
        .copied()
        .filter(|value| value.as_number().is_none() && !value.is_range())
        .collect();
    for value in left
        .iter()
        .filter(|value| value.as_number().is_none() && !value.is_range())
    {
        match unmatched.iter().position(|other| other == value) {
            Some(i) => {
                unmatched.swap_remove(i);
            }
            None => return false,
        }
    }
    unmatched.is_empty()
}

// ------------- Group matching -------------
fn groups_equivalent(left: &[&[ParsedValue]], right: &[&[ParsedValue]]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let edges: Vec<Vec<usize>> = left
        .iter()
        .map(|l| {
            right
                .iter()
                .enumerate()
                .filter(|(_, r)| equivalent_levels(l, r))
                .map(|(j, _)| j)
                .collect()
        })
        .collect();
    let mut owner: Vec<Option<usize>> = vec![None; right.len()];
    (0..left.len()).all(|i| {
        let mut seen = vec![false; right.len()];
        augment(i, &edges, &mut owner, &mut seen)
    })
}

// Kuhn's augmenting path step of bipartite matching.
fn augment(i: usize, edges: &[Vec<usize>], owner: &mut [Option<usize>], seen: &mut [bool]) -> bool {
    for &j in &edges[i] {
        if seen[j] {
            continue;
        }
        seen[j] = true;
        let free = match owner[j] {
            None => true,
            Some(k) => augment(k, edges, owner, seen),
        };
        if free {
            owner[j] = Some(i);
            return true;
        }
    }
    false
}
