//! Value comparison for templates
//!
//! Backs the `if_less` / `if_less_or_equal` / `if_greater_or_equal` /
//! `if_greater` tags: each operand is either a dotted variable path looked
//! up in a JSON context or a literal, and the two are ordered with
//! [`compare_values`].
//!
//! Ordering across JSON types:
//!
//!     null < bool, number < string < array
//!
//! Numbers compare numerically with booleans counting as 0/1, strings
//! compare lexicographically and arrays element-wise. Objects have no order.

use crate::error::ComparisonError;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One of the four supported comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    LessOrEqual,
    GreaterOrEqual,
    Greater,
}

impl Comparison {
    pub const ALL: [Comparison; 4] = [
        Comparison::Less,
        Comparison::LessOrEqual,
        Comparison::GreaterOrEqual,
        Comparison::Greater,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Comparison::Less => "less",
            Comparison::LessOrEqual => "less_or_equal",
            Comparison::GreaterOrEqual => "greater_or_equal",
            Comparison::Greater => "greater",
        }
    }

    /// Whether `ordering` satisfies this comparison
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Less => ordering == Ordering::Less,
            Comparison::LessOrEqual => ordering != Ordering::Greater,
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::Greater => ordering == Ordering::Greater,
        }
    }

    /// Compare two already resolved values
    pub fn evaluate(self, left: &Value, right: &Value) -> Result<bool, ComparisonError> {
        compare_values(left, right).map(|ordering| self.holds(ordering))
    }
}

impl FromStr for Comparison {
    type Err = ComparisonError;

    /// Accepts both the bare name (`less`) and the tag name (`if_less`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("if_").unwrap_or(s);
        Comparison::ALL
            .into_iter()
            .find(|comparison| comparison.name() == name)
            .ok_or_else(|| ComparisonError::UnknownComparison(s.to_string()))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look `path` up in `context`, falling back to a literal.
///
/// Dotted segments walk into objects by key and into arrays by index. When
/// the lookup fails an all-digit path becomes an integer and anything else
/// is returned as the literal string.
pub fn resolve_variable_or_literal(path: &str, context: &Value) -> Value {
    if let Some(value) = lookup(context, path) {
        return value.clone();
    }
    if !path.is_empty() && path.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = path.parse::<u64>() {
            return Value::from(n);
        }
    }
    Value::String(path.to_string())
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some((first, rest)) = path.split_once('.') {
        let intermediate = lookup(value, first)?;
        return lookup(intermediate, rest);
    }

    match value {
        Value::Object(map) => map.get(path),
        Value::Array(items) => path.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Order two JSON values
pub fn compare_values(left: &Value, right: &Value) -> Result<Ordering, ComparisonError> {
    let incomparable = || ComparisonError::Incomparable {
        left: type_name(left).to_string(),
        right: type_name(right).to_string(),
    };

    let (left_rank, right_rank) = match (type_rank(left), type_rank(right)) {
        (Some(l), Some(r)) => (l, r),
        _ => return Err(incomparable()),
    };
    if left_rank != right_rank {
        return Ok(left_rank.cmp(&right_rank));
    }

    match (left, right) {
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::String(l), Value::String(r)) => Ok(l.cmp(r)),
        (Value::Array(l), Value::Array(r)) => {
            for (a, b) in l.iter().zip(r) {
                let ordering = compare_values(a, b)?;
                if ordering != Ordering::Equal {
                    return Ok(ordering);
                }
            }
            Ok(l.len().cmp(&r.len()))
        }
        _ => {
            let (l, r) = (as_number(left), as_number(right));
            match (l, r) {
                (Some(l), Some(r)) => l.partial_cmp(&r).ok_or_else(incomparable),
                _ => Err(incomparable()),
            }
        }
    }
}

/// Evaluate a whole tag such as `if_less item.count 3`
pub fn evaluate_tag(tag: &str, context: &Value) -> Result<bool, ComparisonError> {
    let bits: Vec<&str> = tag.split_whitespace().collect();
    let [name, left, right] = bits.as_slice() else {
        return Err(ComparisonError::ArgumentCount(bits.len().saturating_sub(1)));
    };

    let comparison: Comparison = name.parse()?;
    let left = resolve_variable_or_literal(left, context);
    let right = resolve_variable_or_literal(right, context);
    comparison.evaluate(&left, &right)
}

fn type_rank(value: &Value) -> Option<u8> {
    match value {
        Value::Null => Some(0),
        Value::Bool(_) | Value::Number(_) => Some(1),
        Value::String(_) => Some(2),
        Value::Array(_) => Some(3),
        Value::Object(_) => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
