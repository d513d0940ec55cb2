//! Metadata filters.
//!
//! The JSON form follows the vecs DSL: an object with exactly one key, either
//! a metadata field mapped to `{ "$op": value }` or `$and` / `$or` mapped to a
//! non-empty array of filters.
//!
//! ```json
//! { "$and": [ { "type": { "$eq": "jpg" } }, { "year": { "$gte": 2020 } } ] }
//! ```

pub mod sql;

use serde_json::{json, Value};
use std::cmp::Ordering;

use crate::error::{Result, VectorDbError};
use iv_core::Metadata;

/// Scalar comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "$eq" => Some(Self::Eq),
            "$ne" => Some(Self::Ne),
            "$gt" => Some(Self::Gt),
            "$gte" => Some(Self::Gte),
            "$lt" => Some(Self::Lt),
            "$lte" => Some(Self::Lte),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
        }
    }

    pub(crate) fn sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// A filter condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Compare { field: String, op: CompareOp, value: Value },
    In { field: String, values: Vec<Value> },
    Contains { field: String, value: Value },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Compare { field: field.into(), op: CompareOp::Eq, value: value.into() }
    }

    /// Parse and validate the JSON DSL.
    pub fn from_json(v: &Value) -> Result<Self> {
        let obj = v.as_object().ok_or_else(|| invalid("filter must be an object"))?;
        if obj.len() != 1 {
            return Err(invalid("filter must have exactly one key"));
        }
        let (key, body) = obj.iter().next().ok_or_else(|| invalid("empty filter"))?;

        match key.as_str() {
            "$and" | "$or" => {
                let conds = body
                    .as_array()
                    .ok_or_else(|| invalid(format!("{key} expects an array")))?;
                if conds.is_empty() {
                    return Err(invalid(format!("{key} expects at least one condition")));
                }
                let filters = conds.iter().map(Filter::from_json).collect::<Result<Vec<_>>>()?;
                Ok(if key == "$and" { Filter::And(filters) } else { Filter::Or(filters) })
            }
            k if k.starts_with('$') => Err(invalid(format!("unknown logical operator {k}"))),
            field => {
                let clause = body
                    .as_object()
                    .ok_or_else(|| invalid(format!("condition on {field:?} must be an object")))?;
                if clause.len() != 1 {
                    return Err(invalid(format!("condition on {field:?} must have exactly one operator")));
                }
                let (op, value) = clause.iter().next().ok_or_else(|| invalid("empty condition"))?;
                parse_condition(field, op, value)
            }
        }
    }

    /// Serialize back to the JSON DSL.
    pub fn to_json(&self) -> Value {
        match self {
            Filter::Compare { field, op, value } => json!({ field.as_str(): { op.as_key(): value } }),
            Filter::In { field, values } => json!({ field.as_str(): { "$in": values } }),
            Filter::Contains { field, value } => json!({ field.as_str(): { "$contains": value } }),
            Filter::And(fs) => json!({ "$and": fs.iter().map(Filter::to_json).collect::<Vec<_>>() }),
            Filter::Or(fs) => json!({ "$or": fs.iter().map(Filter::to_json).collect::<Vec<_>>() }),
        }
    }

    /// Evaluate the filter against record metadata. Missing fields never match.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            Filter::Compare { field, op, value } => {
                let Some(field_val) = metadata.get(field) else { return false };
                match op {
                    CompareOp::Eq => values_match(field_val, value),
                    CompareOp::Ne => !values_match(field_val, value),
                    CompareOp::Gt => compare_values(field_val, value) == Some(Ordering::Greater),
                    CompareOp::Gte => matches!(
                        compare_values(field_val, value),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    CompareOp::Lt => compare_values(field_val, value) == Some(Ordering::Less),
                    CompareOp::Lte => matches!(
                        compare_values(field_val, value),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                }
            }
            Filter::In { field, values } => metadata
                .get(field)
                .map(|fv| values.iter().any(|v| values_match(fv, v)))
                .unwrap_or(false),
            Filter::Contains { field, value } => metadata
                .get(field)
                .and_then(Value::as_array)
                .map(|arr| arr.iter().any(|v| values_match(v, value)))
                .unwrap_or(false),
            Filter::And(filters) => filters.iter().all(|f| f.matches(metadata)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(metadata)),
        }
    }
}

fn parse_condition(field: &str, op: &str, value: &Value) -> Result<Filter> {
    if let Some(cmp) = CompareOp::from_key(op) {
        if !is_scalar(value) {
            return Err(invalid(format!("{op} on {field:?} expects a scalar value")));
        }
        return Ok(Filter::Compare { field: field.to_string(), op: cmp, value: value.clone() });
    }
    match op {
        "$in" => {
            let values = value
                .as_array()
                .ok_or_else(|| invalid(format!("$in on {field:?} expects an array")))?;
            if !values.iter().all(is_scalar) {
                return Err(invalid(format!("$in on {field:?} expects scalar members")));
            }
            Ok(Filter::In { field: field.to_string(), values: values.clone() })
        }
        "$contains" => {
            if !is_scalar(value) {
                return Err(invalid(format!("$contains on {field:?} expects a scalar value")));
            }
            Ok(Filter::Contains { field: field.to_string(), value: value.clone() })
        }
        other => Err(invalid(format!("unknown comparison operator {other}"))),
    }
}

fn invalid(msg: impl Into<String>) -> VectorDbError {
    VectorDbError::InvalidFilter(msg.into())
}

fn is_scalar(v: &Value) -> bool {
    matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn values_match(a: &Value, b: &Value) -> bool {
    // Numeric comparison: treat i64 and f64 as comparable
    match (a, b) {
        (Value::Number(na), Value::Number(nb)) => {
            if let (Some(ia), Some(ib)) = (na.as_i64(), nb.as_i64()) {
                return ia == ib;
            }
            if let (Some(fa), Some(fb)) = (na.as_f64(), nb.as_f64()) {
                return (fa - fb).abs() < 1e-9;
            }
            false
        }
        _ => a == b,
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(na), Value::Number(nb)) => {
            let fa = na.as_f64()?;
            let fb = nb.as_f64()?;
            fa.partial_cmp(&fb)
        }
        (Value::String(sa), Value::String(sb)) => Some(sa.cmp(sb)),
        (Value::Bool(ba), Value::Bool(bb)) => Some(ba.cmp(bb)),
        _ => None,
    }
}
