use std::cmp::Ordering;
use std::str::FromStr;

use serde_json::Value;

use crate::database::{Fields, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    ArrayContains,
}

impl FromStr for Op {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "==" => Op::Eq,
            "!=" => Op::Ne,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            "<" => Op::Lt,
            "<=" => Op::Le,
            "in" => Op::In,
            "array-contains" => Op::ArrayContains,
            other => return Err(StoreError::Invalid(format!("unknown operator '{other}'"))),
        };
        Ok(op)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    pub fn new(field: &str, op: Op, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Eq, value)
    }

    /// A document missing the field never matches.
    pub fn matches(&self, fields: &Fields) -> bool {
        let actual = match lookup(fields, &self.field) {
            Some(actual) => actual,
            None => return false,
        };
        match self.op {
            Op::Eq => values_equal(actual, &self.value),
            Op::Ne => !values_equal(actual, &self.value),
            Op::Gt => compare(actual, &self.value) == Some(Ordering::Greater),
            Op::Ge => matches!(compare(actual, &self.value), Some(Ordering::Greater | Ordering::Equal)),
            Op::Lt => compare(actual, &self.value) == Some(Ordering::Less),
            Op::Le => matches!(compare(actual, &self.value), Some(Ordering::Less | Ordering::Equal)),
            Op::In => match &self.value {
                Value::Array(candidates) => candidates.iter().any(|c| values_equal(actual, c)),
                _ => false,
            },
            Op::ArrayContains => match (actual, &self.value) {
                (Value::Array(items), needle) => items.iter().any(|item| values_equal(item, needle)),
                (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
                _ => false,
            },
        }
    }
}

pub fn matches_all(fields: &Fields, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| c.matches(fields))
}

pub fn lookup<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = fields.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

// 2 and 2.0 are the same number
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
