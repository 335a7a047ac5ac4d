// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Values and value predicates
//!
//! Constraint values carry total equality and ordering (floats compare
//! via `total_cmp`) so that constraints, fragments and whole plans can
//! live in ordered sets and render deterministically.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A literal value appearing in a pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    fn rank(&self) -> u8 {
        match self {
            Value::String(_) => 0,
            Value::Integer(_) => 1,
            Value::Float(_) => 2,
            Value::Boolean(_) => 3,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            // Bit hashing agrees with total_cmp equality
            Value::Float(v) => v.to_bits().hash(state),
            Value::Boolean(b) => b.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Comparison operator of a value predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
}

impl Comparison {
    fn symbol(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Neq => "!=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
            Comparison::Contains => "contains ",
        }
    }
}

/// A predicate over the value of one variable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValuePredicate {
    op: Comparison,
    value: Value,
}

impl ValuePredicate {
    pub fn new(op: Comparison, value: impl Into<Value>) -> Self {
        ValuePredicate {
            op,
            value: value.into(),
        }
    }

    pub fn eq(value: impl Into<Value>) -> Self {
        Self::new(Comparison::Eq, value)
    }

    pub fn neq(value: impl Into<Value>) -> Self {
        Self::new(Comparison::Neq, value)
    }

    pub fn gt(value: impl Into<Value>) -> Self {
        Self::new(Comparison::Gt, value)
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        Self::new(Comparison::Gte, value)
    }

    pub fn lt(value: impl Into<Value>) -> Self {
        Self::new(Comparison::Lt, value)
    }

    pub fn lte(value: impl Into<Value>) -> Self {
        Self::new(Comparison::Lte, value)
    }

    pub fn contains(value: impl Into<Value>) -> Self {
        Self::new(Comparison::Contains, value)
    }

    pub fn op(&self) -> Comparison {
        self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Equality predicates can be answered from the value index; every
    /// other operator needs a range or containment scan.
    pub fn is_equality(&self) -> bool {
        self.op == Comparison::Eq
    }
}

impl fmt::Display for ValuePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.value)
    }
}
