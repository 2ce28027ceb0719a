// Copyright 2025 Planbench Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value type for planbench - runtime values with type information
//!
//! Values carry one of two tags (integer or text). Ordering is total within
//! a tag; comparing across tags is a hard error rather than a coercion.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::error::{Error, Result};
use super::types::{DataType, Operator};

/// A runtime value with type information
///
/// Note: Text uses Arc<str> for cheap cloning during row operations.
/// Rows are cloned on every filter and join materialization.
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),

    /// UTF-8 text string (Arc for cheap cloning)
    Text(Arc<str>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Arc::from(value.into().as_str()))
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Text(_) => DataType::Text,
        }
    }

    /// Extract as i64 if this is an integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    /// Extract as &str if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Integer(_) => None,
            Value::Text(s) => Some(s.as_ref()),
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compare two values of the same tag
    ///
    /// Integer comparison is numeric; text comparison is lexicographic.
    /// Comparing an integer against a text value fails with a type mismatch.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            _ => Err(Error::type_mismatch(format!(
                "cannot compare {} with {}",
                self.data_type(),
                other.data_type()
            ))),
        }
    }

    /// Evaluate `self op other`
    ///
    /// This is the single comparator used by filters, join predicates and
    /// histogram probes, so all of them agree on predicate semantics.
    pub fn matches(&self, op: Operator, other: &Value) -> Result<bool> {
        let ordering = self.compare(other)?;
        Ok(match op {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}
