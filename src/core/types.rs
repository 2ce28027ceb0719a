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

//! Fundamental type definitions: column data types and comparison operators

use std::fmt;

use super::error::{Error, Result};

/// Data types supported by the tuple store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer
    Integer,

    /// UTF-8 text string
    Text,
}

impl DataType {
    /// Map a schema-file type keyword to a data type
    ///
    /// Schema files use `int` and `string`.
    pub fn from_schema_keyword(keyword: &str) -> Result<Self> {
        match keyword {
            "int" => Ok(DataType::Integer),
            "string" => Ok(DataType::Text),
            other => Err(Error::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Text => write!(f, "TEXT"),
        }
    }
}

/// Comparison operators for filters and join predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equality (=)
    Eq,

    /// Inequality (!=)
    Ne,

    /// Greater than (>)
    Gt,

    /// Greater than or equal (>=)
    Gte,

    /// Less than (<)
    Lt,

    /// Less than or equal (<=)
    Lte,
}

impl Operator {
    /// All operator symbols ordered so that two-character symbols are tried
    /// before their one-character prefixes
    pub const SYMBOLS: [(&'static str, Operator); 6] = [
        (">=", Operator::Gte),
        ("<=", Operator::Lte),
        ("!=", Operator::Ne),
        ("=", Operator::Eq),
        (">", Operator::Gt),
        ("<", Operator::Lt),
    ];

    /// Parse an operator from its textual symbol
    pub fn parse(symbol: &str) -> Result<Self> {
        match symbol {
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            other => Err(Error::query_validation(format!(
                "invalid predicate operator '{}'",
                other
            ))),
        }
    }

    /// The textual symbol for this operator
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
