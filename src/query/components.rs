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

//! Decomposed query representation
//!
//! A query arrives already decomposed into the tables it touches, scalar
//! filters (column vs literal), dynamic filters (column vs column) and
//! equi-joins. Planners reorder these components; they never rewrite them.

use std::fmt;

use crate::core::{Operator, Value};

/// A qualified column reference, `table.column`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// A single-column filter against a literal value
#[derive(Debug, Clone)]
pub struct ScalarFilter {
    /// The filtered column
    pub target: ColumnRef,
    /// Comparison operator
    pub op: Operator,
    /// Literal to compare against
    pub value: Value,
}

impl fmt::Display for ScalarFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.target, self.op, self.value)
    }
}

/// A column-to-column filter (equality only in practice)
#[derive(Debug, Clone)]
pub struct DynamicFilter {
    pub lhs: ColumnRef,
    pub op: Operator,
    pub rhs: ColumnRef,
}

impl fmt::Display for DynamicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

/// An equi-join between two tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub lhs: ColumnRef,
    pub rhs: ColumnRef,
}

impl Join {
    /// Check if this join touches the given table on either side
    pub fn involves(&self, table: &str) -> bool {
        self.lhs.table == table || self.rhs.table == table
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// A fully decomposed query
#[derive(Debug, Clone, Default)]
pub struct QueryComponents {
    /// Referenced table names, in input order
    pub tables: Vec<String>,
    /// Scalar filters, in input order
    pub scalar_filters: Vec<ScalarFilter>,
    /// Dynamic filters, in input order
    pub dynamic_filters: Vec<DynamicFilter>,
    /// Equi-joins, in input order
    pub joins: Vec<Join>,
}

impl QueryComponents {
    /// Human-readable component listing, for the shell
    pub fn summary(&self) -> String {
        let mut out = String::from("=== Query Components ===\n");

        out.push_str("Tables:\n");
        for table in &self.tables {
            out.push_str(&format!("  {}\n", table));
        }

        out.push_str("Scalar Filters:\n");
        if self.scalar_filters.is_empty() {
            out.push_str("  (none)\n");
        }
        for filter in &self.scalar_filters {
            out.push_str(&format!("  {}\n", filter));
        }

        out.push_str("Dynamic Filters:\n");
        if self.dynamic_filters.is_empty() {
            out.push_str("  (none)\n");
        }
        for filter in &self.dynamic_filters {
            out.push_str(&format!("  {}\n", filter));
        }

        out.push_str("Joins:\n");
        if self.joins.is_empty() {
            out.push_str("  (none)\n");
        }
        for join in &self.joins {
            out.push_str(&format!("  {}\n", join));
        }
        out.push_str("=====================");
        out
    }
}
