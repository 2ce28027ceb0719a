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

//! Column definitions for the tuple store

use std::fmt;

use crate::core::DataType;
use crate::stats::Histogram;

/// A column definition with its statistics
///
/// The owning table name is stored on the column itself rather than as a
/// back-reference: a post-join table carries columns from several base
/// tables, and lookups stay qualified by `(column, owning table)`.
///
/// Cloning a column deep-copies its histogram; two columns never share
/// bucket counters.
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Name of the base table this column originated from
    pub table_name: String,

    /// Data type of the column
    pub data_type: DataType,

    /// Histogram over the column's stored values
    pub histogram: Histogram,
}

impl Column {
    /// Create a new column with an empty histogram for its type
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            data_type,
            histogram: Histogram::for_type(data_type),
        }
    }

    /// The fully qualified `table.column` name
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table_name, self.name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {}", self.table_name, self.name, self.data_type)
    }
}
