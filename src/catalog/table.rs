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

//! Row storage with per-column histogram maintenance
//!
//! A [`Table`] owns its columns and a row vector; every row matches the
//! column list in arity and tags. Appends go through [`Table::add_row`],
//! which validates and feeds histograms. Operators that materialize derived
//! tables push already-validated rows with [`Table::push_row_unchecked`] and
//! refit integer histograms afterwards with
//! [`Table::recompute_integer_histograms`].

use crate::core::{DataType, Error, Operator, Result, Value};
use crate::stats::{Histogram, IntegerHistogram, DEFAULT_INTEGER_BUCKETS};

use super::column::Column;

/// An in-memory table: ordered columns plus a row vector
#[derive(Debug, Clone)]
pub struct Table {
    /// Table name; derived tables get synthesized names like `movie_filtered`
    pub name: String,

    /// Ordered column definitions
    pub columns: Vec<Column>,

    /// Row storage, each row in column order
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with no columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append a column definition
    ///
    /// `table_name` is the column's base table, which differs from `name`
    /// on derived tables.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        table_name: impl Into<String>,
        data_type: DataType,
    ) {
        self.columns.push(Column::new(name, table_name, data_type));
    }

    /// Number of stored rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append a row, validating arity and per-field tags
    ///
    /// On success every column's histogram is updated.
    pub fn add_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::row_arity_mismatch(
                &self.name,
                self.columns.len(),
                row.len(),
            ));
        }
        for (column, value) in self.columns.iter().zip(&row) {
            if value.data_type() != column.data_type {
                return Err(Error::type_mismatch(format!(
                    "column '{}' in table '{}' holds {}, got {}",
                    column.name,
                    self.name,
                    column.data_type,
                    value.data_type()
                )));
            }
        }
        for (column, value) in self.columns.iter_mut().zip(&row) {
            column.histogram.add_value(value)?;
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a row that is already known to match the schema
    ///
    /// Used by operators copying rows between tables with identical column
    /// lists; histograms are refit in bulk afterwards.
    pub fn push_row_unchecked(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Position of the column named `column` owned by `table_name`
    ///
    /// The owning-table qualifier matters: after a join the result carries
    /// columns from both inputs, possibly with repeated names.
    pub fn column_index(&self, column: &str, table_name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == column && c.table_name == table_name)
            .ok_or_else(|| Error::column_not_found(table_name, column))
    }

    /// Data type of the first column named `column`, regardless of owner
    pub fn column_type(&self, column: &str) -> Result<DataType> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.data_type)
            .ok_or_else(|| Error::column_not_found(&self.name, column))
    }

    /// Refit every integer column's histogram to the stored data
    ///
    /// Bounds become the actual min/max over the rows and every value is
    /// re-ingested, so selectivity stays meaningful on derived tables.
    /// Called after bulk loads and after filter/join materialization.
    pub fn recompute_integer_histograms(&mut self) {
        for (idx, column) in self.columns.iter_mut().enumerate() {
            if column.data_type != DataType::Integer {
                continue;
            }

            let mut min = i64::MAX;
            let mut max = i64::MIN;
            for row in &self.rows {
                if let Value::Integer(v) = &row[idx] {
                    min = min.min(*v);
                    max = max.max(*v);
                }
            }
            if min > max {
                // No rows: reset to an empty default histogram
                column.histogram = Histogram::for_type(DataType::Integer);
                continue;
            }

            let mut refit = IntegerHistogram::new(DEFAULT_INTEGER_BUCKETS, min, max);
            for row in &self.rows {
                if let Value::Integer(v) = &row[idx] {
                    refit.add(*v);
                }
            }
            column.histogram = Histogram::Integer(refit);
        }
    }

    /// Estimate the fraction of rows satisfying `column op probe`
    ///
    /// Dispatches to the named column's histogram. The probe's tag must
    /// match the column type.
    pub fn estimate_selectivity(
        &self,
        column: &str,
        op: Operator,
        probe: &Value,
    ) -> Result<f64> {
        let column = self
            .columns
            .iter()
            .find(|c| c.name == column)
            .ok_or_else(|| Error::column_not_found(&self.name, column))?;
        column.histogram.estimate_selectivity(op, probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_table() -> Table {
        let mut table = Table::new("actor");
        table.add_column("id", "actor", DataType::Integer);
        table.add_column("fname", "actor", DataType::Text);
        table.add_column("lname", "actor", DataType::Text);
        table
    }

    #[test]
    fn test_add_row_validates_arity() {
        let mut table = actor_table();
        let err = table
            .add_row(vec![Value::integer(1), Value::text("Tom")])
            .unwrap_err();
        assert_eq!(
            err,
            Error::row_arity_mismatch("actor", 3, 2)
        );
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_add_row_validates_tags() {
        let mut table = actor_table();
        let err = table
            .add_row(vec![
                Value::text("one"),
                Value::text("Tom"),
                Value::text("Cruise"),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_add_row_updates_histograms() {
        let mut table = actor_table();
        table
            .add_row(vec![
                Value::integer(1),
                Value::text("Tom"),
                Value::text("Cruise"),
            ])
            .unwrap();
        table
            .add_row(vec![
                Value::integer(2),
                Value::text("Tom"),
                Value::text("Hanks"),
            ])
            .unwrap();

        assert_eq!(table.columns[0].histogram.total(), 2);
        assert_eq!(table.columns[2].histogram.total(), 2);
    }

    #[test]
    fn test_column_index_is_owner_qualified() {
        let mut joined = Table::new("movie_casts_joined");
        joined.add_column("id", "movie", DataType::Integer);
        joined.add_column("id", "casts", DataType::Integer);

        assert_eq!(joined.column_index("id", "movie").unwrap(), 0);
        assert_eq!(joined.column_index("id", "casts").unwrap(), 1);
        assert!(joined.column_index("id", "actor").is_err());
    }

    #[test]
    fn test_recompute_refits_bounds_and_totals() {
        let mut table = Table::new("movie");
        table.add_column("year", "movie", DataType::Integer);
        for year in [1977_i64, 1999, 2003, 2010] {
            table.add_row(vec![Value::integer(year)]).unwrap();
        }

        table.recompute_integer_histograms();
        let Histogram::Integer(h) = &table.columns[0].histogram else {
            panic!("expected integer histogram");
        };
        assert_eq!(h.bounds(), (1977, 2010));
        assert_eq!(h.total(), 4);
        assert_eq!(h.bucket_sum(), table.row_count() as u64);
    }

    #[test]
    fn test_recompute_on_empty_table() {
        let mut table = Table::new("empty");
        table.add_column("id", "empty", DataType::Integer);
        table.recompute_integer_histograms();
        assert_eq!(table.columns[0].histogram.total(), 0);
    }

    #[test]
    fn test_estimate_selectivity_dispatch() {
        let mut table = actor_table();
        for (id, lname) in [(1, "Cruise"), (2, "Hanks"), (3, "Cruise")] {
            table
                .add_row(vec![
                    Value::integer(id),
                    Value::text("Tom"),
                    Value::text(lname),
                ])
                .unwrap();
        }
        table.recompute_integer_histograms();

        let sel = table
            .estimate_selectivity("lname", Operator::Eq, &Value::text("Cruise"))
            .unwrap();
        assert!(sel >= 2.0 / 3.0 - 1e-9);

        let err = table
            .estimate_selectivity("id", Operator::Eq, &Value::text("Tom"))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));
    }
}
