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

//! Materializing physical operators
//!
//! Operators form an owned tree; evaluation is strictly bottom-up and
//! eager. Each operator materializes its entire output table before the
//! parent sees a row; there is no pipelining and no iterator protocol.
//! Outputs own their row storage, so downstream mutation and histogram
//! refits never alias an input table.

use crate::catalog::Table;
use crate::core::{Operator as CompareOp, Result, Value};
use crate::query::ColumnRef;

/// A node in the physical operator tree
pub trait Operator {
    /// Materialize this operator's full output
    fn execute(&mut self) -> Result<Table>;
}

/// Scan: produce a copy of a base table
///
/// The copy is deliberate; downstream operators are free to refit
/// histograms without touching the catalog's entry.
pub struct ScanOperator {
    table: Table,
}

impl ScanOperator {
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

impl Operator for ScanOperator {
    fn execute(&mut self) -> Result<Table> {
        Ok(self.table.clone())
    }
}

/// Filter: keep rows satisfying `column op literal`
///
/// The filtered column is located by `(column, owning table)` so the
/// operator works on post-join inputs, where names alone are ambiguous.
/// Output columns are fresh; integer histograms are refit after the copy.
pub struct FilterOperator {
    child: Box<dyn Operator>,
    target: ColumnRef,
    op: CompareOp,
    value: Value,
}

impl FilterOperator {
    pub fn new(child: Box<dyn Operator>, target: ColumnRef, op: CompareOp, value: Value) -> Self {
        Self {
            child,
            target,
            op,
            value,
        }
    }
}

impl Operator for FilterOperator {
    fn execute(&mut self) -> Result<Table> {
        let input = self.child.execute()?;
        let index = input.column_index(&self.target.column, &self.target.table)?;

        let mut output = Table::new(format!("{}_filtered", input.name));
        for column in &input.columns {
            output.add_column(&column.name, &column.table_name, column.data_type);
        }

        for row in &input.rows {
            if row[index].matches(self.op, &self.value)? {
                output.push_row_unchecked(row.clone());
            }
        }

        output.recompute_integer_histograms();
        Ok(output)
    }
}

/// Nested-loop equi-join
///
/// Left-major, right-minor pairing. The output row is every left column
/// followed by every right column; the join column is retained on both
/// sides, each keeping its base-table provenance.
pub struct NestedLoopJoinOperator {
    left: Box<dyn Operator>,
    right: Box<dyn Operator>,
    left_ref: ColumnRef,
    right_ref: ColumnRef,
}

impl NestedLoopJoinOperator {
    pub fn new(
        left: Box<dyn Operator>,
        right: Box<dyn Operator>,
        left_ref: ColumnRef,
        right_ref: ColumnRef,
    ) -> Self {
        Self {
            left,
            right,
            left_ref,
            right_ref,
        }
    }
}

impl Operator for NestedLoopJoinOperator {
    fn execute(&mut self) -> Result<Table> {
        let left = self.left.execute()?;
        let right = self.right.execute()?;

        let left_index = left.column_index(&self.left_ref.column, &self.left_ref.table)?;
        let right_index = right.column_index(&self.right_ref.column, &self.right_ref.table)?;

        let mut output = Table::new(format!("{}_{}_joined", left.name, right.name));
        for column in left.columns.iter().chain(&right.columns) {
            output.add_column(&column.name, &column.table_name, column.data_type);
        }

        for left_row in &left.rows {
            for right_row in &right.rows {
                if left_row[left_index].matches(CompareOp::Eq, &right_row[right_index])? {
                    let mut joined = Vec::with_capacity(left_row.len() + right_row.len());
                    joined.extend(left_row.iter().cloned());
                    joined.extend(right_row.iter().cloned());
                    output.push_row_unchecked(joined);
                }
            }
        }

        output.recompute_integer_histograms();
        Ok(output)
    }
}

/// Project: keep the requested columns
///
/// Output columns appear in the order they occur in the input, not in the
/// requested order.
pub struct ProjectOperator {
    child: Box<dyn Operator>,
    columns: Vec<ColumnRef>,
}

impl ProjectOperator {
    pub fn new(child: Box<dyn Operator>, columns: Vec<ColumnRef>) -> Self {
        Self { child, columns }
    }
}

impl Operator for ProjectOperator {
    fn execute(&mut self) -> Result<Table> {
        let input = self.child.execute()?;

        let mut kept = Vec::new();
        let mut output = Table::new(format!("{}_projected", input.name));
        for (index, column) in input.columns.iter().enumerate() {
            let requested = self
                .columns
                .iter()
                .any(|c| c.column == column.name && c.table == column.table_name);
            if requested {
                kept.push(index);
                output.add_column(&column.name, &column.table_name, column.data_type);
            }
        }

        for row in &input.rows {
            let projected: Vec<Value> = kept.iter().map(|&i| row[i].clone()).collect();
            output.push_row_unchecked(projected);
        }

        output.recompute_integer_histograms();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;

    fn actor_table() -> Table {
        let mut table = Table::new("actor");
        table.add_column("id", "actor", DataType::Integer);
        table.add_column("fname", "actor", DataType::Text);
        table.add_column("lname", "actor", DataType::Text);
        for (id, fname, lname) in [(1, "Tom", "Cruise"), (2, "Tom", "Hanks")] {
            table
                .add_row(vec![
                    Value::integer(id),
                    Value::text(fname),
                    Value::text(lname),
                ])
                .unwrap();
        }
        table.recompute_integer_histograms();
        table
    }

    #[test]
    fn test_scan_copies_the_table() {
        let table = actor_table();
        let mut scan = ScanOperator::new(table.clone());
        let result = scan.execute().unwrap();
        assert_eq!(result.row_count(), 2);
        assert_eq!(result.columns.len(), 3);
    }

    #[test]
    fn test_filter_keeps_matching_rows() {
        let mut filter = FilterOperator::new(
            Box::new(ScanOperator::new(actor_table())),
            ColumnRef::new("actor", "lname"),
            CompareOp::Eq,
            Value::text("Cruise"),
        );
        let result = filter.execute().unwrap();
        assert_eq!(result.row_count(), 1);
        assert_eq!(result.rows[0][0], Value::integer(1));
        assert_eq!(result.name, "actor_filtered");
    }

    #[test]
    fn test_filter_unknown_column_fails() {
        let mut filter = FilterOperator::new(
            Box::new(ScanOperator::new(actor_table())),
            ColumnRef::new("actor", "age"),
            CompareOp::Gt,
            Value::integer(10),
        );
        assert!(filter.execute().unwrap_err().is_not_found());
    }

    #[test]
    fn test_join_concatenates_rows_and_keeps_both_columns() {
        let mut casts = Table::new("casts");
        casts.add_column("mid", "casts", DataType::Integer);
        casts.add_column("aid", "casts", DataType::Integer);
        for (mid, aid) in [(10, 1), (11, 1), (12, 2)] {
            casts
                .add_row(vec![Value::integer(mid), Value::integer(aid)])
                .unwrap();
        }
        casts.recompute_integer_histograms();

        let mut join = NestedLoopJoinOperator::new(
            Box::new(ScanOperator::new(actor_table())),
            Box::new(ScanOperator::new(casts)),
            ColumnRef::new("actor", "id"),
            ColumnRef::new("casts", "aid"),
        );
        let result = join.execute().unwrap();

        // actor 1 matches two cast rows, actor 2 matches one
        assert_eq!(result.row_count(), 3);
        assert_eq!(result.columns.len(), 5);
        assert_eq!(result.columns[0].table_name, "actor");
        assert_eq!(result.columns[3].table_name, "casts");

        // Both join columns survive and agree on every row
        let left = result.column_index("id", "actor").unwrap();
        let right = result.column_index("aid", "casts").unwrap();
        for row in &result.rows {
            assert_eq!(row[left], row[right]);
        }
    }

    #[test]
    fn test_join_output_is_left_major() {
        let mut left = Table::new("l");
        left.add_column("k", "l", DataType::Integer);
        left.add_row(vec![Value::integer(2)]).unwrap();
        left.add_row(vec![Value::integer(1)]).unwrap();

        let mut right = Table::new("r");
        right.add_column("k", "r", DataType::Integer);
        right.add_row(vec![Value::integer(1)]).unwrap();
        right.add_row(vec![Value::integer(2)]).unwrap();

        let mut join = NestedLoopJoinOperator::new(
            Box::new(ScanOperator::new(left)),
            Box::new(ScanOperator::new(right)),
            ColumnRef::new("l", "k"),
            ColumnRef::new("r", "k"),
        );
        let result = join.execute().unwrap();
        // Left row order dictates output order
        assert_eq!(result.rows[0][0], Value::integer(2));
        assert_eq!(result.rows[1][0], Value::integer(1));
    }

    #[test]
    fn test_project_emits_input_order() {
        // Request (lname, id) but the input stores id before lname; output
        // follows the input
        let mut project = ProjectOperator::new(
            Box::new(ScanOperator::new(actor_table())),
            vec![
                ColumnRef::new("actor", "lname"),
                ColumnRef::new("actor", "id"),
            ],
        );
        let result = project.execute().unwrap();
        assert_eq!(result.columns.len(), 2);
        assert_eq!(result.columns[0].name, "id");
        assert_eq!(result.columns[1].name, "lname");
        assert_eq!(result.rows[0][0], Value::integer(1));
        assert_eq!(result.rows[0][1], Value::text("Cruise"));
    }
}
