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

//! Decomposed-query parser
//!
//! The canonical input is a block of key:value lines delimited by literal
//! `query_start` / `query_end` markers:
//!
//! ```text
//! query_start
//! tables: movie, casts
//! scalar_filters: movie.id = 8854
//! dynamic_filters:
//! joins: movie.id = casts.mid
//! query_end
//! ```
//!
//! `scalar_filters` accepts `=, !=, <, <=, >, >=`; `dynamic_filters` and
//! `joins` accept equality only. Empty sections are permitted. The parsed
//! components are validated against the catalog before they are returned:
//! tables and columns must exist and both sides of every predicate must
//! agree on type.

use crate::catalog::Catalog;
use crate::core::{DataType, Error, Operator, Result, Value};

use super::components::{ColumnRef, DynamicFilter, Join, QueryComponents, ScalarFilter};

/// Parse a query block and validate it against the catalog
pub fn parse_query(lines: &[String], catalog: &Catalog) -> Result<QueryComponents> {
    let mut components = QueryComponents::default();
    let mut started = false;

    for line in lines {
        let line = line.trim();
        if line == "query_start" {
            started = true;
            continue;
        }
        if line == "query_end" {
            break;
        }
        if !started || line.is_empty() {
            continue;
        }

        let Some((section, content)) = line.split_once(':') else {
            continue;
        };
        let content = content.trim();

        match section.trim() {
            "tables" => {
                for name in split_and_trim(content) {
                    components.tables.push(name.to_string());
                }
            }
            "scalar_filters" => {
                for item in split_and_trim(content) {
                    components.scalar_filters.push(parse_scalar_filter(item, catalog)?);
                }
            }
            "dynamic_filters" => {
                for item in split_and_trim(content) {
                    let (lhs, rhs) = parse_column_pair(item)?;
                    components.dynamic_filters.push(DynamicFilter {
                        lhs,
                        op: Operator::Eq,
                        rhs,
                    });
                }
            }
            "joins" => {
                for item in split_and_trim(content) {
                    let (lhs, rhs) = parse_column_pair(item)?;
                    components.joins.push(Join { lhs, rhs });
                }
            }
            _ => {}
        }
    }

    validate(&components, catalog)?;
    Ok(components)
}

/// Split a section body on commas, trimming and dropping empty items
fn split_and_trim(content: &str) -> impl Iterator<Item = &str> {
    content.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a `table.column` reference
fn parse_column_ref(input: &str) -> Result<ColumnRef> {
    let (table, column) = input
        .split_once('.')
        .ok_or_else(|| Error::query_validation(format!("invalid table.column: '{}'", input)))?;
    let table = table.trim();
    let column = column.trim();
    if table.is_empty() || column.is_empty() {
        return Err(Error::query_validation(format!(
            "invalid table.column: '{}'",
            input
        )));
    }
    Ok(ColumnRef::new(table, column))
}

/// Parse a `t1.c1 = t2.c2` pair for joins and dynamic filters
fn parse_column_pair(input: &str) -> Result<(ColumnRef, ColumnRef)> {
    let (lhs, rhs) = input
        .split_once('=')
        .ok_or_else(|| Error::query_validation(format!("expected equality: '{}'", input)))?;
    Ok((parse_column_ref(lhs.trim())?, parse_column_ref(rhs.trim())?))
}

/// Parse a `table.column OP literal` scalar filter
///
/// Two-character operators are matched before their one-character prefixes.
/// The literal is typed from the referenced column when possible; a literal
/// that does not fit an integer column is kept as text so validation
/// reports the mismatch rather than the parser guessing.
fn parse_scalar_filter(input: &str, catalog: &Catalog) -> Result<ScalarFilter> {
    for (symbol, op) in Operator::SYMBOLS {
        let Some(pos) = input.find(symbol) else {
            continue;
        };
        let target = parse_column_ref(input[..pos].trim())?;
        let literal = input[pos + symbol.len()..].trim();
        if literal.is_empty() {
            return Err(Error::query_validation(format!(
                "missing literal in filter: '{}'",
                input
            )));
        }

        let column_type = catalog
            .get_table(&target.table)?
            .column_type(&target.column)?;
        let value = match column_type {
            DataType::Integer => match literal.parse::<i64>() {
                Ok(v) => Value::integer(v),
                Err(_) => Value::text(literal),
            },
            DataType::Text => Value::text(literal),
        };

        return Ok(ScalarFilter { target, op, value });
    }
    Err(Error::query_validation(format!(
        "no operator found in filter: '{}'",
        input
    )))
}

/// Validate components against the catalog
///
/// Checks that every referenced table and column exists and that literal
/// and column tags agree on both sides of every predicate. Type errors are
/// reported here, before any plan is generated or executed.
pub fn validate(components: &QueryComponents, catalog: &Catalog) -> Result<()> {
    for table in &components.tables {
        catalog.get_table(table)?;
    }

    for filter in &components.scalar_filters {
        let column_type = catalog
            .get_table(&filter.target.table)?
            .column_type(&filter.target.column)?;
        if column_type != filter.value.data_type() {
            return Err(Error::type_mismatch(format!(
                "scalar filter on {} compares {} with {}",
                filter.target,
                column_type,
                filter.value.data_type()
            )));
        }
    }

    for filter in &components.dynamic_filters {
        check_column_pair("dynamic filter", &filter.lhs, &filter.rhs, catalog)?;
    }
    for join in &components.joins {
        check_column_pair("join", &join.lhs, &join.rhs, catalog)?;
    }
    Ok(())
}

/// Ensure both sides of a column pair exist and share a type
fn check_column_pair(
    what: &str,
    lhs: &ColumnRef,
    rhs: &ColumnRef,
    catalog: &Catalog,
) -> Result<()> {
    let lhs_type = catalog.get_table(&lhs.table)?.column_type(&lhs.column)?;
    let rhs_type = catalog.get_table(&rhs.table)?.column_type(&rhs.column)?;
    if lhs_type != rhs_type {
        return Err(Error::type_mismatch(format!(
            "{} {} = {} compares {} with {}",
            what, lhs, rhs, lhs_type, rhs_type
        )));
    }
    Ok(())
}
