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

//! Delimited-text catalog ingestion
//!
//! Schema files hold one table per line:
//!
//! ```text
//! actor(id int, fname string, lname string)
//! ```
//!
//! Data files are pipe-delimited, one file per table, named
//! `<table>.txt` inside a data directory:
//!
//! ```text
//! 1|Tom|Cruise
//! 2|Tom|Hanks
//! ```
//!
//! Fields are trimmed of surrounding whitespace, empty integer fields parse
//! as 0 and blank lines are skipped. A row whose field count disagrees with
//! the schema is loaded with the available fields and a warning is printed.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::{DataType, Error, Result, Value};

use super::{Catalog, Table};

/// Load a schema file into the catalog
///
/// Each line declares one table as `name(col type, ...)` with
/// `type ∈ {int, string}`. A leading non-alphabetic run on a column name
/// (whitespace artifacts of the format) is trimmed.
pub fn load_schema(catalog: &mut Catalog, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::open(path).map_err(|e| Error::file_open(path.display().to_string(), e.to_string()))?;

    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let table = parse_schema_line(&line)?;
        catalog.add_table(table);
    }
    Ok(())
}

/// Parse a single `name(col type, ...)` schema line
fn parse_schema_line(line: &str) -> Result<Table> {
    let open = line
        .find('(')
        .ok_or_else(|| Error::schema_parse(format!("missing '(' in schema line: {}", line)))?;
    let table_name = line[..open].trim().to_string();
    if table_name.is_empty() {
        return Err(Error::schema_parse(format!(
            "missing table name in schema line: {}",
            line
        )));
    }

    let mut table = Table::new(&table_name);
    for column_def in line[open + 1..].split(',') {
        let column_def = column_def.replace(')', "");
        let column_def = column_def.trim();
        if column_def.is_empty() {
            continue;
        }
        let (raw_name, keyword) = column_def.split_once(' ').ok_or_else(|| {
            Error::schema_parse(format!("missing type for column '{}'", column_def))
        })?;
        let name = raw_name.trim_start_matches(|c: char| !c.is_ascii_alphabetic());
        let data_type = DataType::from_schema_keyword(keyword.trim())?;
        table.add_column(name, &table_name, data_type);
    }
    Ok(table)
}

/// Load a pipe-delimited data file into an existing table
///
/// Integer histograms are refit once the whole file is ingested.
pub fn load_table_data(
    catalog: &mut Catalog,
    table_name: &str,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::open(path).map_err(|e| Error::file_open(path.display().to_string(), e.to_string()))?;

    let table = catalog.get_table_mut(table_name)?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = parse_data_row(table, &line, path)?;
        table.add_row(row)?;
    }
    table.recompute_integer_histograms();
    Ok(())
}

/// Parse one pipe-delimited row against the table's column list
///
/// Short rows are padded with the column type's empty value and long rows
/// are truncated, in both cases with a warning, so the table's arity
/// invariant holds for every stored row.
fn parse_data_row(table: &Table, line: &str, path: &Path) -> Result<Vec<Value>> {
    let mut row = Vec::with_capacity(table.columns.len());
    let mut fields = 0usize;

    for (index, field) in line.split('|').enumerate() {
        fields += 1;
        if index >= table.columns.len() {
            continue;
        }
        let field = field.trim();
        let value = match table.columns[index].data_type {
            DataType::Integer => {
                if field.is_empty() {
                    Value::integer(0)
                } else {
                    let parsed = field.parse::<i64>().map_err(|_| {
                        Error::schema_parse(format!(
                            "could not parse '{}' as integer at column {} in {}",
                            field,
                            index,
                            path.display()
                        ))
                    })?;
                    Value::integer(parsed)
                }
            }
            DataType::Text => Value::text(field),
        };
        row.push(value);
    }

    if fields != table.columns.len() {
        eprintln!(
            "Warning: row has {} fields, expected {} in {}",
            fields,
            table.columns.len(),
            path.display()
        );
        while row.len() < table.columns.len() {
            let value = match table.columns[row.len()].data_type {
                DataType::Integer => Value::integer(0),
                DataType::Text => Value::text(""),
            };
            row.push(value);
        }
    }
    Ok(row)
}

/// Load a schema file and every table's `<name>.txt` data file
///
/// Tables without a data file are left empty with a warning, so a partial
/// data directory still yields a usable catalog.
pub fn load_directory(
    catalog: &mut Catalog,
    schema_path: impl AsRef<Path>,
    data_dir: impl AsRef<Path>,
) -> Result<()> {
    load_schema(catalog, schema_path)?;
    let data_dir = data_dir.as_ref();

    let names: Vec<String> = catalog
        .table_names()
        .into_iter()
        .map(String::from)
        .collect();
    for name in names {
        let data_path = data_dir.join(format!("{}.txt", name));
        if data_path.is_file() {
            load_table_data(catalog, &name, &data_path)?;
        } else {
            eprintln!(
                "Warning: no data file for table '{}' at {}",
                name,
                data_path.display()
            );
        }
    }
    Ok(())
}
