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

//! Catalog: the engine's table registry
//!
//! The catalog owns every base table. Planning and execution never mutate
//! catalog entries; filters and joins materialize freshly owned derived
//! tables instead.

pub mod column;
pub mod loader;
pub mod table;

pub use column::Column;
pub use table::Table;

use rustc_hash::FxHashMap;

use crate::core::{Error, Result};

/// Mapping from table name to table
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    tables: FxHashMap<String, Table>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under its name, replacing any previous entry
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Look up a table by name
    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Look up a table by name for mutation
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Row count of a table
    pub fn table_size(&self, name: &str) -> Result<usize> {
        Ok(self.get_table(name)?.row_count())
    }

    /// Whether a table is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Names of all registered tables, sorted for deterministic iteration
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
