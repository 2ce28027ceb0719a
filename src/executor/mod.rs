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

//! Plan execution
//!
//! The [`Executor`] realizes a planner's step list against the catalog. It
//! keeps a working map from each referenced table name to that table's
//! "current" relation, initially a copy of the catalog entry:
//!
//! - a Filter step replaces its table's entry with the filtered output;
//! - a Join step replaces *both* participants' entries with the joined
//!   result, so any later step naming either side sees the joined table.
//!
//! The query result is the last-written entry. Errors abort the current
//! query and leave the catalog untouched; every derived table is freshly
//! owned.

pub mod operator;

pub use operator::{
    FilterOperator, NestedLoopJoinOperator, Operator, ProjectOperator, ScanOperator,
};

use rustc_hash::FxHashMap;

use crate::catalog::{Catalog, Table};
use crate::core::{Error, Result};
use crate::planner::{Plan, PlanStep};

/// Step-list execution driver
pub struct Executor<'a> {
    catalog: &'a Catalog,
}

impl<'a> Executor<'a> {
    /// Create an executor over the catalog
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Execute a generated plan
    ///
    /// Fails with [`Error::PlanNotReady`] when the plan carries no steps.
    pub fn execute_plan(&self, plan: &Plan) -> Result<Table> {
        self.execute_steps(&plan.steps)
    }

    /// Execute a step list in order
    pub fn execute_steps(&self, steps: &[PlanStep]) -> Result<Table> {
        if steps.is_empty() {
            return Err(Error::PlanNotReady);
        }

        // First pass: pull every referenced base table into the working set
        let mut working: FxHashMap<String, Table> = FxHashMap::default();
        for step in steps {
            match step {
                PlanStep::Filter(filter) => {
                    self.ensure_loaded(&mut working, &filter.target.table)?;
                }
                PlanStep::Join(join) => {
                    self.ensure_loaded(&mut working, &join.lhs.table)?;
                    self.ensure_loaded(&mut working, &join.rhs.table)?;
                }
            }
        }

        // Second pass: apply the steps, rebinding names as tables derive
        let mut last_written = String::new();
        for step in steps {
            match step {
                PlanStep::Filter(filter) => {
                    let input = working
                        .remove(&filter.target.table)
                        .ok_or_else(|| Error::TableNotFound(filter.target.table.clone()))?;
                    let mut op = FilterOperator::new(
                        Box::new(ScanOperator::new(input)),
                        filter.target.clone(),
                        filter.op,
                        filter.value.clone(),
                    );
                    working.insert(filter.target.table.clone(), op.execute()?);
                    last_written = filter.target.table.clone();
                }
                PlanStep::Join(join) => {
                    let left = working
                        .remove(&join.lhs.table)
                        .ok_or_else(|| Error::TableNotFound(join.lhs.table.clone()))?;
                    // Self-join: both sides name the same entry
                    let right = working
                        .remove(&join.rhs.table)
                        .unwrap_or_else(|| left.clone());

                    let mut op = NestedLoopJoinOperator::new(
                        Box::new(ScanOperator::new(left)),
                        Box::new(ScanOperator::new(right)),
                        join.lhs.clone(),
                        join.rhs.clone(),
                    );
                    let joined = op.execute()?;
                    working.insert(join.lhs.table.clone(), joined.clone());
                    working.insert(join.rhs.table.clone(), joined);
                    last_written = join.lhs.table.clone();
                }
            }
        }

        working
            .remove(&last_written)
            .ok_or(Error::PlanNotReady)
    }

    /// Seed the working set with a copy of a catalog table
    fn ensure_loaded(&self, working: &mut FxHashMap<String, Table>, name: &str) -> Result<()> {
        if !working.contains_key(name) {
            working.insert(name.to_string(), self.catalog.get_table(name)?.clone());
        }
        Ok(())
    }
}
