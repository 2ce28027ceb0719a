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

//! Dynamic-programming strategy: filters first, then bottom-up subset
//! enumeration over the query's relations
//!
//! For every subset S of the referenced tables:
//!
//! ```text
//! best[S] = min over disjoint splits S = L ∪ R of
//!           best[L] + best[R] + join_cost(L, R)
//! ```
//!
//! where some join predicate connects a table in L to a table in R. Unlike
//! the linear orderings of the exhaustive strategy this admits bushy
//! shapes, so its best cost is never above the exhaustive one.
//!
//! Subsets are keyed by their sorted table-name list, which keeps the memo
//! table readable in traces. Each subplan carries the join sequence that
//! built it, so the winning full-set subplan yields an executable join
//! order, not just a cost.
//!
//! Each subplan also carries its estimated output size, and join costs are
//! taken against the two subplans' sizes. Every linear ordering the
//! exhaustive strategy considers is therefore a left-deep special case of
//! this enumeration at identical cost, which keeps the strategies
//! comparable: DP's best cost never exceeds the exhaustive best.

use rustc_hash::FxHashMap;

use crate::catalog::Catalog;
use crate::core::Result;
use crate::query::{Join, QueryComponents};

use super::cost::join_cost;
use super::{apply_filters, initial_sizes, join_trace_line, Plan, PlanStep, PlanStrategy};

/// A memoized subplan over a subset of the query's tables
#[derive(Debug, Clone)]
struct SubPlan {
    /// Tables covered, kept sorted
    tables: Vec<String>,
    /// Accumulated join cost
    cost: f64,
    /// Estimated output rows of this subset
    size: usize,
    /// Joins applied to build this subset, in execution order
    joins: Vec<Join>,
    /// Trace lines matching `joins`
    trace: Vec<String>,
}

pub struct Dp;

impl PlanStrategy for Dp {
    fn name(&self) -> &'static str {
        "Dp"
    }

    fn generate(&self, catalog: &Catalog, components: &QueryComponents) -> Result<Plan> {
        let mut sizes = initial_sizes(catalog, components)?;
        let mut plan = Plan::default();
        plan.trace
            .push("Estimating costs for dynamic programming join strategy:".to_string());

        apply_filters(catalog, components, &mut sizes, &mut plan)?;

        plan.trace
            .push("Estimating join costs (dynamic programming):".to_string());

        let mut memo: FxHashMap<String, SubPlan> = FxHashMap::default();
        for table in &components.tables {
            memo.insert(
                table.clone(),
                SubPlan {
                    tables: vec![table.clone()],
                    cost: 0.0,
                    size: sizes.get(table).copied().unwrap_or(0),
                    joins: Vec::new(),
                    trace: Vec::new(),
                },
            );
        }

        let relation_count = components.tables.len();
        for subset_size in 2..=relation_count {
            let mut grown: FxHashMap<String, SubPlan> = FxHashMap::default();

            // Sorted key iteration keeps tie-breaks deterministic
            let mut keys: Vec<&String> = memo.keys().collect();
            keys.sort_unstable();

            for left_key in &keys {
                for right_key in &keys {
                    let left = &memo[*left_key];
                    let right = &memo[*right_key];
                    if left.tables.len() + right.tables.len() != subset_size {
                        continue;
                    }
                    if !disjoint(&left.tables, &right.tables) {
                        continue;
                    }

                    for join in &components.joins {
                        if !connects(join, left, right) {
                            continue;
                        }

                        let est = join_cost(left.size, right.size);
                        let output_size = left.size.min(right.size);

                        let mut tables: Vec<String> = left
                            .tables
                            .iter()
                            .chain(&right.tables)
                            .cloned()
                            .collect();
                        tables.sort_unstable();
                        let key = tables.join(",");

                        let cost = left.cost + right.cost + est.cost;
                        if grown
                            .get(&key)
                            .map(|existing| existing.cost <= cost)
                            .unwrap_or(false)
                        {
                            continue;
                        }

                        let mut joins = left.joins.clone();
                        joins.extend(right.joins.iter().cloned());
                        joins.push(join.clone());

                        let mut trace = left.trace.clone();
                        trace.extend(right.trace.iter().cloned());
                        trace.push(join_trace_line(join, &est, output_size));

                        grown.insert(
                            key,
                            SubPlan {
                                tables,
                                cost,
                                size: output_size,
                                joins,
                                trace,
                            },
                        );
                    }
                }
            }
            memo.extend(grown);
        }

        let mut full: Vec<String> = components.tables.clone();
        full.sort_unstable();
        if let Some(winner) = memo.get(&full.join(",")) {
            plan.estimated_cost += winner.cost;
            plan.trace.push("Best join order found:".to_string());
            plan.trace.extend(winner.trace.iter().cloned());
            plan.steps
                .extend(winner.joins.iter().cloned().map(PlanStep::Join));
        }
        Ok(plan)
    }
}

/// Whether two table lists share no table
fn disjoint(left: &[String], right: &[String]) -> bool {
    left.iter().all(|t| !right.contains(t))
}

/// Whether the join predicate crosses from one subplan to the other
fn connects(join: &Join, left: &SubPlan, right: &SubPlan) -> bool {
    let left_has_lhs = left.tables.contains(&join.lhs.table);
    let left_has_rhs = left.tables.contains(&join.rhs.table);
    let right_has_lhs = right.tables.contains(&join.lhs.table);
    let right_has_rhs = right.tables.contains(&join.rhs.table);
    (left_has_lhs && right_has_rhs) || (left_has_rhs && right_has_lhs)
}
