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

//! Greedy strategy: filters first, then neighbor selection from the
//! smallest table
//!
//! Seeds the joined set with the smallest post-filter table, then
//! repeatedly applies the cheapest join that connects a joined table to a
//! not-yet-joined one. O(k²) in the number of joins and suboptimal: a
//! locally cheap join can force an expensive one later, which is exactly
//! the comparison the exhaustive and DP strategies exist to expose.

use rustc_hash::FxHashSet;

use crate::catalog::Catalog;
use crate::core::Result;
use crate::query::{Join, QueryComponents};

use super::cost::join_cost;
use super::{
    apply_filters, apply_join_to_sizes, initial_sizes, join_trace_line, Plan, PlanStep,
    PlanStrategy,
};

pub struct Greedy;

impl PlanStrategy for Greedy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn generate(&self, catalog: &Catalog, components: &QueryComponents) -> Result<Plan> {
        let mut sizes = initial_sizes(catalog, components)?;
        let mut plan = Plan::default();
        plan.trace
            .push("Estimating costs for greedy join strategy:".to_string());

        apply_filters(catalog, components, &mut sizes, &mut plan)?;

        plan.trace
            .push("Estimating join costs (greedy strategy):".to_string());

        let mut remaining: Vec<Join> = components.joins.clone();
        let mut joined: FxHashSet<String> = FxHashSet::default();

        // Seed with the smallest post-filter table; name is the tie-break
        // so the ordering is deterministic
        if let Some(seed) = sizes
            .iter()
            .min_by_key(|(name, size)| (*size, name.as_str()))
            .map(|(name, _)| name.clone())
        {
            joined.insert(seed);
        }

        while !remaining.is_empty() {
            let index = best_connecting_join(&remaining, &joined, &sizes);
            let join = remaining.remove(index);

            let (est, output_size) = apply_join_to_sizes(&join, &mut sizes);
            plan.estimated_cost += est.cost;
            plan.trace.push(join_trace_line(&join, &est, output_size));

            joined.insert(join.lhs.table.clone());
            joined.insert(join.rhs.table.clone());
            plan.steps.push(PlanStep::Join(join));
        }
        Ok(plan)
    }
}

/// Index of the cheapest join connecting a joined table to an unjoined one
///
/// A join qualifies when exactly one side is already in the joined set.
/// When no join qualifies (disconnected join graph), the first remaining
/// join is taken so enumeration always terminates.
fn best_connecting_join(
    remaining: &[Join],
    joined: &FxHashSet<String>,
    sizes: &rustc_hash::FxHashMap<String, usize>,
) -> usize {
    let mut best_index = 0;
    let mut best_cost = f64::MAX;

    for (index, join) in remaining.iter().enumerate() {
        let has_left = joined.contains(&join.lhs.table);
        let has_right = joined.contains(&join.rhs.table);
        if has_left == has_right {
            continue;
        }

        let left_size = sizes.get(&join.lhs.table).copied().unwrap_or(0);
        let right_size = sizes.get(&join.rhs.table).copied().unwrap_or(0);
        let est = join_cost(left_size, right_size);
        if est.cost < best_cost {
            best_cost = est.cost;
            best_index = index;
        }
    }
    best_index
}
