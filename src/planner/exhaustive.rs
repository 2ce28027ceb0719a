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

//! Exhaustive-permutation strategy: filters first, then the cheapest of
//! every permutation of the join list
//!
//! Enumerates all `k!` linear join orderings, costing each against a copy
//! of the post-filter size map. `k` is the number of join predicates in
//! the query, small for the workloads this engine teaches with; there is
//! no cutoff.

use crate::catalog::Catalog;
use crate::core::Result;
use crate::query::{Join, QueryComponents};

use super::{
    apply_filters, apply_join_to_sizes, initial_sizes, join_trace_line, Plan, PlanStep,
    PlanStrategy,
};

pub struct ExhaustivePermutation;

impl PlanStrategy for ExhaustivePermutation {
    fn name(&self) -> &'static str {
        "ExhaustivePermutation"
    }

    fn generate(&self, catalog: &Catalog, components: &QueryComponents) -> Result<Plan> {
        let mut sizes = initial_sizes(catalog, components)?;
        let mut plan = Plan::default();
        plan.trace
            .push("Estimating costs for optimal-join-order strategy:".to_string());

        apply_filters(catalog, components, &mut sizes, &mut plan)?;

        plan.trace
            .push("Trying all possible join orders:".to_string());

        let mut best_cost = f64::MAX;
        let mut best_order: Vec<Join> = Vec::new();
        let mut best_trace: Vec<String> = Vec::new();

        let mut joins = components.joins.clone();
        let count = joins.len();
        permute(&mut joins, 0, &mut |order| {
            let mut current_sizes = sizes.clone();
            let mut current_cost = 0.0;
            let mut current_trace = Vec::with_capacity(count);

            for join in order {
                let (est, output_size) = apply_join_to_sizes(join, &mut current_sizes);
                current_cost += est.cost;
                current_trace.push(join_trace_line(join, &est, output_size));
            }

            if current_cost < best_cost {
                best_cost = current_cost;
                best_order = order.to_vec();
                best_trace = current_trace;
            }
        });

        plan.trace.push(format!(
            "Best join order found all permutations (Cost: {:.2}):",
            best_cost
        ));
        plan.trace.extend(best_trace);
        plan.estimated_cost += best_cost;
        plan.steps
            .extend(best_order.into_iter().map(PlanStep::Join));
        Ok(plan)
    }
}

/// Visit every permutation of `items` in place
fn permute<T, F: FnMut(&[T])>(items: &mut Vec<T>, start: usize, visit: &mut F) {
    if start == items.len() {
        visit(items);
        return;
    }
    for i in start..items.len() {
        items.swap(start, i);
        permute(items, start + 1, visit);
        items.swap(start, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Table;
    use crate::core::{DataType, Value};
    use crate::query::ColumnRef;

    fn chain_catalog() -> (Catalog, QueryComponents) {
        let mut catalog = Catalog::new();
        for (name, rows) in [("a", 10usize), ("b", 1000), ("c", 20)] {
            let mut table = Table::new(name);
            table.add_column("id", name, DataType::Integer);
            for id in 0..rows {
                table.add_row(vec![Value::integer(id as i64)]).unwrap();
            }
            table.recompute_integer_histograms();
            catalog.add_table(table);
        }

        let components = QueryComponents {
            tables: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            scalar_filters: vec![],
            dynamic_filters: vec![],
            joins: vec![
                Join {
                    lhs: ColumnRef::new("a", "id"),
                    rhs: ColumnRef::new("b", "id"),
                },
                Join {
                    lhs: ColumnRef::new("b", "id"),
                    rhs: ColumnRef::new("c", "id"),
                },
            ],
        };
        (catalog, components)
    }

    #[test]
    fn test_permute_visits_all_orderings() {
        let mut items = vec![1, 2, 3];
        let mut seen = Vec::new();
        permute(&mut items, 0, &mut |order| seen.push(order.to_vec()));
        assert_eq!(seen.len(), 6);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_picks_cheapest_permutation() {
        let (catalog, components) = chain_catalog();
        let plan = ExhaustivePermutation.generate(&catalog, &components).unwrap();

        // Joining a-b first shrinks b to 10 before it meets c; the reverse
        // order pays the 1000-row b against c. The cheap order wins.
        assert_eq!(plan.steps.len(), 2);
        let PlanStep::Join(first) = &plan.steps[0] else {
            panic!("expected join step");
        };
        assert_eq!(first.lhs.table, "a");

        // Never worse than the input-order baseline
        let baseline = crate::planner::FiltersFirst
            .generate(&catalog, &components)
            .unwrap();
        assert!(plan.estimated_cost <= baseline.estimated_cost + 1e-9);
    }

    #[test]
    fn test_no_joins_yields_filter_only_plan() {
        let (catalog, _) = chain_catalog();
        let components = QueryComponents {
            tables: vec!["a".to_string()],
            ..Default::default()
        };
        let plan = ExhaustivePermutation.generate(&catalog, &components).unwrap();
        assert!(plan.steps.is_empty());
        assert_eq!(plan.estimated_cost, 0.0);
    }
}
