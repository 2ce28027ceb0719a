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

//! Joins-first strategy: joins in input order, then filters in input order
//!
//! The pessimistic baseline: joins run against unfiltered inputs, so the
//! nested-loop CPU term sees full table sizes. Kept as the comparison
//! anchor for the other strategies.

use crate::catalog::Catalog;
use crate::core::Result;
use crate::query::QueryComponents;

use super::cost::{filter_cost, filter_output_size};
use super::{
    apply_join_to_sizes, filter_trace_line, initial_sizes, join_trace_line, Plan, PlanStep,
    PlanStrategy,
};

pub struct JoinsFirst;

impl PlanStrategy for JoinsFirst {
    fn name(&self) -> &'static str {
        "JoinsFirst"
    }

    fn generate(&self, catalog: &Catalog, components: &QueryComponents) -> Result<Plan> {
        let mut sizes = initial_sizes(catalog, components)?;
        let mut plan = Plan::default();
        plan.trace
            .push("Estimating costs for joins-first strategy:".to_string());

        plan.trace.push("Estimating join costs:".to_string());
        for join in &components.joins {
            let (est, output_size) = apply_join_to_sizes(join, &mut sizes);
            plan.estimated_cost += est.cost;
            plan.trace.push(join_trace_line(join, &est, output_size));
            plan.steps.push(PlanStep::Join(join.clone()));
        }

        plan.trace.push("Estimating filter costs:".to_string());
        for filter in &components.scalar_filters {
            let input_size = sizes.get(&filter.target.table).copied().unwrap_or(0);
            let est = filter_cost(catalog, filter, input_size)?;
            let output_size = filter_output_size(input_size, est.selectivity);
            sizes.insert(filter.target.table.clone(), output_size);

            plan.estimated_cost += est.cost;
            plan.trace.push(filter_trace_line(filter, &est, output_size));
            plan.steps.push(PlanStep::Filter(filter.clone()));
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Table;
    use crate::core::{DataType, Operator, Value};
    use crate::planner::FiltersFirst;
    use crate::query::{ColumnRef, Join, ScalarFilter};

    fn fixture() -> (Catalog, QueryComponents) {
        let mut catalog = Catalog::new();

        let mut movie = Table::new("movie");
        movie.add_column("id", "movie", DataType::Integer);
        for id in 0..200 {
            movie.add_row(vec![Value::integer(id)]).unwrap();
        }
        movie.recompute_integer_histograms();
        catalog.add_table(movie);

        let mut casts = Table::new("casts");
        casts.add_column("mid", "casts", DataType::Integer);
        for id in 0..100 {
            casts.add_row(vec![Value::integer(id)]).unwrap();
        }
        casts.recompute_integer_histograms();
        catalog.add_table(casts);

        let components = QueryComponents {
            tables: vec!["movie".to_string(), "casts".to_string()],
            scalar_filters: vec![ScalarFilter {
                target: ColumnRef::new("movie", "id"),
                op: Operator::Eq,
                value: Value::integer(7),
            }],
            dynamic_filters: vec![],
            joins: vec![Join {
                lhs: ColumnRef::new("movie", "id"),
                rhs: ColumnRef::new("casts", "mid"),
            }],
        };
        (catalog, components)
    }

    #[test]
    fn test_steps_are_joins_then_filters() {
        let (catalog, components) = fixture();
        let plan = JoinsFirst.generate(&catalog, &components).unwrap();
        assert!(matches!(plan.steps[0], PlanStep::Join(_)));
        assert!(matches!(plan.steps[1], PlanStep::Filter(_)));
    }

    #[test]
    fn test_selective_filter_favors_filters_first() {
        let (catalog, components) = fixture();
        let joins_first = JoinsFirst.generate(&catalog, &components).unwrap();
        let filters_first = FiltersFirst.generate(&catalog, &components).unwrap();
        assert!(filters_first.estimated_cost <= joins_first.estimated_cost);
    }
}
