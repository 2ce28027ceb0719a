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

//! Filters-first strategy: scalar filters in input order, then joins in
//! input order
//!
//! Filters shrink their tables before any join runs, so with selective
//! predicates this dominates [`JoinsFirst`](super::JoinsFirst) on the same
//! query.

use crate::catalog::Catalog;
use crate::core::Result;
use crate::query::QueryComponents;

use super::{
    apply_filters, apply_join_to_sizes, initial_sizes, join_trace_line, Plan, PlanStep,
    PlanStrategy,
};

pub struct FiltersFirst;

impl PlanStrategy for FiltersFirst {
    fn name(&self) -> &'static str {
        "FiltersFirst"
    }

    fn generate(&self, catalog: &Catalog, components: &QueryComponents) -> Result<Plan> {
        let mut sizes = initial_sizes(catalog, components)?;
        let mut plan = Plan::default();
        plan.trace
            .push("Estimating costs for filters-first strategy:".to_string());

        apply_filters(catalog, components, &mut sizes, &mut plan)?;

        plan.trace.push("Estimating join costs:".to_string());
        for join in &components.joins {
            let (est, output_size) = apply_join_to_sizes(join, &mut sizes);
            plan.estimated_cost += est.cost;
            plan.trace.push(join_trace_line(join, &est, output_size));
            plan.steps.push(PlanStep::Join(join.clone()));
        }
        Ok(plan)
    }
}
