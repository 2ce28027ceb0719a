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

//! Plan enumeration strategies
//!
//! Every strategy consumes the catalog and a decomposed query and emits a
//! [`Plan`]: an ordered list of physical steps, an estimated total cost and
//! a human-readable trace. The strategies differ only in how they order
//! filters relative to joins and how they permute the join list:
//!
//! | Strategy | Ordering |
//! |---|---|
//! | [`JoinsFirst`] | joins in input order, then filters in input order |
//! | [`FiltersFirst`] | filters in input order, then joins in input order |
//! | [`ExhaustivePermutation`] | filters first, then the cheapest of all join permutations |
//! | [`Greedy`] | filters first, then cheapest connecting join from the smallest table |
//! | [`Dp`] | filters first, then dynamic programming over relation subsets |
//!
//! All strategies share the cost model in [`cost`] and maintain a working
//! table-size map that is updated after every applied step; a join
//! overwrites both participants' sizes with the estimated output size.
//!
//! [`JoinsFirst`]: joins_first::JoinsFirst
//! [`FiltersFirst`]: filters_first::FiltersFirst
//! [`ExhaustivePermutation`]: exhaustive::ExhaustivePermutation
//! [`Greedy`]: greedy::Greedy
//! [`Dp`]: dp::Dp

pub mod cost;
pub mod dp;
pub mod exhaustive;
pub mod filters_first;
pub mod greedy;
pub mod joins_first;

pub use dp::Dp;
pub use exhaustive::ExhaustivePermutation;
pub use filters_first::FiltersFirst;
pub use greedy::Greedy;
pub use joins_first::JoinsFirst;

use std::fmt;
use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::catalog::Catalog;
use crate::core::Result;
use crate::query::{Join, QueryComponents, ScalarFilter};

use self::cost::{filter_cost, filter_output_size, join_cost, join_output_size, CostEstimate};

/// One physical step of a plan, in execution order
#[derive(Debug, Clone)]
pub enum PlanStep {
    /// Apply a scalar filter to the named table's current relation
    Filter(ScalarFilter),
    /// Join the current relations of the two named tables
    Join(Join),
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStep::Filter(filter) => write!(f, "Filter: {}", filter),
            PlanStep::Join(join) => write!(f, "Join: {}", join),
        }
    }
}

/// A generated physical plan
#[derive(Debug, Clone, Default)]
pub struct Plan {
    /// Steps in the order the executor must apply them
    pub steps: Vec<PlanStep>,
    /// Estimated total cost under the shared cost model
    pub estimated_cost: f64,
    /// Human-readable per-step trace for reporting
    pub trace: Vec<String>,
}

impl Plan {
    /// Render the execution order, one step per line
    pub fn execution_order(&self) -> String {
        let mut out = String::from("Execution Order of Components:\n");
        for step in &self.steps {
            out.push_str(&format!("  {}\n", step));
        }
        out
    }
}

/// A plan enumeration strategy
pub trait PlanStrategy {
    /// Strategy name used in reports
    fn name(&self) -> &'static str;

    /// Produce a plan for the query
    fn generate(&self, catalog: &Catalog, components: &QueryComponents) -> Result<Plan>;
}

/// A plan together with the strategy that produced it and how long the
/// enumeration took
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub strategy: &'static str,
    pub plan: Plan,
    pub generation_ms: f64,
}

/// Harness that runs every strategy and selects the cheapest plan
pub struct Planner;

impl Planner {
    /// All strategies in declaration order
    ///
    /// Declaration order doubles as the tie-break when plans report equal
    /// cost.
    pub fn strategies() -> Vec<Box<dyn PlanStrategy>> {
        vec![
            Box::new(JoinsFirst),
            Box::new(FiltersFirst),
            Box::new(ExhaustivePermutation),
            Box::new(Greedy),
            Box::new(Dp),
        ]
    }

    /// Generate a plan per strategy, timing each enumeration
    pub fn generate_all(
        catalog: &Catalog,
        components: &QueryComponents,
    ) -> Result<Vec<GeneratedPlan>> {
        let mut plans = Vec::new();
        for strategy in Self::strategies() {
            let started = Instant::now();
            let plan = strategy.generate(catalog, components)?;
            let generation_ms = started.elapsed().as_secs_f64() * 1_000.0;
            plans.push(GeneratedPlan {
                strategy: strategy.name(),
                plan,
                generation_ms,
            });
        }
        Ok(plans)
    }

    /// The minimum-cost plan; ties go to the earliest strategy
    pub fn best(plans: &[GeneratedPlan]) -> Option<&GeneratedPlan> {
        let mut best: Option<&GeneratedPlan> = None;
        for candidate in plans {
            match best {
                Some(current) if candidate.plan.estimated_cost >= current.plan.estimated_cost => {}
                _ => best = Some(candidate),
            }
        }
        best
    }
}

// =========================================================================
// Shared enumeration mechanics
// =========================================================================

/// Initialize the working size map from catalog row counts
pub(crate) fn initial_sizes(
    catalog: &Catalog,
    components: &QueryComponents,
) -> Result<FxHashMap<String, usize>> {
    let mut sizes = FxHashMap::default();
    for table in &components.tables {
        sizes.insert(table.clone(), catalog.table_size(table)?);
    }
    Ok(sizes)
}

/// Apply every scalar filter in input order, accumulating cost, trace and
/// steps into the plan
pub(crate) fn apply_filters(
    catalog: &Catalog,
    components: &QueryComponents,
    sizes: &mut FxHashMap<String, usize>,
    plan: &mut Plan,
) -> Result<()> {
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
    Ok(())
}

/// Apply one join to the size map: both participants take the output size
pub(crate) fn apply_join_to_sizes(
    join: &Join,
    sizes: &mut FxHashMap<String, usize>,
) -> (CostEstimate, usize) {
    let left_size = sizes.get(&join.lhs.table).copied().unwrap_or(0);
    let right_size = sizes.get(&join.rhs.table).copied().unwrap_or(0);
    let est = join_cost(left_size, right_size);
    let output_size = join_output_size(left_size, right_size);

    sizes.insert(join.lhs.table.clone(), output_size);
    sizes.insert(join.rhs.table.clone(), output_size);
    (est, output_size)
}

/// Trace line for a filter step
pub(crate) fn filter_trace_line(
    filter: &ScalarFilter,
    est: &CostEstimate,
    output_size: usize,
) -> String {
    format!(
        "  Filter {} (Cost: {:.2}, Selectivity: {:.4}, Output size: {})",
        filter.target, est.cost, est.selectivity, output_size
    )
}

/// Trace line for a join step
pub(crate) fn join_trace_line(join: &Join, est: &CostEstimate, output_size: usize) -> String {
    format!(
        "  Join {} (Cost: {:.2}, Selectivity: {:.4}, Output size: {})",
        join, est.cost, est.selectivity, output_size
    )
}
