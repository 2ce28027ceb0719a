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

//! Cost model shared by every planner
//!
//! Constants are relative units, not wall-clock time. Estimates are not
//! calibrated against real hardware; they only need to be consistent so
//! that comparing plans is meaningful.
//!
//! ## Approximations
//!
//! - Filter cost is a full scan plus the cost of emitting the retained
//!   fraction: `n * SCAN_COST_FACTOR + n * selectivity`.
//! - Join cost models a nested loop: `(nL + nR) * IO_COST_FACTOR` for
//!   reading both inputs plus `nL * nR * CPU_COST_FACTOR` for the pairwise
//!   comparisons.
//! - Join output size is `min(nL, nR)`: equi-joins are treated as bounded
//!   by a primary key on one side. This understates many-to-many joins,
//!   but every planner shares the assumption, so their cost ranking is
//!   unaffected.
//! - Join selectivity is reported as `min(nL, nR) / max(nL, nR)`; it is a
//!   diagnostic value and does not feed the size computation.

use crate::catalog::Catalog;
use crate::core::Result;
use crate::query::ScalarFilter;

/// Cost to scan one row
pub const SCAN_COST_FACTOR: f64 = 1.0;

/// Cost to read one row into a join
pub const JOIN_IO_COST_FACTOR: f64 = 1.0;

/// Cost of one pairwise comparison in a nested-loop join
pub const JOIN_CPU_COST_FACTOR: f64 = 0.1;

/// A step's estimated cost together with its estimated selectivity
#[derive(Debug, Clone, Copy)]
pub struct CostEstimate {
    pub cost: f64,
    pub selectivity: f64,
}

/// Estimate cost and selectivity for a scalar filter
///
/// `input_size` is the filtered table's current size in the planner's
/// working size map. Selectivity comes from the base table's histogram in
/// the catalog.
pub fn filter_cost(
    catalog: &Catalog,
    filter: &ScalarFilter,
    input_size: usize,
) -> Result<CostEstimate> {
    let table = catalog.get_table(&filter.target.table)?;
    let selectivity = table.estimate_selectivity(&filter.target.column, filter.op, &filter.value)?;
    let n = input_size as f64;
    Ok(CostEstimate {
        cost: n * SCAN_COST_FACTOR + n * selectivity,
        selectivity,
    })
}

/// Output size of a filter: the retained fraction, rounded down
pub fn filter_output_size(input_size: usize, selectivity: f64) -> usize {
    (input_size as f64 * selectivity) as usize
}

/// Estimate cost and selectivity for a nested-loop equi-join
pub fn join_cost(left_size: usize, right_size: usize) -> CostEstimate {
    let (small, large) = if left_size <= right_size {
        (left_size as f64, right_size as f64)
    } else {
        (right_size as f64, left_size as f64)
    };
    let selectivity = if large > 0.0 { small / large } else { 0.0 };

    let io = (left_size + right_size) as f64 * JOIN_IO_COST_FACTOR;
    let cpu = left_size as f64 * right_size as f64 * JOIN_CPU_COST_FACTOR;
    CostEstimate {
        cost: io + cpu,
        selectivity,
    }
}

/// Output size of a join under the primary-key assumption
pub fn join_output_size(left_size: usize, right_size: usize) -> usize {
    left_size.min(right_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_cost_formula() {
        let est = join_cost(100, 1000);
        // io = 1100, cpu = 100 * 1000 * 0.1 = 10000
        assert!((est.cost - 11_100.0).abs() < 1e-9);
        assert!((est.selectivity - 0.1).abs() < 1e-9);
        assert_eq!(join_output_size(100, 1000), 100);
    }

    #[test]
    fn test_join_cost_is_symmetric() {
        let a = join_cost(30, 70);
        let b = join_cost(70, 30);
        assert_eq!(a.cost, b.cost);
        assert_eq!(a.selectivity, b.selectivity);
    }

    #[test]
    fn test_join_with_empty_side() {
        let est = join_cost(0, 50);
        assert_eq!(est.selectivity, 0.0);
        assert_eq!(join_output_size(0, 50), 0);
    }

    #[test]
    fn test_filter_output_rounds_down() {
        assert_eq!(filter_output_size(10, 0.55), 5);
        assert_eq!(filter_output_size(0, 0.5), 0);
    }
}
