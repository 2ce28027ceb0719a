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

//! Standalone join-graph ordering
//!
//! Independent of the catalog-driven planners: relations here are labeled
//! nodes with sizes and record payloads, edges carry join selectivities,
//! and orderings are linearizations of the graph. The primary algorithm is
//! the IKKBZ-style greedy ranking in [`ordering::ikkbz_order`]; random,
//! greedy-by-selectivity and bitmask-DP orderings exist for comparison on
//! the same graph.

pub mod ordering;

pub use ordering::{
    dp_order, estimate_order_cost, execute_order, greedy_order, ikkbz_order, random_order,
};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{Error, Result};

/// One record of a relation: a join key plus an opaque payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub payload: String,
}

/// A relation in the join graph
#[derive(Debug, Clone)]
pub struct Relation {
    pub name: String,
    pub size: usize,
    pub records: Vec<Record>,
}

/// An undirected edge weighted by join selectivity
#[derive(Debug, Clone)]
pub struct JoinEdge {
    pub left: String,
    pub right: String,
    pub selectivity: f64,
}

/// An undirected, selectivity-weighted join graph
#[derive(Debug, Default, Clone)]
pub struct JoinGraph {
    pub relations: Vec<Relation>,
    pub edges: Vec<JoinEdge>,
    adjacency: FxHashMap<String, Vec<String>>,
}

impl JoinGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relation node
    pub fn add_relation(&mut self, relation: Relation) {
        self.adjacency.entry(relation.name.clone()).or_default();
        self.relations.push(relation);
    }

    /// Add an undirected edge between two relations
    pub fn add_edge(&mut self, left: impl Into<String>, right: impl Into<String>, selectivity: f64) {
        let left = left.into();
        let right = right.into();
        self.adjacency
            .entry(left.clone())
            .or_default()
            .push(right.clone());
        self.adjacency
            .entry(right.clone())
            .or_default()
            .push(left.clone());
        self.edges.push(JoinEdge {
            left,
            right,
            selectivity,
        });
    }

    /// Neighbors of a relation
    pub fn neighbors(&self, name: &str) -> &[String] {
        self.adjacency
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a relation by name
    pub fn relation(&self, name: &str) -> Result<&Relation> {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Check acyclicity by DFS with parent exclusion
    ///
    /// The walk starts from the first relation; an empty graph is acyclic.
    pub fn is_acyclic(&self) -> bool {
        let Some(start) = self.relations.first() else {
            return true;
        };
        let mut visited = FxHashSet::default();
        !self.has_cycle(&start.name, None, &mut visited)
    }

    fn has_cycle(
        &self,
        current: &str,
        parent: Option<&str>,
        visited: &mut FxHashSet<String>,
    ) -> bool {
        visited.insert(current.to_string());
        for neighbor in self.neighbors(current) {
            if Some(neighbor.as_str()) == parent {
                continue;
            }
            if visited.contains(neighbor) || self.has_cycle(neighbor, Some(current), visited) {
                return true;
            }
        }
        false
    }
}
