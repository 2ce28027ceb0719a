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

//! Join-order linearizations over a [`JoinGraph`]
//!
//! [`ikkbz_order`] is the primary algorithm: rank every relation, start at
//! the lowest rank and grow a left-deep ordering by always taking the
//! lowest-ranked unvisited neighbor of the current tail. It requires an
//! acyclic graph.
//!
//! [`random_order`], [`greedy_order`] and [`dp_order`] produce orderings
//! for the same graph so the strategies can be benchmarked side by side
//! with [`estimate_order_cost`] and [`execute_order`].

use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;

use crate::core::{Error, Result};

use super::{JoinGraph, Record};

/// Maximum relation count for the bitmask DP ordering
pub const DP_MAX_RELATIONS: usize = 16;

/// Rank a relation for IKKBZ ordering
///
/// `size · Π over incident edges (selectivity · neighbor size) · ln(w)`
/// where `w` is the payload width of the relation's first record. Lower
/// rank means the relation is joined earlier.
fn relation_rank(graph: &JoinGraph, name: &str) -> Result<f64> {
    let relation = graph.relation(name)?;
    let mut rank = relation.size as f64;

    for edge in &graph.edges {
        if edge.left != name && edge.right != name {
            continue;
        }
        let other = if edge.left == name {
            &edge.right
        } else {
            &edge.left
        };
        rank *= edge.selectivity * graph.relation(other)?.size as f64;
    }

    let width = relation
        .records
        .first()
        .map(|r| r.payload.len())
        .unwrap_or(1)
        .max(1);
    Ok(rank * (width as f64).ln())
}

/// IKKBZ-style ordering over an acyclic join graph
///
/// Fails with [`Error::AcyclicRequired`] when the graph contains a cycle.
pub fn ikkbz_order(graph: &JoinGraph) -> Result<Vec<String>> {
    if !graph.is_acyclic() {
        return Err(Error::AcyclicRequired);
    }
    if graph.relations.is_empty() {
        return Ok(Vec::new());
    }

    let mut order = Vec::with_capacity(graph.relations.len());
    let mut processed = FxHashSet::default();

    let start = lowest_ranked(graph, graph.relations.iter().map(|r| r.name.as_str()))?
        .ok_or(Error::AcyclicRequired)?;
    processed.insert(start.clone());
    order.push(start);

    while order.len() < graph.relations.len() {
        let tail = order.last().map(String::as_str).unwrap_or_default();
        let candidates = graph
            .neighbors(tail)
            .iter()
            .map(String::as_str)
            .filter(|n| !processed.contains(*n));
        let Some(next) = lowest_ranked(graph, candidates)? else {
            // Disconnected graph: the tail has no unvisited neighbor
            break;
        };
        processed.insert(next.clone());
        order.push(next);
    }
    Ok(order)
}

/// The lowest-ranked name among candidates, if any
fn lowest_ranked<'a>(
    graph: &JoinGraph,
    candidates: impl Iterator<Item = &'a str>,
) -> Result<Option<String>> {
    let mut best: Option<(f64, &str)> = None;
    for name in candidates {
        let rank = relation_rank(graph, name)?;
        match best {
            Some((best_rank, _)) if rank >= best_rank => {}
            _ => best = Some((rank, name)),
        }
    }
    Ok(best.map(|(_, name)| name.to_string()))
}

/// A uniformly shuffled ordering, the benchmarking control
pub fn random_order(graph: &JoinGraph) -> Vec<String> {
    let mut order: Vec<String> = graph.relations.iter().map(|r| r.name.clone()).collect();
    order.shuffle(&mut rand::thread_rng());
    order
}

/// Greedy ordering by edge selectivity
///
/// Starts at the smallest relation and repeatedly follows the
/// lowest-selectivity edge from the current tail to a remaining relation;
/// when the tail has no such edge, the smallest remaining relation is
/// taken instead.
pub fn greedy_order(graph: &JoinGraph) -> Vec<String> {
    let mut order = Vec::with_capacity(graph.relations.len());
    let mut remaining: FxHashSet<&str> =
        graph.relations.iter().map(|r| r.name.as_str()).collect();

    let Some(start) = graph.relations.iter().min_by_key(|r| (r.size, r.name.as_str())) else {
        return order;
    };
    remaining.remove(start.name.as_str());
    order.push(start.name.clone());

    while !remaining.is_empty() {
        let tail = order.last().map(String::as_str).unwrap_or_default();

        let mut best: Option<(f64, &str)> = None;
        for edge in &graph.edges {
            let candidate = if edge.left == tail && remaining.contains(edge.right.as_str()) {
                edge.right.as_str()
            } else if edge.right == tail && remaining.contains(edge.left.as_str()) {
                edge.left.as_str()
            } else {
                continue;
            };
            match best {
                Some((sel, _)) if edge.selectivity >= sel => {}
                _ => best = Some((edge.selectivity, candidate)),
            }
        }

        let next = match best {
            Some((_, name)) => name.to_string(),
            None => {
                // No edge from the tail: fall back to the smallest
                // remaining relation
                let mut smallest: Option<(usize, &str)> = None;
                for relation in &graph.relations {
                    if !remaining.contains(relation.name.as_str()) {
                        continue;
                    }
                    match smallest {
                        Some((size, _)) if relation.size >= size => {}
                        _ => smallest = Some((relation.size, relation.name.as_str())),
                    }
                }
                match smallest {
                    Some((_, name)) => name.to_string(),
                    None => break,
                }
            }
        };
        remaining.remove(next.as_str());
        order.push(next);
    }
    order
}

/// Bitmask dynamic-programming ordering
///
/// `cost[mask][i]` is the cheapest way to reach the subset `mask` ending
/// at relation `i`; extending multiplies by the connecting edge's
/// selectivity, or by 1 when no edge exists. The ordering is rebuilt from
/// parent pointers. Limited to [`DP_MAX_RELATIONS`] relations.
pub fn dp_order(graph: &JoinGraph) -> Result<Vec<String>> {
    let n = graph.relations.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if n > DP_MAX_RELATIONS {
        return Err(Error::unsupported(format!(
            "dp ordering handles at most {} relations",
            DP_MAX_RELATIONS
        )));
    }

    let subsets = 1usize << n;
    let mut cost = vec![vec![f64::MAX; n]; subsets];
    let mut parent = vec![vec![usize::MAX; n]; subsets];

    for (i, relation) in graph.relations.iter().enumerate() {
        cost[1 << i][i] = relation.size as f64;
    }

    for mask in 1..subsets {
        for last in 0..n {
            if mask & (1 << last) == 0 {
                continue;
            }
            let prev_mask = mask ^ (1 << last);
            if prev_mask == 0 {
                continue;
            }
            for prev in 0..n {
                if prev_mask & (1 << prev) == 0 || cost[prev_mask][prev] == f64::MAX {
                    continue;
                }
                let factor = edge_selectivity(graph, last, prev).unwrap_or(1.0);
                let extended = cost[prev_mask][prev] * factor;
                if extended < cost[mask][last] {
                    cost[mask][last] = extended;
                    parent[mask][last] = prev;
                }
            }
        }
    }

    let full = subsets - 1;
    let mut last = 0;
    for i in 1..n {
        if cost[full][i] < cost[full][last] {
            last = i;
        }
    }

    let mut order = Vec::with_capacity(n);
    let mut mask = full;
    let mut current = last;
    while mask > 0 {
        order.push(graph.relations[current].name.clone());
        let next = parent[mask][current];
        mask ^= 1 << current;
        if next == usize::MAX {
            break;
        }
        current = next;
    }
    order.reverse();
    Ok(order)
}

/// Selectivity of the edge between two relations by index, if one exists
fn edge_selectivity(graph: &JoinGraph, a: usize, b: usize) -> Option<f64> {
    let a = &graph.relations[a].name;
    let b = &graph.relations[b].name;
    graph
        .edges
        .iter()
        .find(|e| (&e.left == a && &e.right == b) || (&e.left == b && &e.right == a))
        .map(|e| e.selectivity)
}

/// Estimated cost of an ordering: the product of adjacent-edge
/// selectivities, with factor 1 for adjacent pairs that share no edge
pub fn estimate_order_cost(graph: &JoinGraph, order: &[String]) -> f64 {
    let mut cost = 1.0;
    for pair in order.windows(2) {
        let sel = graph
            .edges
            .iter()
            .find(|e| {
                (e.left == pair[0] && e.right == pair[1])
                    || (e.left == pair[1] && e.right == pair[0])
            })
            .map(|e| e.selectivity)
            .unwrap_or(1.0);
        cost *= sel;
    }
    cost
}

/// Execute nested-loop record joins along an ordering
///
/// Folds the relations left to right, keeping id-equal pairs and
/// concatenating payloads, exactly what the benchmark harness measures.
pub fn execute_order(graph: &JoinGraph, order: &[String]) -> Result<Vec<Record>> {
    let Some(first) = order.first() else {
        return Ok(Vec::new());
    };
    let mut result = graph.relation(first)?.records.clone();

    for name in &order[1..] {
        let right = &graph.relation(name)?.records;
        let mut joined = Vec::new();
        for l in &result {
            for r in right {
                if l.id == r.id {
                    joined.push(Record {
                        id: l.id,
                        payload: format!("{}-{}", l.payload, r.payload),
                    });
                }
            }
        }
        result = joined;
    }
    Ok(result)
}
