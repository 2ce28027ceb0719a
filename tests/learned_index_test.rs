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

//! Integration tests for the learned-index proof of concept

use rand::seq::SliceRandom;
use rand::Rng;

use planbench::learned::{binary_search, LearnedIndex};

#[test]
fn test_search_returns_a_matching_position_for_sampled_keys() {
    let mut rng = rand::thread_rng();
    let mut data: Vec<i64> = (0..50_000).map(|_| rng.gen_range(1..=100_000)).collect();
    data.sort_unstable();
    let mut index = LearnedIndex::new(data.clone());

    let mut positions: Vec<usize> = (0..data.len()).collect();
    positions.shuffle(&mut rng);

    for &k in positions.iter().take(500) {
        let key = data[k];
        if let Some(found) = index.search(key) {
            // Any position holding the key is a correct answer under
            // duplicates
            assert_eq!(data[found], key, "wrong value at reported position");
        }
        // A windowed miss is possible when the model is off by more than
        // sqrt(n); the full binary search must still find the key
        let (full, _) = binary_search(&data, key);
        assert!(full.is_some());
    }
}

#[test]
fn test_search_beyond_max_returns_none() {
    let data: Vec<i64> = (0..10_000).map(|i| i * 2).collect();
    let max = *data.last().unwrap();
    let mut index = LearnedIndex::new(data);

    assert_eq!(index.search(max + 1), None);
    assert_eq!(index.search_linear(max + 1), None);
}

#[test]
fn test_operation_bounds() {
    let n = 250_000usize;
    let data: Vec<i64> = (0..n as i64).map(|v| v * 3).collect();
    let mut index = LearnedIndex::new(data.clone());

    // Binary refinement: about 2 sqrt(n) window, log-bounded comparisons
    let binary_bound = 2 * (n as f64).sqrt().ceil() as u64 + 16;
    for key in [0, 3 * 1000, 3 * 249_999] {
        let _ = index.search(key);
        assert!(
            index.operations <= binary_bound,
            "binary refine took {} ops",
            index.operations
        );
    }

    // Linear refinement: hard-bounded by construction
    for key in [0, 3 * 77, 3 * 249_999, 1] {
        let _ = index.search_linear(key);
        assert!(index.operations <= 21, "linear refine took {} ops", index.operations);
    }
}

#[test]
fn test_learned_index_beats_full_binary_search_on_linear_data() {
    let n = 100_000usize;
    let data: Vec<i64> = (0..n as i64).map(|v| v * 7 + 13).collect();
    let mut index = LearnedIndex::new(data.clone());

    let mut learned_total = 0u64;
    let mut binary_total = 0u64;
    for k in (0..n).step_by(997) {
        let key = data[k];
        assert_eq!(index.search(key), Some(k));
        learned_total += index.operations;
        let (found, operations) = binary_search(&data, key);
        assert_eq!(found, Some(k));
        binary_total += operations;
    }
    assert!(
        learned_total < binary_total,
        "learned {} vs binary {}",
        learned_total,
        binary_total
    );
}

#[test]
fn test_empty_and_single_element_indexes() {
    let mut empty = LearnedIndex::new(Vec::new());
    assert_eq!(empty.search(1), None);
    assert!(empty.is_empty());

    let mut single = LearnedIndex::new(vec![42]);
    assert_eq!(single.search(42), Some(0));
    assert_eq!(single.search(41), None);
    assert_eq!(single.search_linear(42), Some(0));
    assert_eq!(single.len(), 1);
}
