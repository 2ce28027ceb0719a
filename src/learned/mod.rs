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

//! Learned-index proof of concept
//!
//! A two-parameter linear regression predicts where a key sits in a
//! sorted integer array; a local refinement turns the prediction into an
//! exact answer. Two refinement modes exist:
//!
//! - **binary refine**: binary search within ±√n of the prediction;
//! - **linear refine**: walk at most ten positions left, then at most ten
//!   right, succeeding only if the walk lands on the key.
//!
//! Every comparison increments an `operations` counter that resets per
//! search. The counter is the observable: it is what gets compared
//! against [`binary_search`] over the full array.

use rand::Rng;

/// Closed-form ordinary least squares over (x, y) pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearRegression {
    /// Fit `y = slope * x + intercept`
    pub fn fit(xs: &[f64], ys: &[f64]) -> Self {
        let n = xs.len() as f64;
        if n == 0.0 {
            return Self::default();
        }
        let sum_x: f64 = xs.iter().sum();
        let sum_y: f64 = ys.iter().sum();
        let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
        let sum_x2: f64 = xs.iter().map(|x| x * x).sum();

        let denominator = n * sum_x2 - sum_x * sum_x;
        if denominator == 0.0 {
            return Self {
                slope: 0.0,
                intercept: sum_y / n,
            };
        }
        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        Self {
            slope,
            intercept: (sum_y - slope * sum_x) / n,
        }
    }

    /// Predict y for x
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Maximum walk length per direction in linear-refine mode
const LINEAR_REFINE_STEPS: usize = 10;

/// Position predictor over a sorted ascending `i64` array
#[derive(Debug, Clone)]
pub struct LearnedIndex {
    data: Vec<i64>,
    model: LinearRegression,
    /// Comparisons performed by the most recent search
    pub operations: u64,
}

impl LearnedIndex {
    /// Build an index over sorted data, fitting the model to
    /// (position, value) pairs
    pub fn new(data: Vec<i64>) -> Self {
        debug_assert!(data.windows(2).all(|w| w[0] <= w[1]));
        let xs: Vec<f64> = (0..data.len()).map(|i| i as f64).collect();
        let ys: Vec<f64> = data.iter().map(|&v| v as f64).collect();
        Self {
            model: LinearRegression::fit(&xs, &ys),
            data,
            operations: 0,
        }
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The model's clamped position prediction for a key
    fn predicted_position(&self, key: i64) -> usize {
        if self.data.is_empty() {
            return 0;
        }
        let predicted = self.model.predict(key as f64).round();
        let clamped = predicted.clamp(0.0, (self.data.len() - 1) as f64);
        clamped as usize
    }

    /// Search with binary refinement
    ///
    /// Binary search is confined to a ±√n window around the prediction.
    /// Returns the matched position, or None when the key is absent from
    /// the window.
    pub fn search(&mut self, key: i64) -> Option<usize> {
        self.operations = 0;
        if self.data.is_empty() {
            return None;
        }
        let position = self.predicted_position(key);
        let radius = ((self.data.len() as f64).sqrt() as usize).max(1);
        let left = position.saturating_sub(radius);
        let right = (position + radius).min(self.data.len() - 1);
        self.binary_refine(key, left, right)
    }

    /// Counting binary search within `[left, right]`
    fn binary_refine(&mut self, key: i64, mut left: usize, mut right: usize) -> Option<usize> {
        loop {
            self.operations += 1;
            let mid = left + (right - left) / 2;
            if self.data[mid] == key {
                return Some(mid);
            }
            if self.data[mid] < key {
                left = mid + 1;
            } else {
                if mid == 0 {
                    return None;
                }
                right = mid - 1;
            }
            if left > right {
                return None;
            }
        }
    }

    /// Search with linear refinement
    ///
    /// Walks at most ten positions left while the probe is above the key,
    /// then at most ten right while it is below, and succeeds only when
    /// the walk lands exactly on the key. Bounded at 21 comparisons by
    /// construction.
    pub fn search_linear(&mut self, key: i64) -> Option<usize> {
        self.operations = 0;
        if self.data.is_empty() {
            return None;
        }
        let mut position = self.predicted_position(key);

        for _ in 0..LINEAR_REFINE_STEPS {
            if position == 0 {
                break;
            }
            self.operations += 1;
            if self.data[position] > key {
                position -= 1;
            } else {
                break;
            }
        }
        for _ in 0..LINEAR_REFINE_STEPS {
            if position + 1 >= self.data.len() {
                break;
            }
            self.operations += 1;
            if self.data[position] < key {
                position += 1;
            } else {
                break;
            }
        }

        self.operations += 1;
        if self.data[position] == key {
            Some(position)
        } else {
            None
        }
    }
}

/// Plain binary search over the whole array, counting comparisons
///
/// The baseline the learned index is measured against. Returns the
/// matched position (if any) and the number of comparisons performed.
pub fn binary_search(data: &[i64], key: i64) -> (Option<usize>, u64) {
    let mut operations = 0;
    if data.is_empty() {
        return (None, operations);
    }
    let mut left = 0usize;
    let mut right = data.len() - 1;
    loop {
        operations += 1;
        let mid = left + (right - left) / 2;
        if data[mid] == key {
            return (Some(mid), operations);
        }
        if data[mid] < key {
            left = mid + 1;
        } else {
            if mid == 0 {
                return (None, operations);
            }
            right = mid - 1;
        }
        if left > right {
            return (None, operations);
        }
    }
}

/// Aggregate operation counts from a search comparison run
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonReport {
    pub searches: usize,
    pub learned_operations: u64,
    pub binary_operations: u64,
}

impl ComparisonReport {
    /// Average comparisons per learned-index search
    pub fn learned_average(&self) -> f64 {
        self.learned_operations as f64 / self.searches.max(1) as f64
    }

    /// Average comparisons per plain binary search
    pub fn binary_average(&self) -> f64 {
        self.binary_operations as f64 / self.searches.max(1) as f64
    }
}

/// Run the learned-vs-binary comparison over uniform random data
///
/// Builds a sorted array of `data_size` values drawn from
/// `[1, max_value]`, searches `searches` random keys through both paths
/// and reports total operation counts.
pub fn run_comparison(data_size: usize, max_value: i64, searches: usize) -> ComparisonReport {
    let mut rng = rand::thread_rng();
    let mut data: Vec<i64> = (0..data_size).map(|_| rng.gen_range(1..=max_value)).collect();
    data.sort_unstable();

    let keys: Vec<i64> = (0..searches).map(|_| rng.gen_range(1..=max_value)).collect();
    let mut index = LearnedIndex::new(data.clone());

    let mut report = ComparisonReport {
        searches,
        ..Default::default()
    };
    for key in keys {
        let _ = index.search(key);
        report.learned_operations += index.operations;
        let (_, operations) = binary_search(&data, key);
        report.binary_operations += operations;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_recovers_exact_line() {
        let xs: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x + 7.0).collect();
        let model = LinearRegression::fit(&xs, &ys);
        assert!((model.slope - 3.0).abs() < 1e-9);
        assert!((model.intercept - 7.0).abs() < 1e-9);
        assert!((model.predict(200.0) - 607.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_constant_data() {
        let model = LinearRegression::fit(&[0.0, 1.0, 2.0], &[5.0, 5.0, 5.0]);
        assert!((model.slope - 0.0).abs() < 1e-9);
        assert!((model.intercept - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_search_finds_every_key_in_uniform_data() {
        let data: Vec<i64> = (0..1000).map(|i| i * 3).collect();
        let mut index = LearnedIndex::new(data.clone());
        for (position, &key) in data.iter().enumerate() {
            assert_eq!(index.search(key), Some(position), "key {}", key);
        }
    }

    #[test]
    fn test_search_misses_return_none() {
        let data: Vec<i64> = (0..1000).map(|i| i * 2).collect();
        let mut index = LearnedIndex::new(data);
        assert_eq!(index.search(2001), None);
        assert_eq!(index.search(-5), None);
        assert_eq!(index.search(7), None);
    }

    #[test]
    fn test_search_operation_bound() {
        let n = 10_000usize;
        let data: Vec<i64> = (0..n as i64).collect();
        let mut index = LearnedIndex::new(data);
        // Window is 2 * sqrt(n) + 1 wide, so the refinement needs about
        // log2(2 sqrt(n)) comparisons
        let bound = 2 * (n as f64).sqrt().ceil() as u64 + 16;
        for key in [0, 57, 4_999, 9_999] {
            let _ = index.search(key);
            assert!(index.operations <= bound, "ops {} for key {}", index.operations, key);
        }
    }

    #[test]
    fn test_linear_search_on_perfectly_linear_data() {
        let data: Vec<i64> = (0..500).map(|i| i * 4).collect();
        let mut index = LearnedIndex::new(data.clone());
        for (position, &key) in data.iter().enumerate().step_by(17) {
            assert_eq!(index.search_linear(key), Some(position));
            assert!(index.operations <= 21);
        }
    }

    #[test]
    fn test_linear_search_miss_is_bounded() {
        let data: Vec<i64> = (0..500).map(|i| i * 4).collect();
        let mut index = LearnedIndex::new(data);
        assert_eq!(index.search_linear(5), None);
        assert!(index.operations <= 21);
        assert_eq!(index.search_linear(10_000), None);
        assert!(index.operations <= 21);
    }

    #[test]
    fn test_binary_search_baseline() {
        let data: Vec<i64> = (0..1024).collect();
        let (found, operations) = binary_search(&data, 700);
        assert_eq!(found, Some(700));
        assert!(operations <= 11);
        let (missing, _) = binary_search(&data, 5000);
        assert_eq!(missing, None);
        assert_eq!(binary_search(&[], 1).0, None);
    }

    #[test]
    fn test_comparison_report() {
        let report = run_comparison(10_000, 20_000, 100);
        assert_eq!(report.searches, 100);
        assert!(report.learned_operations > 0);
        assert!(report.binary_operations > 0);
        // On uniform data the learned index beats full binary search on
        // average
        assert!(report.learned_average() <= report.binary_average() * 2.0);
    }
}
