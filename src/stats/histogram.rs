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

//! Equi-width histograms for selectivity estimation
//!
//! Every column carries one histogram. Integer columns use
//! [`IntegerHistogram`] directly; text columns use [`TextHistogram`], which
//! maps strings onto a 32-bit prefix encoding and delegates to an integer
//! histogram underneath.
//!
//! Selectivity answers are only as good as the bounds the histogram was
//! built with, so tables refit their integer histograms from the stored
//! min/max after bulk loads and after filter/join materialization.
//!
//! ## Boundary convention
//!
//! Both `>` and `<` selectivities include the bucket containing the probe
//! value, so `sel(<, v) + sel(=, v) + sel(>, v)` can exceed 1 at the
//! boundary. The cost model expects this convention; all planners consume
//! the same numbers, so plan comparisons stay consistent.

use crate::core::{DataType, Error, Operator, Result, Value};

/// Default bucket count for integer column histograms
pub const DEFAULT_INTEGER_BUCKETS: usize = 2000;

/// Default bucket count for text column histograms
pub const DEFAULT_TEXT_BUCKETS: usize = 200;

/// Initial bounds for integer histograms, before the first refit
pub const INITIAL_INTEGER_BOUNDS: (i64, i64) = (0, 1_000_000);

/// Fixed-width equi-width histogram over a closed integer range
#[derive(Debug, Clone)]
pub struct IntegerHistogram {
    /// Inclusive lower bound
    lo: i64,
    /// Inclusive upper bound
    hi: i64,
    /// Bucket width, always at least 1
    width: i64,
    /// Per-bucket counters
    buckets: Vec<u64>,
    /// Total number of values added within bounds
    total: u64,
}

impl IntegerHistogram {
    /// Create an empty histogram over `[lo, hi]` with the given bucket count
    ///
    /// The width is `max(1, ceil((hi - lo + 1) / buckets))` so the final
    /// bucket absorbs any remainder of the range.
    pub fn new(num_buckets: usize, lo: i64, hi: i64) -> Self {
        let num_buckets = num_buckets.max(1);
        let span = (hi - lo + 1).max(1);
        let width = (span + num_buckets as i64 - 1) / num_buckets as i64;
        Self {
            lo,
            hi,
            width: width.max(1),
            buckets: vec![0; num_buckets],
            total: 0,
        }
    }

    /// Inclusive bounds of this histogram
    pub fn bounds(&self) -> (i64, i64) {
        (self.lo, self.hi)
    }

    /// Number of buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of values recorded
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Sum of all bucket counters
    ///
    /// Equals `total()` by construction; exposed so tests can assert the
    /// invariant directly.
    pub fn bucket_sum(&self) -> u64 {
        self.buckets.iter().sum()
    }

    /// Record a value; values outside `[lo, hi]` are ignored
    pub fn add(&mut self, value: i64) {
        if value < self.lo || value > self.hi {
            return;
        }
        let idx = self.bucket_index(value);
        self.buckets[idx] += 1;
        self.total += 1;
    }

    /// Bucket index for a value, clamping out-of-range probes to the bounds
    fn bucket_index(&self, value: i64) -> usize {
        let clamped = value.clamp(self.lo, self.hi);
        let idx = ((clamped - self.lo) / self.width) as usize;
        idx.min(self.buckets.len() - 1)
    }

    /// Estimate the fraction of recorded values satisfying `value op probe`
    ///
    /// Supports `=`, `>` and `<`. Both range operators include the bucket
    /// containing the probe (see the module docs). Other operators fail
    /// with [`Error::PredicateUnsupported`].
    pub fn estimate_selectivity(&self, op: Operator, probe: i64) -> Result<f64> {
        if self.total == 0 {
            return Ok(0.0);
        }
        let b = self.bucket_index(probe);
        let total = self.total as f64;
        let fraction = match op {
            Operator::Eq => self.buckets[b] as f64 / total,
            Operator::Gt => self.buckets[b..].iter().sum::<u64>() as f64 / total,
            Operator::Lt => self.buckets[..=b].iter().sum::<u64>() as f64 / total,
            other => return Err(Error::PredicateUnsupported(other)),
        };
        Ok(fraction)
    }
}

/// Encode a string as a 32-bit integer from its first four bytes
///
/// Bytes are zero-padded on the right and packed big-endian, so the
/// encoding preserves lexicographic order for ASCII prefixes.
pub fn encode_text_prefix(s: &str) -> i64 {
    let mut prefix = [0u8; 4];
    for (slot, byte) in prefix.iter_mut().zip(s.bytes()) {
        *slot = byte;
    }
    i64::from(u32::from_be_bytes(prefix) as i32)
}

/// Histogram over text values via the prefix encoding
///
/// Encodings are clamped to `[encode(""), encode("zzzz")]`, so any
/// reasonable ASCII string lands inside the bucket range.
#[derive(Debug, Clone)]
pub struct TextHistogram {
    inner: IntegerHistogram,
}

impl TextHistogram {
    /// Create an empty text histogram with the given bucket count
    pub fn new(num_buckets: usize) -> Self {
        let lo = encode_text_prefix("");
        let hi = encode_text_prefix("zzzz");
        Self {
            inner: IntegerHistogram::new(num_buckets, lo, hi),
        }
    }

    /// Total number of values recorded
    pub fn total(&self) -> u64 {
        self.inner.total()
    }

    /// Record a string
    pub fn add(&mut self, value: &str) {
        let (lo, hi) = self.inner.bounds();
        self.inner.add(encode_text_prefix(value).clamp(lo, hi));
    }

    /// Estimate selectivity of `value op probe` over the prefix encoding
    pub fn estimate_selectivity(&self, op: Operator, probe: &str) -> Result<f64> {
        let (lo, hi) = self.inner.bounds();
        self.inner
            .estimate_selectivity(op, encode_text_prefix(probe).clamp(lo, hi))
    }
}

/// A column's histogram, tagged by the column's data type
#[derive(Debug, Clone)]
pub enum Histogram {
    Integer(IntegerHistogram),
    Text(TextHistogram),
}

impl Histogram {
    /// Create the default histogram for a column of the given type
    pub fn for_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Integer => Histogram::Integer(IntegerHistogram::new(
                DEFAULT_INTEGER_BUCKETS,
                INITIAL_INTEGER_BOUNDS.0,
                INITIAL_INTEGER_BOUNDS.1,
            )),
            DataType::Text => Histogram::Text(TextHistogram::new(DEFAULT_TEXT_BUCKETS)),
        }
    }

    /// Total number of values recorded
    pub fn total(&self) -> u64 {
        match self {
            Histogram::Integer(h) => h.total(),
            Histogram::Text(h) => h.total(),
        }
    }

    /// Record a value; the value's tag must match the histogram's tag
    pub fn add_value(&mut self, value: &Value) -> Result<()> {
        match (self, value) {
            (Histogram::Integer(h), Value::Integer(v)) => {
                h.add(*v);
                Ok(())
            }
            (Histogram::Text(h), Value::Text(s)) => {
                h.add(s);
                Ok(())
            }
            (hist, value) => Err(Error::type_mismatch(format!(
                "cannot add {} value to {} histogram",
                value.data_type(),
                match hist {
                    Histogram::Integer(_) => DataType::Integer,
                    Histogram::Text(_) => DataType::Text,
                }
            ))),
        }
    }

    /// Estimate selectivity of `column op probe`
    pub fn estimate_selectivity(&self, op: Operator, probe: &Value) -> Result<f64> {
        match (self, probe) {
            (Histogram::Integer(h), Value::Integer(v)) => h.estimate_selectivity(op, *v),
            (Histogram::Text(h), Value::Text(s)) => h.estimate_selectivity(op, s),
            (_, probe) => Err(Error::type_mismatch(format!(
                "histogram probe value has type {}",
                probe.data_type()
            ))),
        }
    }
}
