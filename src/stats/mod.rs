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

//! Statistics infrastructure for cost-based planning

pub mod histogram;

pub use histogram::{
    encode_text_prefix, Histogram, IntegerHistogram, TextHistogram, DEFAULT_INTEGER_BUCKETS,
    DEFAULT_TEXT_BUCKETS, INITIAL_INTEGER_BOUNDS,
};
