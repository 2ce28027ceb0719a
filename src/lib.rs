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

//! # Planbench - teaching-grade relational query engine
//!
//! Planbench is a small in-memory relational engine built to make
//! cost-based query planning observable. It loads a schema and
//! pipe-delimited data into a typed tuple store with per-column
//! histograms, decomposes queries into filters and equi-joins, then
//! generates several alternative physical plans, reports their estimated
//! costs and executes each one so estimates can be compared against
//! measurements.
//!
//! ## Quick Start
//!
//! ```no_run
//! use planbench::catalog::{loader, Catalog};
//! use planbench::executor::Executor;
//! use planbench::planner::Planner;
//! use planbench::query::parse_query;
//!
//! let mut catalog = Catalog::new();
//! loader::load_directory(&mut catalog, "imdb_schema.txt", "data/").unwrap();
//!
//! let query: Vec<String> = "query_start
//! tables: movie, casts
//! scalar_filters: movie.id = 8854
//! joins: movie.id = casts.mid
//! query_end"
//!     .lines()
//!     .map(String::from)
//!     .collect();
//!
//! let components = parse_query(&query, &catalog).unwrap();
//! let plans = Planner::generate_all(&catalog, &components).unwrap();
//! let best = Planner::best(&plans).unwrap();
//! let result = Executor::new(&catalog).execute_plan(&best.plan).unwrap();
//! println!("{} rows", result.row_count());
//! ```
//!
//! ## Modules
//!
//! - [`core`] - fundamental types ([`Value`], [`DataType`], [`Operator`], [`Error`])
//! - [`stats`] - equi-width histograms behind selectivity estimates
//! - [`catalog`] - tables, columns and the delimited-text loaders
//! - [`query`] - the decomposed query IR and its parser
//! - [`planner`] - five plan enumeration strategies over a shared cost model
//! - [`graph`] - standalone join-graph ordering (IKKBZ and friends)
//! - [`executor`] - materializing operators and the step-list driver
//! - [`learned`] - learned-index proof of concept

pub mod catalog;
pub mod core;
pub mod executor;
pub mod graph;
pub mod learned;
pub mod planner;
pub mod query;
pub mod stats;

// Re-export main types for convenience
pub use catalog::{Catalog, Column, Table};
pub use core::{DataType, Error, Operator, Result, Value};
pub use executor::Executor;
pub use graph::JoinGraph;
pub use learned::{LearnedIndex, LinearRegression};
pub use planner::{GeneratedPlan, Plan, PlanStep, PlanStrategy, Planner};
pub use query::{ColumnRef, DynamicFilter, Join, QueryComponents, ScalarFilter};
pub use stats::{Histogram, IntegerHistogram, TextHistogram};
