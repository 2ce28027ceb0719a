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

//! Error types for planbench
//!
//! This module defines all error types used throughout the engine.

use thiserror::Error;

use super::types::Operator;

/// Result type alias for planbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for planbench operations
///
/// This enum covers all error cases including both sentinel errors
/// and structured errors with context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // =========================================================================
    // Catalog ingestion errors
    // =========================================================================
    /// A schema or data file could not be opened
    #[error("could not open '{path}': {message}")]
    FileOpen { path: String, message: String },

    /// A schema or data file line could not be parsed
    #[error("schema parse error: {0}")]
    SchemaParse(String),

    /// Unknown column type keyword in a schema file
    #[error("unknown column type: {0}")]
    UnknownType(String),

    // =========================================================================
    // Catalog lookup errors
    // =========================================================================
    /// Table not found in the catalog
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Column not found in a table schema
    #[error("column '{table}.{column}' not found")]
    ColumnNotFound { table: String, column: String },

    // =========================================================================
    // Row and comparison errors
    // =========================================================================
    /// Row length does not match the table's column count
    #[error("row for table '{table}' has {got} fields, expected {expected}")]
    RowArityMismatch {
        table: String,
        expected: usize,
        got: usize,
    },

    /// Value tag disagreement: a row field, a filter literal, or the two
    /// sides of a join do not share a type
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    // =========================================================================
    // Estimation errors
    // =========================================================================
    /// Selectivity was requested for an operator the histogram cannot answer
    #[error("selectivity unsupported for operator '{0}'")]
    PredicateUnsupported(Operator),

    // =========================================================================
    // Query validation errors
    // =========================================================================
    /// Structural problem in the decomposed query
    #[error("query validation failed: {0}")]
    QueryValidation(String),

    // =========================================================================
    // Optimizer and executor errors
    // =========================================================================
    /// The graph-ranking optimizer was handed a cyclic join graph
    #[error("join graph must be acyclic")]
    AcyclicRequired,

    /// The executor was asked to run a plan with no generated steps
    #[error("plan has not been generated")]
    PlanNotReady,

    /// Operation outside the engine's supported surface
    #[error("not supported: {0}")]
    Unsupported(String),

    /// IO error (wrapped)
    #[error("IO error: {message}")]
    Io { message: String },
}

impl Error {
    /// Create a new FileOpen error
    pub fn file_open(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::FileOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new SchemaParse error
    pub fn schema_parse(message: impl Into<String>) -> Self {
        Error::SchemaParse(message.into())
    }

    /// Create a new ColumnNotFound error
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create a new RowArityMismatch error
    pub fn row_arity_mismatch(table: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::RowArityMismatch {
            table: table.into(),
            expected,
            got,
        }
    }

    /// Create a new TypeMismatch error
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Error::TypeMismatch(message.into())
    }

    /// Create a new QueryValidation error
    pub fn query_validation(message: impl Into<String>) -> Self {
        Error::QueryValidation(message.into())
    }

    /// Create a new Unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported(message.into())
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::TableNotFound(_) | Error::ColumnNotFound { .. }
        )
    }

    /// Check if this error arose while loading the catalog
    pub fn is_ingestion_error(&self) -> bool {
        matches!(
            self,
            Error::FileOpen { .. }
                | Error::SchemaParse(_)
                | Error::UnknownType(_)
                | Error::Io { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}
