// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Askel Project
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use thiserror::Error;
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    #[error("Chart rendering error: {0}")]
    Chart(#[from] ChartError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read data file '{path}': {source}")]
    DataFileError {
        path: String,
        #[source]
        source: polars::error::PolarsError,
    },
    #[error("Empty dataset provided for analysis")]
    EmptyDataset,
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },
    #[error("Duplicate column name after trimming: '{name}'")]
    DuplicateColumnName { name: String },
    #[error("Numeric coercion failed for column '{column}': {source}")]
    NumericCoercion {
        column: String,
        #[source]
        source: polars::error::PolarsError,
    },
    #[error("Failed to profile column '{column}': {reason}")]
    ColumnProfilingError { column: String, reason: String },
}
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Error: No data available for analysis")]
    EmptyInput,
    #[error("Error: Invalid question format")]
    InvalidQuestion,
    #[error("Could not determine the column for mean calculation")]
    MeanColumnUndetermined,
    #[error("Please specify exactly two columns for correlation")]
    CorrelationArity,
    #[error("Not enough valid numeric data to calculate correlation between {col1} and {col2}")]
    InsufficientPairs { col1: String, col2: String },
}
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Unsupported chart type: {kind}")]
    UnsupportedChartType { kind: String },
    #[error("Scatter charts require a second column")]
    MissingSecondColumn,
    #[error("Column '{column}' not found in dataset")]
    MissingColumn { column: String },
    #[error("Column '{column}' has no values that can be rendered")]
    NoRenderableValues { column: String },
    #[error("Failed to create charts directory '{path}': {source}")]
    OutputDirError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Drawing backend failure: {reason}")]
    Backend { reason: String },
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },
}
pub type Result<T> = std::result::Result<T, AnalysisError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
pub type ChartResult<T> = std::result::Result<T, ChartError>;
impl From<DataError> for ChartError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::ColumnNotFound { column } => ChartError::MissingColumn { column },
            other => ChartError::Backend {
                reason: other.to_string(),
            },
        }
    }
}
impl AnalysisError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::Query(_)
                | AnalysisError::Data(DataError::ColumnNotFound { .. })
                | AnalysisError::Chart(ChartError::UnsupportedChartType { .. })
                | AnalysisError::Chart(ChartError::MissingSecondColumn)
        )
    }
    pub fn category(&self) -> &'static str {
        match self {
            AnalysisError::Data(_) => "Data",
            AnalysisError::Query(_) => "Query",
            AnalysisError::Chart(_) => "Chart",
            AnalysisError::Config(_) => "Configuration",
            AnalysisError::Io(_) => "I/O",
            AnalysisError::Serialisation(_) => "Serialisation",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Data(DataError::EmptyDataset) => {
                "The dataset appears to be empty. Please provide data with at least one row."
                    .to_string()
            }
            AnalysisError::Chart(ChartError::Backend { .. }) => {
                "The chart could not be drawn. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}
impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }
}
pub fn error_severity(error: &AnalysisError) -> ErrorSeverity {
    match error {
        AnalysisError::Query(_) => ErrorSeverity::Warning,
        AnalysisError::Data(DataError::ColumnNotFound { .. }) => ErrorSeverity::Warning,
        AnalysisError::Io(_) => ErrorSeverity::Error,
        AnalysisError::Config(_) => ErrorSeverity::Error,
        AnalysisError::Chart(ChartError::Backend { .. }) => ErrorSeverity::Error,
        _ => ErrorSeverity::Error,
    }
}
pub struct ErrorReporter {
    pub show_category: bool,
    pub colored_output: bool,
}
impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            show_category: true,
            colored_output: true,
        }
    }
    pub fn report(&self, error: &AnalysisError) -> String {
        let severity = error_severity(error);
        let mut output = String::new();
        if self.colored_output {
            output.push_str(match severity {
                ErrorSeverity::Info => "\x1b[36m",
                ErrorSeverity::Warning => "\x1b[33m",
                ErrorSeverity::Error => "\x1b[31m",
                ErrorSeverity::Critical => "\x1b[35m",
            });
        }
        output.push_str(&format!("[{}] {}\n", severity.as_str(), error));
        if self.colored_output {
            output.push_str("\x1b[0m");
        }
        if self.show_category {
            output.push_str(&format!("Category: {}\n", error.category()));
        }
        output
    }
}
impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
