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

use crate::chart_renderer::{ChartKind, ChartRenderer};
use crate::data_profiler::{joint_numeric_pairs, numeric_values};
use crate::dataset::{self, has_column};
use crate::error::{QueryError, Result};
use once_cell::sync::Lazy;
use polars::prelude::DataFrame;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What the gateway hands back to the caller for every query: a summary
/// line plus the public path of a rendered chart, or an empty string when
/// no chart applies or an error was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub summary: String,
    pub chart_reference: String,
}
impl QueryResponse {
    fn text<S: Into<String>>(summary: S) -> Self {
        Self {
            summary: summary.into(),
            chart_reference: String::new(),
        }
    }
    fn with_chart<S: Into<String>>(summary: S, chart_reference: String) -> Self {
        Self {
            summary: summary.into(),
            chart_reference,
        }
    }
    pub fn has_chart(&self) -> bool {
        !self.chart_reference.is_empty()
    }
}

/// One of the four supported query intents with its extracted arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryIntent {
    Mean { column: String },
    Distribution { column: String },
    CategoryCount { column: String },
    Correlation { column1: String, column2: String },
}

static MEAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mean of (\w+)").expect("valid mean pattern"));
static DISTRIBUTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)show distribution of").expect("valid distribution pattern"));
static CATEGORY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)show count of each category in").expect("valid category pattern")
});
static CORRELATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)find correlation between").expect("valid correlation pattern"));
static AND_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+and\s+").expect("valid split pattern"));

type Extractor = fn(&str) -> std::result::Result<QueryIntent, QueryError>;

/// Priority-ordered matcher table. Detection is a case-insensitive
/// substring test; the first phrase found wins and its extractor pulls the
/// column arguments out of the original, case-preserved question text.
const MATCHERS: [(&str, Extractor); 4] = [
    ("mean of", extract_mean),
    ("show distribution of", extract_distribution),
    ("show count of each category in", extract_category_count),
    ("find correlation between", extract_correlation),
];

pub fn classify(question: &str) -> Option<std::result::Result<QueryIntent, QueryError>> {
    let lowered = question.to_lowercase();
    MATCHERS
        .iter()
        .find(|(phrase, _)| lowered.contains(phrase))
        .map(|(_, extract)| extract(question))
}

fn extract_mean(question: &str) -> std::result::Result<QueryIntent, QueryError> {
    MEAN_RE
        .captures(question)
        .and_then(|caps| caps.get(1))
        .map(|m| QueryIntent::Mean {
            column: m.as_str().trim().to_string(),
        })
        .ok_or(QueryError::MeanColumnUndetermined)
}

fn extract_distribution(question: &str) -> std::result::Result<QueryIntent, QueryError> {
    Ok(QueryIntent::Distribution {
        column: DISTRIBUTION_RE.replace_all(question, "").trim().to_string(),
    })
}

fn extract_category_count(question: &str) -> std::result::Result<QueryIntent, QueryError> {
    Ok(QueryIntent::CategoryCount {
        column: CATEGORY_RE.replace_all(question, "").trim().to_string(),
    })
}

fn extract_correlation(question: &str) -> std::result::Result<QueryIntent, QueryError> {
    let remainder = CORRELATION_RE.replace_all(question, "");
    let remainder = remainder.trim();
    let parts: Vec<&str> = AND_SPLIT_RE.split(remainder).collect();
    if parts.len() != 2 {
        return Err(QueryError::CorrelationArity);
    }
    Ok(QueryIntent::Correlation {
        column1: parts[0].trim().to_string(),
        column2: parts[1].trim().to_string(),
    })
}

const HELP_TEXT: &str = "I couldn't process that question. Here's what I can help with:\n\
                         - 'What is the mean of [column]?'\n\
                         - 'Show distribution of [column]'\n\
                         - 'Show count of each category in [column]'\n\
                         - 'Find correlation between [column1] and [column2]'";

pub struct QueryProcessor {
    renderer: ChartRenderer,
}
impl QueryProcessor {
    pub fn new(renderer: ChartRenderer) -> Self {
        Self { renderer }
    }

    /// Answers a free-text question about the frame. Infallible from the
    /// caller's point of view: validation, computation, and rendering
    /// failures all come back as a descriptive summary with an empty chart
    /// reference, and anything unexpected is caught at this boundary.
    pub fn process_query(&self, df: &DataFrame, question: &str) -> QueryResponse {
        match self.try_process(df, question) {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "unexpected failure while processing query");
                QueryResponse::text(
                    "An unexpected error occurred while processing your query. Please try again.",
                )
            }
        }
    }

    fn try_process(&self, df: &DataFrame, question: &str) -> Result<QueryResponse> {
        if dataset::is_empty(df) {
            return Ok(QueryResponse::text(QueryError::EmptyInput.to_string()));
        }
        let question = question.trim();
        if question.is_empty() {
            return Ok(QueryResponse::text(QueryError::InvalidQuestion.to_string()));
        }
        let df = dataset::normalise(df)?;
        match classify(question) {
            None => Ok(QueryResponse::text(HELP_TEXT)),
            Some(Err(err)) => {
                tracing::debug!(error = %err, question, "question matched a phrase but arguments were malformed");
                Ok(QueryResponse::text(err.to_string()))
            }
            Some(Ok(intent)) => {
                tracing::debug!(?intent, "classified question");
                self.execute(&df, intent)
            }
        }
    }

    fn execute(&self, df: &DataFrame, intent: QueryIntent) -> Result<QueryResponse> {
        match intent {
            QueryIntent::Mean { column } => self.run_mean(df, &column),
            QueryIntent::Distribution { column } => self.run_distribution(df, &column),
            QueryIntent::CategoryCount { column } => self.run_category_count(df, &column),
            QueryIntent::Correlation { column1, column2 } => {
                self.run_correlation(df, &column1, &column2)
            }
        }
    }

    fn run_mean(&self, df: &DataFrame, column: &str) -> Result<QueryResponse> {
        if !has_column(df, column) {
            return Ok(QueryResponse::text(format!(
                "Column '{column}' not found in the data"
            )));
        }
        let values = numeric_values(df, column)?;
        if values.is_empty() {
            return Ok(QueryResponse::text(format!(
                "Error calculating mean for column '{column}'. It may not contain numeric data."
            )));
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Ok(QueryResponse::text(format!(
            "The mean of {column} is {mean:.2}"
        )))
    }

    fn run_distribution(&self, df: &DataFrame, column: &str) -> Result<QueryResponse> {
        if column.is_empty() || !has_column(df, column) {
            return Ok(QueryResponse::text(format!(
                "Could not determine or find column '{column}' for distribution"
            )));
        }
        match self.renderer.render(df, ChartKind::Hist, column, None) {
            Ok(reference) => Ok(QueryResponse::with_chart(
                format!("Distribution chart for {column}"),
                reference,
            )),
            Err(err) => {
                tracing::warn!(error = %err, column, "distribution chart failed");
                Ok(QueryResponse::text(format!(
                    "Error generating distribution chart: {err}"
                )))
            }
        }
    }

    fn run_category_count(&self, df: &DataFrame, column: &str) -> Result<QueryResponse> {
        if column.is_empty() || !has_column(df, column) {
            return Ok(QueryResponse::text(format!(
                "Could not determine or find column '{column}' for category count"
            )));
        }
        match self.renderer.render(df, ChartKind::Bar, column, None) {
            Ok(reference) => Ok(QueryResponse::with_chart(
                format!("Category count chart for {column}"),
                reference,
            )),
            Err(err) => {
                tracing::warn!(error = %err, column, "category count chart failed");
                Ok(QueryResponse::text(format!(
                    "Error generating category count chart: {err}"
                )))
            }
        }
    }

    fn run_correlation(&self, df: &DataFrame, column1: &str, column2: &str) -> Result<QueryResponse> {
        if !has_column(df, column1) || !has_column(df, column2) {
            return Ok(QueryResponse::text(format!(
                "Could not find one or both columns: '{column1}' and '{column2}'"
            )));
        }
        let pairs = joint_numeric_pairs(df, column1, column2)?;
        if pairs.len() < 2 {
            return Ok(QueryResponse::text(
                QueryError::InsufficientPairs {
                    col1: column1.to_string(),
                    col2: column2.to_string(),
                }
                .to_string(),
            ));
        }
        let corr = pearson(&pairs);
        match self
            .renderer
            .render(df, ChartKind::Scatter, column1, Some(column2))
        {
            Ok(reference) => Ok(QueryResponse::with_chart(
                format!("Correlation between {column1} and {column2} is {corr:.2}"),
                reference,
            )),
            Err(err) => {
                tracing::warn!(error = %err, column1, column2, "scatter chart failed");
                Ok(QueryResponse::text(format!(
                    "Error calculating correlation: {err}"
                )))
            }
        }
    }
}

/// Pearson correlation coefficient over jointly valid pairs. Degenerate
/// inputs (zero variance in either column) produce NaN, which the summary
/// formats as-is.
fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_priority_is_fixed() {
        // "mean of" outranks the other phrases when several occur.
        let intent = classify("show distribution of the mean of age").unwrap().unwrap();
        assert_eq!(
            intent,
            QueryIntent::Mean {
                column: "age".to_string()
            }
        );
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let intent = classify("SHOW DISTRIBUTION OF Salary").unwrap().unwrap();
        assert_eq!(
            intent,
            QueryIntent::Distribution {
                column: "Salary".to_string()
            }
        );
    }

    #[test]
    fn test_mean_extraction_preserves_column_case() {
        let intent = classify("What is the MEAN OF Age?").unwrap().unwrap();
        assert_eq!(
            intent,
            QueryIntent::Mean {
                column: "Age".to_string()
            }
        );
    }

    #[test]
    fn test_mean_without_column_token_is_malformed() {
        let err = classify("what is the mean of ?").unwrap().unwrap_err();
        assert!(matches!(err, QueryError::MeanColumnUndetermined));
    }

    #[test]
    fn test_correlation_extraction_splits_on_the_word_and() {
        let intent = classify("Find correlation between height and weight")
            .unwrap()
            .unwrap();
        assert_eq!(
            intent,
            QueryIntent::Correlation {
                column1: "height".to_string(),
                column2: "weight".to_string()
            }
        );
    }

    #[test]
    fn test_correlation_with_three_parts_is_malformed() {
        let err = classify("find correlation between a and b and c")
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, QueryError::CorrelationArity));
    }

    #[test]
    fn test_unknown_question_is_unclassified() {
        assert!(classify("what color is the sky").is_none());
    }

    #[test]
    fn test_category_count_extraction() {
        let intent = classify("Show count of each category in department")
            .unwrap()
            .unwrap();
        assert_eq!(
            intent,
            QueryIntent::CategoryCount {
                column: "department".to_string()
            }
        );
    }

    #[test]
    fn test_pearson_perfect_positive() {
        let pairs = vec![(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        assert!((pearson(&pairs) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let pairs = vec![(1.0, 6.0), (2.0, 4.0), (3.0, 2.0)];
        assert!((pearson(&pairs) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_constant_column_is_nan() {
        let pairs = vec![(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)];
        assert!(pearson(&pairs).is_nan());
    }
}
