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

use crate::error::{DataError, DataResult};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone)]
pub struct ProfilingConfig {
    pub type_confidence_threshold: f64,
    pub max_categorical_cardinality: usize,
}
impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            type_confidence_threshold: 0.8,
            max_categorical_cardinality: 50,
        }
    }
}
impl ProfilingConfig {
    pub fn for_strict_typing() -> Self {
        Self {
            type_confidence_threshold: 1.0,
            ..Default::default()
        }
    }
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.type_confidence_threshold) {
            return Err("type_confidence_threshold must be between 0.0 and 1.0".to_string());
        }
        if self.max_categorical_cardinality == 0 {
            return Err("max_categorical_cardinality must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub total_count: usize,
    pub null_count: usize,
    pub null_percentage: f64,
    pub cardinality: Option<usize>,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub type_confidence: f64,
}

pub struct DataProfiler {
    config: ProfilingConfig,
}
impl DataProfiler {
    pub fn new() -> Self {
        Self {
            config: ProfilingConfig::default(),
        }
    }
    pub fn with_config(config: ProfilingConfig) -> Self {
        Self { config }
    }

    /// Profiles every column in dataset order. Column order in the output
    /// matches column order in the frame, which the question generator
    /// relies on.
    pub fn profile(&self, df: &DataFrame) -> DataResult<Vec<ColumnProfile>> {
        if df.height() == 0 || df.width() == 0 {
            return Err(DataError::EmptyDataset);
        }
        let total_rows = df.height();
        df.get_columns()
            .par_iter()
            .map(|column| {
                let series = column.as_series().ok_or_else(|| {
                    DataError::ColumnProfilingError {
                        column: column.name().to_string(),
                        reason: "column is not a materialised series".to_string(),
                    }
                })?;
                self.profile_column(series, total_rows)
            })
            .collect()
    }

    fn profile_column(&self, series: &Series, total_rows: usize) -> DataResult<ColumnProfile> {
        let name = series.name().to_string();
        let null_count = series.null_count();
        let null_percentage = if total_rows > 0 {
            null_count as f64 / total_rows as f64
        } else {
            0.0
        };
        let (kind, type_confidence) = self.detect_kind(series)?;
        let (mut mean, mut min, mut max, mut cardinality) = (None, None, None, None);
        match kind {
            ColumnKind::Numeric => {
                let coerced = coerce_numeric(series)?;
                let ca = coerced.f64().map_err(|e| DataError::ColumnProfilingError {
                    column: name.clone(),
                    reason: e.to_string(),
                })?;
                mean = ca.mean();
                min = ca.min();
                max = ca.max();
            }
            ColumnKind::Categorical => {
                cardinality =
                    Some(
                        series
                            .n_unique()
                            .map_err(|e| DataError::ColumnProfilingError {
                                column: name.clone(),
                                reason: e.to_string(),
                            })?,
                    );
            }
        }
        Ok(ColumnProfile {
            name,
            kind,
            total_count: total_rows,
            null_count,
            null_percentage,
            cardinality,
            mean,
            min,
            max,
            type_confidence,
        })
    }

    fn detect_kind(&self, series: &Series) -> DataResult<(ColumnKind, f64)> {
        let non_null_count = series.len() - series.null_count();
        if non_null_count == 0 {
            return Ok((ColumnKind::Categorical, 0.0));
        }
        if matches!(
            series.dtype(),
            DataType::Float64 | DataType::Int64 | DataType::Float32 | DataType::Int32
        ) {
            return Ok((ColumnKind::Numeric, 1.0));
        }
        if let Ok(coerced) = series.cast(&DataType::Float64) {
            let successful_casts = coerced.len() - coerced.null_count();
            let confidence = successful_casts as f64 / non_null_count as f64;
            if confidence >= self.config.type_confidence_threshold {
                return Ok((ColumnKind::Numeric, confidence));
            }
        }
        Ok((ColumnKind::Categorical, 0.8))
    }

    pub fn export_profiles_json(&self, profiles: &[ColumnProfile]) -> DataResult<String> {
        serde_json::to_string_pretty(profiles).map_err(|e| DataError::ColumnProfilingError {
            column: String::new(),
            reason: format!("JSON serialisation failed: {e}"),
        })
    }
}
impl Default for DataProfiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-strict cast to Float64. Cells that do not parse as numbers become
/// nulls, which every downstream aggregate skips.
pub fn coerce_numeric(series: &Series) -> DataResult<Series> {
    series
        .cast(&DataType::Float64)
        .map_err(|source| DataError::NumericCoercion {
            column: series.name().to_string(),
            source,
        })
}

/// Coerced values of one column with nulls dropped.
pub fn numeric_values(df: &DataFrame, col: &str) -> DataResult<Vec<f64>> {
    let series = crate::dataset::series(df, col)?;
    let coerced = coerce_numeric(series)?;
    let ca = coerced.f64().map_err(|e| DataError::ColumnProfilingError {
        column: col.to_string(),
        reason: e.to_string(),
    })?;
    Ok(ca.into_iter().flatten().collect())
}

/// Row-aligned coerced values of two columns, keeping only rows where both
/// cells survived coercion.
pub fn joint_numeric_pairs(df: &DataFrame, col1: &str, col2: &str) -> DataResult<Vec<(f64, f64)>> {
    let a = coerce_numeric(crate::dataset::series(df, col1)?)?;
    let b = coerce_numeric(crate::dataset::series(df, col2)?)?;
    let a = a.f64().map_err(|e| DataError::ColumnProfilingError {
        column: col1.to_string(),
        reason: e.to_string(),
    })?;
    let b = b.f64().map_err(|e| DataError::ColumnProfilingError {
        column: col2.to_string(),
        reason: e.to_string(),
    })?;
    Ok(a.into_iter()
        .zip(b)
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_column_is_numeric() {
        let df = df!("age" => &[20i64, 30, 40]).unwrap();
        let profiles = DataProfiler::new().profile(&df).unwrap();
        assert_eq!(profiles[0].kind, ColumnKind::Numeric);
        assert_eq!(profiles[0].mean, Some(30.0));
    }

    #[test]
    fn test_text_column_is_categorical() {
        let df = df!("city" => &["London", "Paris", "London"]).unwrap();
        let profiles = DataProfiler::new().profile(&df).unwrap();
        assert_eq!(profiles[0].kind, ColumnKind::Categorical);
        assert_eq!(profiles[0].cardinality, Some(2));
    }

    #[test]
    fn test_mostly_numeric_strings_meet_threshold() {
        let df = df!("score" => &["1", "2", "3", "4", "5", "6", "7", "8", "bad", "10"]).unwrap();
        let profiles = DataProfiler::new().profile(&df).unwrap();
        assert_eq!(profiles[0].kind, ColumnKind::Numeric);
        assert!(profiles[0].type_confidence >= 0.8);
    }

    #[test]
    fn test_strict_typing_rejects_dirty_numeric_strings() {
        let df = df!("score" => &["1", "2", "bad"]).unwrap();
        let profiler = DataProfiler::with_config(ProfilingConfig::for_strict_typing());
        let profiles = profiler.profile(&df).unwrap();
        assert_eq!(profiles[0].kind, ColumnKind::Categorical);
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let df = DataFrame::empty();
        let err = DataProfiler::new().profile(&df).unwrap_err();
        assert!(matches!(err, DataError::EmptyDataset));
    }

    #[test]
    fn test_coercion_turns_bad_cells_into_nulls() {
        let df = df!("age" => &["20", "30", "bad", "40"]).unwrap();
        let series = df.get_columns()[0].as_series().unwrap();
        let coerced = coerce_numeric(series).unwrap();
        assert_eq!(coerced.null_count(), 1);
        assert_eq!(coerced.f64().unwrap().mean(), Some(30.0));
    }
}
