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
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// Returns a copy of the frame with surrounding whitespace removed from
/// every column name and from every cell of each string column.
///
/// Column lookups elsewhere in the crate are exact, case-sensitive matches
/// against the trimmed names produced here.
pub fn normalise(df: &DataFrame) -> DataResult<DataFrame> {
    let mut seen: HashSet<String> = HashSet::with_capacity(df.width());
    let mut columns: Vec<Column> = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let series = column.as_series().ok_or_else(|| DataError::ColumnProfilingError {
            column: column.name().to_string(),
            reason: "column is not a materialised series".to_string(),
        })?;
        let name = series.name().trim().to_string();
        if !seen.insert(name.clone()) {
            return Err(DataError::DuplicateColumnName { name });
        }
        let mut series = series.clone();
        series.rename(name.as_str().into());
        if series.dtype() == &DataType::String {
            let trimmed: Vec<Option<String>> = series
                .str()
                .map_err(|e| DataError::ColumnProfilingError {
                    column: name.clone(),
                    reason: e.to_string(),
                })?
                .into_iter()
                .map(|cell| cell.map(|v| v.trim().to_string()))
                .collect();
            series = Series::new(name.as_str().into(), trimmed);
        }
        columns.push(series.into_column());
    }
    DataFrame::new(columns).map_err(|e| DataError::ColumnProfilingError {
        column: String::new(),
        reason: e.to_string(),
    })
}

/// Looks a column up by exact trimmed name and returns it as a series.
pub fn series<'a>(df: &'a DataFrame, name: &str) -> DataResult<&'a Series> {
    let column = df.column(name).map_err(|_| DataError::ColumnNotFound {
        column: name.to_string(),
    })?;
    column.as_series().ok_or_else(|| DataError::ColumnProfilingError {
        column: name.to_string(),
        reason: "column is not a materialised series".to_string(),
    })
}

/// Exact, case-sensitive membership test against trimmed column names.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

pub fn is_empty(df: &DataFrame) -> bool {
    df.height() == 0 || df.width() == 0
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> DataResult<DataFrame> {
    let display = path.as_ref().display().to_string();
    let file = File::open(path.as_ref())?;
    CsvReader::new(file)
        .finish()
        .map_err(|source| DataError::DataFileError {
            path: display,
            source,
        })
}

pub fn load_json<P: AsRef<Path>>(path: P) -> DataResult<DataFrame> {
    let display = path.as_ref().display().to_string();
    let file = File::open(path.as_ref())?;
    JsonReader::new(file)
        .finish()
        .map_err(|source| DataError::DataFileError {
            path: display,
            source,
        })
}
