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

use crate::data_profiler::{ColumnKind, ColumnProfile};

/// Enumerates the questions the query processor can answer for this
/// dataset. Pure and deterministic: profiles in, strings out, ordered by
/// column position. Numeric columns contribute a mean and a distribution
/// question, categorical columns a category-count question, and every
/// unordered numeric pair a correlation question.
pub fn generate_questions(profiles: &[ColumnProfile]) -> Vec<String> {
    let numeric: Vec<&str> = profiles
        .iter()
        .filter(|p| p.kind == ColumnKind::Numeric)
        .map(|p| p.name.as_str())
        .collect();
    let categorical: Vec<&str> = profiles
        .iter()
        .filter(|p| p.kind == ColumnKind::Categorical)
        .map(|p| p.name.as_str())
        .collect();
    let mut questions = Vec::new();
    for col in &numeric {
        questions.push(format!("What is the mean of {col}?"));
        questions.push(format!("Show distribution of {col}"));
    }
    for col in &categorical {
        questions.push(format!("Show count of each category in {col}"));
    }
    if numeric.len() >= 2 {
        for i in 0..numeric.len() {
            for j in (i + 1)..numeric.len() {
                questions.push(format!(
                    "Find correlation between {} and {}",
                    numeric[i], numeric[j]
                ));
            }
        }
    }
    questions
}
