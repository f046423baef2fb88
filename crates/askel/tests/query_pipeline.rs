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

use askel::{AnalysisSystem, ChartConfig};
use polars::prelude::*;
use tempfile::TempDir;

fn system(dir: &TempDir) -> AnalysisSystem {
    AnalysisSystem::new(ChartConfig::with_output_dir(dir.path(), "/media/charts")).unwrap()
}

#[test]
fn mean_skips_cells_that_do_not_coerce() {
    let dir = TempDir::new().unwrap();
    let df = df!("age" => &["20", "30", "bad", "40"]).unwrap();
    let response = system(&dir).process_query(&df, "What is the mean of age?");
    assert_eq!(response.summary, "The mean of age is 30.00");
    assert!(response.chart_reference.is_empty());
}

#[test]
fn mean_of_all_text_column_reports_non_numeric_data() {
    let dir = TempDir::new().unwrap();
    let df = df!("city" => &["London", "Paris", "Oslo"]).unwrap();
    let response = system(&dir).process_query(&df, "What is the mean of city?");
    assert_eq!(
        response.summary,
        "Error calculating mean for column 'city'. It may not contain numeric data."
    );
    assert!(response.chart_reference.is_empty());
}

#[test]
fn perfect_correlation_reports_one_and_renders_scatter() {
    let dir = TempDir::new().unwrap();
    let df = df!(
        "x" => &[1i64, 2, 3],
        "y" => &[2i64, 4, 6]
    )
    .unwrap();
    let response = system(&dir).process_query(&df, "Find correlation between x and y");
    assert_eq!(response.summary, "Correlation between x and y is 1.00");
    assert!(response.has_chart());
    let file_name = response.chart_reference.rsplit('/').next().unwrap();
    assert!(dir.path().join(file_name).exists());
}

#[test]
fn distribution_of_unknown_column_reports_and_skips_chart() {
    let dir = TempDir::new().unwrap();
    let df = df!("age" => &[20i64, 30]).unwrap();
    let response = system(&dir).process_query(&df, "show distribution of nonexistent_col");
    assert_eq!(
        response.summary,
        "Could not determine or find column 'nonexistent_col' for distribution"
    );
    assert!(response.chart_reference.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn every_phrasing_names_the_missing_column() {
    let dir = TempDir::new().unwrap();
    let df = df!("present" => &[1i64, 2]).unwrap();
    let sys = system(&dir);
    let queries = [
        "What is the mean of ghost?",
        "Show distribution of ghost",
        "Show count of each category in ghost",
        "Find correlation between ghost and present",
    ];
    for query in queries {
        let response = sys.process_query(&df, query);
        assert!(
            response.summary.contains("ghost"),
            "summary for {query:?} should mention the column: {}",
            response.summary
        );
        assert!(response.chart_reference.is_empty());
    }
}

#[test]
fn unmatched_question_returns_fixed_help_text() {
    let dir = TempDir::new().unwrap();
    let df = df!("age" => &[20i64, 30]).unwrap();
    let response = system(&dir).process_query(&df, "what color is the sky");
    assert!(response
        .summary
        .starts_with("I couldn't process that question"));
    for phrasing in [
        "What is the mean of [column]?",
        "Show distribution of [column]",
        "Show count of each category in [column]",
        "Find correlation between [column1] and [column2]",
    ] {
        assert!(response.summary.contains(phrasing));
    }
    assert!(response.chart_reference.is_empty());
}

#[test]
fn empty_dataset_is_reported_not_raised() {
    let dir = TempDir::new().unwrap();
    let df = DataFrame::empty();
    let response = system(&dir).process_query(&df, "What is the mean of age?");
    assert_eq!(response.summary, "Error: No data available for analysis");
    assert!(response.chart_reference.is_empty());
}

#[test]
fn blank_question_is_reported_not_raised() {
    let dir = TempDir::new().unwrap();
    let df = df!("age" => &[20i64, 30]).unwrap();
    let response = system(&dir).process_query(&df, "   ");
    assert_eq!(response.summary, "Error: Invalid question format");
}

#[test]
fn correlation_needs_two_valid_pairs() {
    let dir = TempDir::new().unwrap();
    let df = df!(
        "x" => &["1", "bad"],
        "y" => &["2", "nope"]
    )
    .unwrap();
    let response = system(&dir).process_query(&df, "Find correlation between x and y");
    assert_eq!(
        response.summary,
        "Not enough valid numeric data to calculate correlation between x and y"
    );
    assert!(response.chart_reference.is_empty());
}

#[test]
fn correlation_requires_exactly_two_columns() {
    let dir = TempDir::new().unwrap();
    let df = df!("x" => &[1i64, 2]).unwrap();
    let response = system(&dir).process_query(&df, "Find correlation between x");
    assert_eq!(
        response.summary,
        "Please specify exactly two columns for correlation"
    );
}

#[test]
fn column_names_are_trimmed_before_lookup() {
    let dir = TempDir::new().unwrap();
    let df = df!(" age " => &[10i64, 20, 30]).unwrap();
    let response = system(&dir).process_query(&df, "What is the mean of age?");
    assert_eq!(response.summary, "The mean of age is 20.00");
}

#[test]
fn string_cells_are_trimmed_before_counting() {
    let dir = TempDir::new().unwrap();
    let df = df!("city" => &[" London", "London ", "Paris"]).unwrap();
    let response = system(&dir).process_query(&df, "Show count of each category in city");
    assert_eq!(response.summary, "Category count chart for city");
    assert!(response.has_chart());
}

#[test]
fn category_count_renders_bar_chart_file() {
    let dir = TempDir::new().unwrap();
    let df = df!("dept" => &["eng", "sales", "eng"]).unwrap();
    let response = system(&dir).process_query(&df, "Show count of each category in dept");
    assert!(response.chart_reference.starts_with("/media/charts/"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn distribution_renders_histogram_file() {
    let dir = TempDir::new().unwrap();
    let df = df!("age" => &[20i64, 25, 30, 35, 40, 45]).unwrap();
    let response = system(&dir).process_query(&df, "Show distribution of age");
    assert_eq!(response.summary, "Distribution chart for age");
    assert!(response.has_chart());
}

#[test]
fn questions_match_column_kinds() {
    let dir = TempDir::new().unwrap();
    let df = df!(
        "age" => &[20i64, 30],
        "city" => &["London", "Paris"],
        "salary" => &[10.0f64, 20.0]
    )
    .unwrap();
    let questions = system(&dir).generate_questions(&df).unwrap();
    assert!(questions.contains(&"What is the mean of age?".to_string()));
    assert!(questions.contains(&"Show count of each category in city".to_string()));
    assert!(questions.contains(&"Find correlation between age and salary".to_string()));
}

#[test]
fn generated_questions_are_answerable() {
    let dir = TempDir::new().unwrap();
    let df = df!(
        "age" => &[20i64, 25, 30, 35],
        "city" => &["London", "Paris", "London", "Oslo"]
    )
    .unwrap();
    let sys = system(&dir);
    for question in sys.generate_questions(&df).unwrap() {
        let response = sys.process_query(&df, &question);
        assert!(
            !response
                .summary
                .starts_with("I couldn't process that question"),
            "generated question {question:?} was not understood"
        );
        assert!(
            !response.summary.starts_with("An unexpected error"),
            "generated question {question:?} hit the generic failure path"
        );
    }
}

#[test]
fn csv_round_trip_through_the_facade() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("people.csv");
    std::fs::write(&csv_path, "age,city\n20,London\n30,Paris\n40,Oslo\n").unwrap();
    let charts = TempDir::new().unwrap();
    let sys = system(&charts);
    let questions = sys.questions_from_csv(&csv_path).unwrap();
    assert!(questions.contains(&"What is the mean of age?".to_string()));
    let response = sys
        .answer_from_csv(&csv_path, "What is the mean of age?")
        .unwrap();
    assert_eq!(response.summary, "The mean of age is 30.00");
}
