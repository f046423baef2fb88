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

use askel::data_profiler::DataProfiler;
use askel::query_processor::classify;
use askel::question_generator::generate_questions;
use polars::prelude::*;
use proptest::prelude::*;

const PHRASES: [&str; 4] = [
    "mean of",
    "show distribution of",
    "show count of each category in",
    "find correlation between",
];

proptest! {
    #[test]
    fn question_generation_is_deterministic(values in prop::collection::vec(-1000.0f64..1000.0, 2..20)) {
        let df = df!(
            "a" => values.clone(),
            "b" => values
        ).unwrap();
        let profiles = DataProfiler::new().profile(&df).unwrap();
        prop_assert_eq!(generate_questions(&profiles), generate_questions(&profiles));
    }

    #[test]
    fn questions_about_numeric_pairs_include_every_correlation(n in 2usize..6) {
        let columns: Vec<Column> = (0..n)
            .map(|i| Series::new(format!("c{i}").as_str().into(), &[1.0f64, 2.0, 3.0]).into_column())
            .collect();
        let df = DataFrame::new(columns).unwrap();
        let profiles = DataProfiler::new().profile(&df).unwrap();
        let questions = generate_questions(&profiles);
        let correlations = questions.iter().filter(|q| q.starts_with("Find correlation")).count();
        prop_assert_eq!(correlations, n * (n - 1) / 2);
    }

    #[test]
    fn text_without_a_known_phrase_never_classifies(question in "[a-zA-Z ]{0,40}") {
        let lowered = question.to_lowercase();
        prop_assume!(PHRASES.iter().all(|p| !lowered.contains(p)));
        prop_assert!(classify(&question).is_none());
    }
}
