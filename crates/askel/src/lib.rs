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

pub mod chart_renderer;
pub mod data_profiler;
pub mod dataset;
pub mod error;
pub mod query_processor;
pub mod question_generator;

pub use chart_renderer::{ChartConfig, ChartKind, ChartRenderer};
pub use data_profiler::{ColumnKind, ColumnProfile, DataProfiler, ProfilingConfig};
pub use error::{
    AnalysisError, ChartError, ConfigError, DataError, ErrorReporter, QueryError, Result,
};
pub use query_processor::{QueryIntent, QueryProcessor, QueryResponse};
pub use question_generator::generate_questions;

use polars::prelude::DataFrame;
use std::path::Path;

/// Front door for the upload gateway: profiles a frame to propose askable
/// questions, and answers a free-text question with a summary and an
/// optional chart reference.
pub struct AnalysisSystem {
    profiler: DataProfiler,
    processor: QueryProcessor,
}
impl AnalysisSystem {
    pub fn new(chart_config: ChartConfig) -> Result<Self> {
        Self::with_config(ProfilingConfig::default(), chart_config)
    }
    pub fn with_config(
        profiling_config: ProfilingConfig,
        chart_config: ChartConfig,
    ) -> Result<Self> {
        profiling_config
            .validate()
            .map_err(|reason| error::ConfigError::ValidationFailed { reason })?;
        chart_config
            .validate()
            .map_err(|reason| error::ConfigError::ValidationFailed { reason })?;
        Ok(Self {
            profiler: DataProfiler::with_config(profiling_config),
            processor: QueryProcessor::new(ChartRenderer::new(chart_config)),
        })
    }

    /// Candidate questions for the frame, in deterministic column order.
    pub fn generate_questions(&self, df: &DataFrame) -> Result<Vec<String>> {
        let df = dataset::normalise(df)?;
        let profiles = self.profiler.profile(&df)?;
        Ok(question_generator::generate_questions(&profiles))
    }

    /// Answers a question about the frame. Never fails from the caller's
    /// point of view; see [`QueryProcessor::process_query`].
    pub fn process_query(&self, df: &DataFrame, question: &str) -> QueryResponse {
        self.processor.process_query(df, question)
    }

    pub fn profile(&self, df: &DataFrame) -> Result<Vec<ColumnProfile>> {
        let df = dataset::normalise(df)?;
        Ok(self.profiler.profile(&df)?)
    }

    pub fn questions_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let df = dataset::load_csv(path)?;
        self.generate_questions(&df)
    }

    pub fn answer_from_csv<P: AsRef<Path>>(&self, path: P, question: &str) -> Result<QueryResponse> {
        let df = dataset::load_csv(path)?;
        Ok(self.process_query(&df, question))
    }
}
