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

use anyhow::Context;
use askel::{AnalysisSystem, ChartConfig, ErrorReporter};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ask questions about a CSV file from the command line.
#[derive(Parser, Debug)]
#[command(name = "askel-demo", about = "Tabular Q&A demo")]
struct Args {
    /// CSV file to analyse
    csv: PathBuf,
    /// Question to ask; omit to just list suggested questions
    question: Option<String>,
    /// Directory chart images are written to
    #[arg(long, default_value = "media/charts")]
    charts_dir: PathBuf,
    /// Public prefix prepended to chart references
    #[arg(long, default_value = "/media/charts")]
    public_prefix: String,
    /// Print the query result as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let reporter = ErrorReporter::new();
    let system = AnalysisSystem::new(ChartConfig::with_output_dir(
        &args.charts_dir,
        &args.public_prefix,
    ))
    .map_err(|e| anyhow::anyhow!(reporter.report(&e)))?;

    let questions = system
        .questions_from_csv(&args.csv)
        .with_context(|| format!("failed to analyse {}", args.csv.display()))?;
    println!("Suggested questions:");
    for question in &questions {
        println!("  - {question}");
    }

    if let Some(question) = args.question {
        let response = system.answer_from_csv(&args.csv, &question)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("\n{}", response.summary);
            if response.has_chart() {
                println!("Chart: {}", response.chart_reference);
            }
        }
    }
    Ok(())
}
