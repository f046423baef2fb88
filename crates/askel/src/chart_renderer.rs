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

use crate::data_profiler::{joint_numeric_pairs, numeric_values};
use crate::dataset;
use crate::error::{ChartError, ChartResult};
use plotters::prelude::*;
use plotters::style::FontTransform;
use polars::prelude::{DataFrame, DataType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Hist,
    Bar,
    Scatter,
}
impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Hist => "hist",
            ChartKind::Bar => "bar",
            ChartKind::Scatter => "scatter",
        }
    }
}
impl FromStr for ChartKind {
    type Err = ChartError;
    fn from_str(s: &str) -> ChartResult<Self> {
        match s {
            "hist" => Ok(ChartKind::Hist),
            "bar" => Ok(ChartKind::Bar),
            "scatter" => Ok(ChartKind::Scatter),
            other => Err(ChartError::UnsupportedChartType {
                kind: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Directory chart images are written to. Created on first render if
    /// absent. The surrounding gateway serves this directory publicly.
    pub output_dir: PathBuf,
    /// Prefix prepended to the generated file name to form the reference
    /// handed back to callers. A serving-root-relative path, never an
    /// absolute filesystem path.
    pub public_prefix: String,
    pub width: u32,
    pub height: u32,
}
impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("media/charts"),
            public_prefix: "/media/charts".to_string(),
            width: 1000,
            height: 600,
        }
    }
}
impl ChartConfig {
    pub fn with_output_dir<P: Into<PathBuf>>(dir: P, public_prefix: &str) -> Self {
        Self {
            output_dir: dir.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }
    pub fn for_thumbnails() -> Self {
        Self {
            width: 420,
            height: 260,
            ..Default::default()
        }
    }
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("chart dimensions must be greater than 0".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err("output_dir must not be empty".to_string());
        }
        Ok(())
    }
}

pub struct ChartRenderer {
    config: ChartConfig,
}
impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Renders one chart to a freshly named PNG under the configured
    /// directory and returns the public reference to it.
    ///
    /// The drawing area lives only inside this call: it is presented on
    /// success and dropped on every path, so nothing accumulates across
    /// renders. The bitmap backend needs no display, so renders may run on
    /// any worker thread.
    pub fn render(
        &self,
        df: &DataFrame,
        kind: ChartKind,
        col: &str,
        col2: Option<&str>,
    ) -> ChartResult<String> {
        let file_name = format!("{}.png", Uuid::new_v4().simple());
        let path = self.config.output_dir.join(&file_name);
        std::fs::create_dir_all(&self.config.output_dir).map_err(|source| {
            ChartError::OutputDirError {
                path: self.config.output_dir.display().to_string(),
                source,
            }
        })?;
        tracing::debug!(kind = kind.as_str(), col, ?col2, file = %file_name, "rendering chart");
        match (kind, col2) {
            (ChartKind::Hist, _) => self.render_hist(df, col, &path)?,
            (ChartKind::Bar, _) => self.render_bar(df, col, &path)?,
            (ChartKind::Scatter, Some(col2)) => self.render_scatter(df, col, col2, &path)?,
            (ChartKind::Scatter, None) => return Err(ChartError::MissingSecondColumn),
        }
        Ok(format!(
            "{}/{}",
            self.config.public_prefix.trim_end_matches('/'),
            file_name
        ))
    }

    fn render_hist(&self, df: &DataFrame, col: &str, path: &Path) -> ChartResult<()> {
        let values = numeric_values(df, col)?;
        if values.is_empty() {
            return Err(ChartError::NoRenderableValues {
                column: col.to_string(),
            });
        }
        let (lo, hi) = padded_range(&values);
        let bin_count = ((values.len() as f64).sqrt().ceil() as usize).clamp(1, 50);
        let bin_width = (hi - lo) / bin_count as f64;
        let mut counts = vec![0usize; bin_count];
        for &v in &values {
            let idx = (((v - lo) / bin_width) as usize).min(bin_count - 1);
            counts[idx] += 1;
        }
        let y_max = counts.iter().copied().max().unwrap_or(1) as f64 * 1.15;
        let root = BitMapBackend::new(path, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Distribution of {col}"), ("sans-serif", 26))
            .margin(12)
            .x_label_area_size(42)
            .y_label_area_size(52)
            .build_cartesian_2d(lo..hi, 0f64..y_max)
            .map_err(backend)?;
        chart
            .configure_mesh()
            .x_desc(col)
            .y_desc("count")
            .draw()
            .map_err(backend)?;
        chart
            .draw_series(counts.iter().enumerate().map(|(i, &c)| {
                let x0 = lo + i as f64 * bin_width;
                let x1 = x0 + bin_width;
                Rectangle::new([(x0, 0.0), (x1, c as f64)], BLUE.mix(0.45).filled())
            }))
            .map_err(backend)?;
        if let Some(curve) = density_curve(&values, lo, hi, bin_width) {
            chart
                .draw_series(LineSeries::new(curve, ShapeStyle::from(&RED).stroke_width(2)))
                .map_err(backend)?;
        }
        root.present().map_err(backend)
    }

    fn render_bar(&self, df: &DataFrame, col: &str, path: &Path) -> ChartResult<()> {
        let counts = category_counts(df, col)?;
        if counts.is_empty() {
            return Err(ChartError::NoRenderableValues {
                column: col.to_string(),
            });
        }
        let y_max = counts.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64 * 1.15;
        let labels: Vec<String> = counts.iter().map(|(name, _)| name.clone()).collect();
        let root = BitMapBackend::new(path, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Count of {col}"), ("sans-serif", 26))
            .margin(12)
            .x_label_area_size(90)
            .y_label_area_size(52)
            .build_cartesian_2d((0..counts.len()).into_segmented(), 0f64..y_max)
            .map_err(backend)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(counts.len())
            .x_label_formatter(&|seg| match seg {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i).cloned().unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .x_label_style(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_desc("count")
            .draw()
            .map_err(backend)?;
        chart
            .draw_series(counts.iter().enumerate().map(|(i, (_, c))| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), *c as f64),
                    ],
                    BLUE.mix(0.7).filled(),
                )
            }))
            .map_err(backend)?;
        root.present().map_err(backend)
    }

    fn render_scatter(&self, df: &DataFrame, col: &str, col2: &str, path: &Path) -> ChartResult<()> {
        let pairs = joint_numeric_pairs(df, col, col2)?;
        if pairs.is_empty() {
            return Err(ChartError::NoRenderableValues {
                column: col.to_string(),
            });
        }
        let xs: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
        let ys: Vec<f64> = pairs.iter().map(|(_, y)| *y).collect();
        let (x_lo, x_hi) = padded_range(&xs);
        let (y_lo, y_hi) = padded_range(&ys);
        let root = BitMapBackend::new(path, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Scatter plot: {col} vs {col2}"), ("sans-serif", 26))
            .margin(12)
            .x_label_area_size(42)
            .y_label_area_size(52)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(backend)?;
        chart
            .configure_mesh()
            .x_desc(col)
            .y_desc(col2)
            .draw()
            .map_err(backend)?;
        chart
            .draw_series(
                pairs
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 4, BLUE.mix(0.7).filled())),
            )
            .map_err(backend)?;
        root.present().map_err(backend)
    }
}

fn backend<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Backend {
        reason: err.to_string(),
    }
}

/// Distinct stringified values of a column with occurrence counts, in
/// first-appearance order. Nulls are skipped.
fn category_counts(df: &DataFrame, col: &str) -> ChartResult<Vec<(String, usize)>> {
    let series = dataset::series(df, col)?;
    let as_str = series.cast(&DataType::String).map_err(backend)?;
    let ca = as_str.str().map_err(backend)?;
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for value in ca.into_iter().flatten() {
        match index.get(value) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(value.to_string(), order.len());
                order.push((value.to_string(), 1));
            }
        }
    }
    Ok(order)
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min - span * 0.05, max + span * 0.05)
    }
}

/// Gaussian kernel density estimate, Scott's-rule bandwidth, scaled into
/// count space so it overlays the histogram bars.
fn density_curve(values: &[f64], lo: f64, hi: f64, bin_width: f64) -> Option<Vec<(f64, f64)>> {
    let n = values.len() as f64;
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    if std <= f64::EPSILON {
        return None;
    }
    let bandwidth = 1.06 * std * n.powf(-0.2);
    let steps = 200;
    let step = (hi - lo) / steps as f64;
    let norm = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * bandwidth * n);
    let curve = (0..=steps)
        .map(|i| {
            let x = lo + i as f64 * step;
            let density: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density * n * bin_width)
        })
        .collect();
    Some(curve)
}
