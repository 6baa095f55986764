// SPDX-License-Identifier: MIT
//! Report rendering for a finished run

use serde::Serialize;

use crate::config::OutputFormat;
use crate::pipeline::Summary;

/// Warning appended when any NaN position was folded
pub const NAN_WARNING: &str = "warning: NaN positions observed; bounding box is unreliable";

#[derive(Debug, Serialize)]
struct JsonReport {
    num_entries: u32,
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
    nan_seen: bool,
}

/// Plain-text report with bounds to 3 decimal places
pub fn render_text(summary: &Summary) -> String {
    let bbox = &summary.bounding_box;
    let mut out = format!(
        "num_entries = {}\nx = [{:.3}, {:.3}]\ny = [{:.3}, {:.3}]\n",
        summary.num_entries(),
        bbox.min_x,
        bbox.max_x,
        bbox.min_y,
        bbox.max_y
    );
    if bbox.nan_seen {
        out.push_str(NAN_WARNING);
        out.push('\n');
    }
    out
}

/// Pretty-printed JSON report
pub fn render_json(summary: &Summary) -> Result<String, serde_json::Error> {
    let bbox = &summary.bounding_box;
    let report = JsonReport {
        num_entries: summary.num_entries(),
        min_x: bbox.min_x,
        max_x: bbox.max_x,
        min_y: bbox.min_y,
        max_y: bbox.max_y,
        nan_seen: bbox.nan_seen,
    };
    serde_json::to_string_pretty(&report)
}

pub fn render(summary: &Summary, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(summary)),
        OutputFormat::Json => render_json(summary),
    }
}
