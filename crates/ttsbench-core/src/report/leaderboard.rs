use crate::model::{MetricMap, OutputRecord, RunPayload};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// Per-model metric means, in order of each model's first output.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAverages {
    pub model: String,
    pub metrics: MetricMap,
}

/// Averages every metric per model over the outputs that reported it.
/// A metric missing from some outputs is not counted as zero for them.
pub fn aggregate_metrics(outputs: &[OutputRecord]) -> Vec<ModelAverages> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: BTreeMap<&str, BTreeMap<&str, (f64, u32)>> = BTreeMap::new();

    for out in outputs {
        if !sums.contains_key(out.model.as_str()) {
            order.push(out.model.clone());
        }
        let per_model = sums.entry(out.model.as_str()).or_default();
        for (name, value) in &out.metrics {
            let slot = per_model.entry(name.as_str()).or_insert((0.0, 0));
            slot.0 += value;
            slot.1 += 1;
        }
    }

    order
        .into_iter()
        .map(|model| {
            let metrics = sums
                .get(model.as_str())
                .map(|m| {
                    m.iter()
                        .map(|(name, (sum, n))| (name.to_string(), sum / *n as f64))
                        .collect()
                })
                .unwrap_or_default();
            ModelAverages { model, metrics }
        })
        .collect()
}

pub fn render_report(payload: &RunPayload) -> String {
    let averages = aggregate_metrics(&payload.outputs);

    let mut lines = vec![
        "# TTS Benchmark Report\n".to_string(),
        format!("Run ID: {}\n", payload.run.run_id),
    ];

    if averages.is_empty() {
        lines.push("No outputs generated.\n".to_string());
        return lines.join("\n");
    }

    let rows: Vec<Vec<String>> = averages
        .iter()
        .map(|a| {
            vec![
                a.model.clone(),
                format!("{:.3}", a.metrics.get("rtf").copied().unwrap_or(0.0)),
                format!("{:.3}", a.metrics.get("duration_s").copied().unwrap_or(0.0)),
                format!("{:.3}", a.metrics.get("wer").copied().unwrap_or(0.0)),
            ]
        })
        .collect();
    lines.push("## Leaderboard\n".to_string());
    lines.push(markdown_table(
        &["Model", "avg_rtf", "avg_duration_s", "avg_wer"],
        &rows,
    ));
    lines.push("\n## Per-model metrics\n".to_string());

    for a in &averages {
        lines.push(format!("### {}\n", a.model));
        let metric_rows: Vec<Vec<String>> = a
            .metrics
            .iter()
            .map(|(name, value)| vec![name.clone(), format!("{:.4}", value)])
            .collect();
        lines.push(markdown_table(&["Metric", "Average"], &metric_rows));
        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn write_report(payload: &RunPayload, out: &Path) -> anyhow::Result<()> {
    std::fs::write(out, render_report(payload))
        .with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let render_row = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!(" {:<w$} ", c, w = *w))
            .collect();
        format!("|{}|", padded.join("|"))
    };

    let mut out = vec![render_row(headers.to_vec())];
    out.push(format!(
        "|{}|",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("|")
    ));
    for row in rows {
        out.push(render_row(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}
