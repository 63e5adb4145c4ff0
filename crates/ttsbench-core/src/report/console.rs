use crate::model::RunPayload;

use super::leaderboard::aggregate_metrics;

pub fn print_summary(payload: &RunPayload) {
    let available = payload.models.iter().filter(|m| m.available).count();
    eprintln!(
        "\nRun {}: {} model(s) requested, {} available",
        payload.run.run_id,
        payload.models.len(),
        available
    );

    for m in payload.models.iter().filter(|m| !m.available) {
        eprintln!("⏭️  {:<16} unavailable", m.name);
    }

    for avg in aggregate_metrics(&payload.outputs) {
        let count = payload
            .outputs
            .iter()
            .filter(|o| o.model == avg.model)
            .count();
        let rtf = avg
            .metrics
            .get("rtf")
            .map(|v| format!("rtf {:.3}", v))
            .unwrap_or_else(|| "rtf n/a".into());
        let wer = avg
            .metrics
            .get("wer")
            .map(|v| format!("wer {:.3}", v))
            .unwrap_or_else(|| "wer n/a".into());
        eprintln!("✅ {:<16} {} output(s)  {}  {}", avg.model, count, rtf, wer);
    }

    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("Summary: {} output(s) written", payload.outputs.len());
}
