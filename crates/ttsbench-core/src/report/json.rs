use crate::model::RunPayload;
use anyhow::Context;
use std::path::Path;

/// Pretty-printed dump of the whole run. Non-finite metric values (silent
/// audio gives `rms_db = -inf`) are written as `null`.
pub fn write_json(payload: &RunPayload, out: &Path) -> anyhow::Result<()> {
    let doc = serde_json::to_string_pretty(payload)?;
    std::fs::write(out, doc).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}
