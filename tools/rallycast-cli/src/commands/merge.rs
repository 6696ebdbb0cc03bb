//! Collapse consecutive repeats in an existing event log.

use std::path::PathBuf;

use rallycast_match_model::event::{parse_event_log, serialize_event_log};
use rallycast_processing_core::sequencer::merge_consecutive;

pub fn run(path: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let events =
        parse_event_log(&content).map_err(|e| anyhow::anyhow!("Failed to parse event log: {e}"))?;

    let unknown = events.iter().filter(|e| e.kind().is_none()).count();
    if unknown > 0 {
        tracing::warn!(count = unknown, "Event log contains unknown event tags");
    }

    let merged = merge_consecutive(&events);
    let output_path = output.unwrap_or(path);
    std::fs::write(&output_path, serialize_event_log(&merged)?)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output_path.display()))?;

    println!(
        "Merged {} events into {} -> {}",
        events.len(),
        merged.len(),
        output_path.display()
    );

    Ok(())
}
