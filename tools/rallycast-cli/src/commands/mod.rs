pub mod analyze;
pub mod calibrate;
pub mod info;
pub mod merge;

use std::path::Path;

use rallycast_match_model::detection::DetectionStream;
use rallycast_processing_core::pipeline::load_detection_stream;

/// Read and parse a detection stream file.
pub fn load_stream(path: &Path) -> anyhow::Result<DetectionStream> {
    load_detection_stream(path)
        .map_err(|e| anyhow::anyhow!("Failed to load detection stream: {e}"))
}
