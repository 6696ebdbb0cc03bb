//! Run event detection over a detection stream.

use std::path::{Path, PathBuf};

use rallycast_common::{config::AppConfig, RunTimer};
use rallycast_match_model::event::serialize_event_log;
use rallycast_processing_core::pipeline::{analyze_stream, PipelineConfig};

pub fn run(
    app_config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    fps: Option<u32>,
    config: Option<PathBuf>,
    raw: bool,
) -> anyhow::Result<()> {
    println!("Analyzing detection stream: {}", path.display());

    let stream = super::load_stream(&path)?;

    let mut pipeline_config = match &config {
        Some(config_path) => PipelineConfig::load(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to load pipeline config: {e}"))?,
        None => PipelineConfig {
            buffer_seconds: app_config.analysis.buffer_seconds,
            ..Default::default()
        },
    };
    pipeline_config.fps = resolve_fps(fps, stream.header.fps, app_config);

    println!(
        "  Loaded {} frames @ {}fps",
        stream.frames.len(),
        pipeline_config.fps
    );

    let timer = RunTimer::start();
    let result = analyze_stream(&stream, pipeline_config)
        .map_err(|e| anyhow::anyhow!("Event detection failed: {e}"))?;
    tracing::info!(
        started = timer.started_wall(),
        elapsed_secs = timer.elapsed_secs(),
        frames_per_sec = timer.frames_per_sec(result.frames),
        "Analysis finished"
    );

    let log = if raw { &result.raw } else { &result.merged };
    let json = serialize_event_log(log)?;

    let output_path = output.unwrap_or_else(|| default_output_path(app_config, &path));
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&output_path, json)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output_path.display()))?;

    println!(
        "  Detected {} events ({} before merging)",
        result.merged.len(),
        result.raw.len()
    );
    println!("  Event log saved to: {}", output_path.display());
    println!("\nAnalysis complete.");

    Ok(())
}

/// Command line first, then the stream header, then the app config.
fn resolve_fps(cli: Option<u32>, header: Option<u32>, app_config: &AppConfig) -> u32 {
    cli.or(header).unwrap_or(app_config.analysis.fps)
}

/// `<outputs_dir>/<input stem>.events.json`.
fn default_output_path(app_config: &AppConfig, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rally".to_string());
    app_config.outputs_dir.join(format!("{stem}.events.json"))
}
