//! The per-frame event detection pipeline.
//!
//! For every frame of detections, in order:
//!
//! 1. the [`ObjectTracker`] picks the ball and players in pixel space;
//! 2. the [`PerspectiveNormalizer`] maps them onto the canonical court;
//! 3. the normalized frame is pushed onto the [`FrameBuffer`];
//! 4. every tester of the battery inspects its trailing window;
//! 5. reported events are appended to the [`EventSequencer`].
//!
//! When the stream ends, [`EventPipeline::finish`] returns the raw and the
//! merged event log.

use std::path::Path;

use rallycast_common::{
    FrameClock, RallycastError, RallycastResult, DEFAULT_BUFFER_SECONDS, DEFAULT_FPS,
};
use rallycast_match_model::detection::{
    parse_detection_stream, DetectionFrame, DetectionStream, DETECTION_SCHEMA_VERSION,
};
use rallycast_match_model::event::{Event, EventFrame};
use rallycast_match_model::geometry::Coord;
use serde::{Deserialize, Serialize};

use crate::frame_buffer::FrameBuffer;
use crate::perspective::{NormalizerConfig, PerspectiveNormalizer};
use crate::sequencer::EventSequencer;
use crate::testers::{default_battery, EventTester, TesterConfig, TesterState};
use crate::tracker::{ObjectTracker, TrackerConfig};

/// Every tunable of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Frame rate of the detection stream.
    pub fps: u32,

    /// Seconds of history kept in the frame buffer.
    pub buffer_seconds: u32,

    pub tracker: TrackerConfig,
    pub testers: TesterConfig,
    pub normalizer: NormalizerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            buffer_seconds: DEFAULT_BUFFER_SECONDS,
            tracker: TrackerConfig::default(),
            testers: TesterConfig::default(),
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> RallycastResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RallycastError::config(format!("invalid pipeline config: {e}")))
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> RallycastResult<Self> {
        if !path.exists() {
            return Err(RallycastError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Number of frames processed.
    pub frames: u64,

    /// Every event in observation order.
    pub raw: Vec<EventFrame>,

    /// The log with consecutive repeats collapsed.
    pub merged: Vec<EventFrame>,
}

/// Owns all per-run state and drives one detection stream.
pub struct EventPipeline {
    clock: FrameClock,
    normalizer: PerspectiveNormalizer,
    tracker: ObjectTracker,
    buffer: FrameBuffer,
    battery: Vec<Box<dyn EventTester>>,
    states: Vec<TesterState>,
    sequencer: EventSequencer,
    frame_index: u64,
}

impl EventPipeline {
    /// Build a pipeline for a match calibrated with pixel court corners
    /// (tl, tr, br, bl).
    pub fn new(config: PipelineConfig, corners: &[Coord]) -> RallycastResult<Self> {
        let normalizer = PerspectiveNormalizer::with_config(corners, config.normalizer.clone())?;
        let clock = FrameClock::new(config.fps);
        let battery = default_battery(&config.testers, clock.fps());
        let states = vec![TesterState::default(); battery.len()];

        tracing::debug!(
            fps = clock.fps(),
            buffer_seconds = config.buffer_seconds,
            testers = battery.len(),
            "Event pipeline ready"
        );

        Ok(Self {
            clock,
            normalizer,
            tracker: ObjectTracker::new(config.tracker),
            buffer: FrameBuffer::for_fps(clock.fps(), config.buffer_seconds),
            battery,
            states,
            sequencer: EventSequencer::new(),
            frame_index: 0,
        })
    }

    /// Process the next frame of detections and return the events it
    /// produced, in battery order.
    pub fn process(&mut self, detections: &DetectionFrame) -> Vec<Event> {
        self.frame_index += 1;

        let court = self.normalizer.pixel_court();
        let frame = self.tracker.track(detections, court);
        self.buffer.push(self.normalizer.normalize_frame(&frame));

        let mut events = Vec::new();
        for (tester, state) in self.battery.iter().zip(self.states.iter_mut()) {
            let window = self.buffer.window(tester.window_len());
            if let Some(event) = tester.test(window, state) {
                self.sequencer.add_event(self.frame_index, event);
                events.push(event);
            }
        }

        tracing::debug!(
            frame = self.frame_index,
            events = %events.iter().map(Event::label).collect::<Vec<_>>().join(" | "),
            "Frame processed"
        );
        events
    }

    /// Index of the last processed frame (1-based; 0 before the first).
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn normalizer(&self) -> &PerspectiveNormalizer {
        &self.normalizer
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Events recorded so far, unmerged.
    pub fn raw_events(&self) -> &[EventFrame] {
        self.sequencer.events()
    }

    /// End the run and produce the event logs.
    pub fn finish(self) -> PipelineOutput {
        let merged = self.sequencer.merge_consecutive_events();
        tracing::info!(
            frames = self.frame_index,
            duration_secs = self.clock.frame_to_secs(self.frame_index + 1),
            raw_events = self.sequencer.len(),
            merged_events = merged.len(),
            "Event detection complete"
        );
        PipelineOutput {
            frames: self.frame_index,
            raw: self.sequencer.into_events(),
            merged,
        }
    }

    /// Run a pipeline over a sequence of detection frames.
    pub fn run<'a, I>(
        config: PipelineConfig,
        corners: &[Coord],
        frames: I,
    ) -> RallycastResult<PipelineOutput>
    where
        I: IntoIterator<Item = &'a DetectionFrame>,
    {
        let mut pipeline = Self::new(config, corners)?;
        for detections in frames {
            pipeline.process(detections);
        }
        Ok(pipeline.finish())
    }
}

/// Run a pipeline over a parsed detection stream, calibrated from its
/// header.
pub fn analyze_stream(
    stream: &DetectionStream,
    config: PipelineConfig,
) -> RallycastResult<PipelineOutput> {
    EventPipeline::run(config, &stream.header.court, &stream.frames)
}

/// Read and parse a detection stream file.
pub fn load_detection_stream(path: &Path) -> RallycastResult<DetectionStream> {
    if !path.exists() {
        return Err(RallycastError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let stream = parse_detection_stream(&content)
        .map_err(|e| RallycastError::detection(format!("{}: {e}", path.display())))?;

    if stream.header.schema_version != DETECTION_SCHEMA_VERSION {
        tracing::warn!(
            found = %stream.header.schema_version,
            supported = DETECTION_SCHEMA_VERSION,
            "Unexpected detection stream schema version"
        );
    }
    Ok(stream)
}
