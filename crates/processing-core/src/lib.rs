//! Rallycast Processing Core — Event Detection
//!
//! Turns a stream of raw detections into an ordered log of gameplay events:
//! - **Tracking:** Follow the ball through missed detections and assign players by court half
//! - **Rectification:** Map pixel positions onto the canonical court in meters
//! - **Event Testing:** Run a fixed battery of classifiers over a sliding frame window
//! - **Sequencing:** Record events in frame order and collapse consecutive repeats
//!
//! This crate is pure computation apart from optional config loading.
//! All inputs are data; all outputs are data.

pub mod frame_buffer;
pub mod perspective;
pub mod pipeline;
pub mod sequencer;
pub mod testers;
pub mod tracker;

pub use frame_buffer::{FrameBuffer, FrameWindow};
pub use perspective::{NormalizerConfig, PerspectiveNormalizer};
pub use pipeline::{
    analyze_stream, load_detection_stream, EventPipeline, PipelineConfig, PipelineOutput,
};
pub use sequencer::{merge_consecutive, EventSequencer};
pub use testers::{default_battery, EventTester, TesterConfig, TesterState};
pub use tracker::{ObjectTracker, TrackState, TrackerConfig};
