//! Rallycast Match Model
//!
//! Defines the core data contracts for a tennis match analysis run:
//! - **Geometry:** Points, the court quadrilateral, and fixed court dimensions
//! - **Detections:** Raw per-frame detector output and the JSONL stream format
//! - **Frames:** Tracked ball and player positions, in pixels or meters
//! - **Events:** Gameplay event tags and the `{frame, event}` log entries
//!
//! Pixel-space values come straight from the detector. Normalized values are
//! meters on the canonical singles court, with `x` running along the court
//! from the far baseline (0) to the near baseline (23.77) and `y` running
//! across it (0 to 8.23).

pub mod detection;
pub mod event;
pub mod frame;
pub mod geometry;

pub use detection::*;
pub use event::*;
pub use frame::*;
pub use geometry::*;
