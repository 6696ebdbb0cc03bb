use rallycast_match_model::event::Event;

use super::{ball_track, EventTester, TesterState};
use crate::frame_buffer::FrameWindow;

/// Classifies the ball's along-court motion over three frames.
///
/// With `v1 = x1 - x0` and `v2 = x2 - x1`:
/// - a strict direction reversal at speed above `shot_min_speed` is a shot;
/// - otherwise a drop to under `speed_ratio` of the previous speed is a
///   bounce.
#[derive(Debug, Clone)]
pub struct BounceOrShotTester {
    shot_min_speed: f64,
    speed_ratio: f64,
}

impl BounceOrShotTester {
    pub fn new(shot_min_speed: f64, speed_ratio: f64) -> Self {
        Self {
            shot_min_speed,
            speed_ratio,
        }
    }

    /// Classify three along-court positions.
    pub fn classify(&self, x0: f64, x1: f64, x2: f64) -> Option<Event> {
        let v1 = x1 - x0;
        let v2 = x2 - x1;
        if v1 * v2 < 0.0 && v1.abs() > self.shot_min_speed {
            Some(Event::Shot)
        } else if v1.abs() > 0.0 && v2.abs() / v1.abs() < self.speed_ratio {
            Some(Event::Bounce)
        } else {
            None
        }
    }
}

impl EventTester for BounceOrShotTester {
    fn name(&self) -> &'static str {
        "bounce_or_shot"
    }

    fn window_len(&self) -> usize {
        3
    }

    fn test(&self, window: FrameWindow<'_>, _state: &mut TesterState) -> Option<Event> {
        match ball_track(&window, self.window_len())?.as_slice() {
            [p0, p1, p2] => self.classify(p0.x, p1.x, p2.x),
            _ => None,
        }
    }
}
