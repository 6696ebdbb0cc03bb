use rallycast_match_model::event::Event;

use super::{ball_track, EventTester, TesterState};
use crate::frame_buffer::FrameWindow;

/// Reports a ball that has stayed nearly motionless.
///
/// Looks at `required_steps + 1` frames and counts frame-to-frame steps
/// slower than `max_speed`. Fires once that count reaches `required_steps`.
#[derive(Debug, Clone)]
pub struct BallStoppedTester {
    required_steps: usize,
    max_speed: f64,
}

impl BallStoppedTester {
    pub fn new(required_steps: usize, max_speed: f64) -> Self {
        Self {
            required_steps: required_steps.max(1),
            max_speed,
        }
    }
}

impl EventTester for BallStoppedTester {
    fn name(&self) -> &'static str {
        "ball_stopped"
    }

    fn window_len(&self) -> usize {
        self.required_steps + 1
    }

    fn test(&self, window: FrameWindow<'_>, _state: &mut TesterState) -> Option<Event> {
        let track = ball_track(&window, self.window_len())?;
        let slow_steps = track
            .windows(2)
            .filter(|pair| pair[0].distance_to(pair[1]) < self.max_speed)
            .count();
        (slow_steps >= self.required_steps).then_some(Event::BallStopped)
    }
}
