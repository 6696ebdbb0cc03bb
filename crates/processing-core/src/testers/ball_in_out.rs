use rallycast_match_model::event::Event;
use serde::{Deserialize, Serialize};

use super::{ball_track, EventTester, TesterState};
use crate::frame_buffer::FrameWindow;

/// How a bounce is recognised from three ball positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BounceRule {
    /// Speed after the middle frame drops under a ratio of the speed
    /// before it.
    #[default]
    SpeedDrop,
    /// The along-court direction of travel flips at the middle frame.
    Reversal,
}

/// Calls bounces in or out of the singles court.
///
/// The bounce point is the middle frame of the window. Only changes are
/// reported: consecutive bounces on the same side of the lines emit one
/// event.
#[derive(Debug, Clone)]
pub struct BallInOutTester {
    rule: BounceRule,
    speed_ratio: f64,
}

impl BallInOutTester {
    pub fn new(rule: BounceRule, speed_ratio: f64) -> Self {
        Self { rule, speed_ratio }
    }

    fn is_bounce(&self, v1x: f64, v2x: f64, s1: f64, s2: f64) -> bool {
        match self.rule {
            BounceRule::SpeedDrop => s1 > 0.0 && s2 / s1 < self.speed_ratio,
            BounceRule::Reversal => v1x * v2x < 0.0,
        }
    }
}

impl EventTester for BallInOutTester {
    fn name(&self) -> &'static str {
        "ball_in_out"
    }

    fn window_len(&self) -> usize {
        3
    }

    fn test(&self, window: FrameWindow<'_>, state: &mut TesterState) -> Option<Event> {
        let track = ball_track(&window, self.window_len())?;
        let [p0, p1, p2] = track.as_slice() else {
            return None;
        };
        let (v1, v2) = (*p1 - *p0, *p2 - *p1);
        if !self.is_bounce(v1.x, v2.x, v1.norm(), v2.norm()) {
            return None;
        }

        let court = window.get(1)?.court;
        let inside = court.contains(*p1);
        if state.last_in == Some(inside) {
            return None;
        }
        state.last_in = Some(inside);
        if inside {
            Some(Event::BallIn)
        } else {
            Some(Event::BallOut)
        }
    }
}
