//! Event testers.
//!
//! Each tester looks at a short trailing window of normalized frames and
//! reports at most one [`Event`] per call. Testers are stateless apart from
//! a [`TesterState`] slot the pipeline keeps for each of them and passes
//! back on every call.
//!
//! The battery runs in a fixed order every frame:
//!
//! | Tester | Window | Emits |
//! |--------|--------|-------|
//! | [`SideTester`] (right, left) | 1 | `right_of_net` / `left_of_net` |
//! | [`BounceOrShotTester`] | 3 | `shot` / `bounce` |
//! | [`PlayerMovementTester`] (2 roles x 4 directions) | 5 | `p1_up` ... `p2_right` |
//! | [`BallStoppedTester`] | `frames_for(min_stopped_seconds) + 1` | `ball_stopped` |
//! | [`BallInOutTester`] | 3 | `ball_in` / `ball_out` (edge-triggered) |

mod ball_in_out;
mod ball_stopped;
mod bounce_shot;
mod player_movement;
mod side;

pub use ball_in_out::{BallInOutTester, BounceRule};
pub use ball_stopped::BallStoppedTester;
pub use bounce_shot::BounceOrShotTester;
pub use player_movement::PlayerMovementTester;
pub use side::{Side, SideTester};

use rallycast_common::FrameClock;
use rallycast_match_model::event::{Event, MoveDirection};
use rallycast_match_model::frame::PlayerRole;
use rallycast_match_model::geometry::Coord;
use serde::{Deserialize, Serialize};

use crate::frame_buffer::FrameWindow;

/// A classifier over a trailing window of frames.
pub trait EventTester: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Number of trailing frames the tester wants to see.
    fn window_len(&self) -> usize;

    /// Inspect the window and report at most one event.
    ///
    /// Missing data (no ball, absent player, short history) yields `None`.
    fn test(&self, window: FrameWindow<'_>, state: &mut TesterState) -> Option<Event>;
}

/// Private per-tester state carried between calls by the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TesterState {
    /// Classification of the last reported bounce (`true` = in).
    pub last_in: Option<bool>,
}

/// Thresholds for the tester battery. Distances are meters, speeds meters
/// per frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterConfig {
    /// Minimum along-court speed before a reversal counts as a shot.
    pub shot_min_speed: f64,

    /// Speed ratio (after / before) under which a slowdown is a bounce.
    pub bounce_speed_ratio: f64,

    /// Frames a player movement is measured over.
    pub movement_window: usize,

    /// Displacement a player must exceed to report a movement.
    pub movement_threshold: f64,

    /// Speed under which the ball counts as motionless.
    pub stopped_speed: f64,

    /// How long the ball must stay motionless.
    pub min_stopped_seconds: f64,

    /// How the in/out tester detects a bounce.
    pub bounce_rule: BounceRule,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            shot_min_speed: 0.05,
            bounce_speed_ratio: 0.8,
            movement_window: 5,
            movement_threshold: 0.5,
            stopped_speed: 0.05,
            min_stopped_seconds: 0.5,
            bounce_rule: BounceRule::SpeedDrop,
        }
    }
}

/// Build the standard battery in its fixed evaluation order.
pub fn default_battery(config: &TesterConfig, fps: u32) -> Vec<Box<dyn EventTester>> {
    let clock = FrameClock::new(fps);

    let mut battery: Vec<Box<dyn EventTester>> = vec![
        Box::new(SideTester::new(Side::Right)),
        Box::new(SideTester::new(Side::Left)),
        Box::new(BounceOrShotTester::new(
            config.shot_min_speed,
            config.bounce_speed_ratio,
        )),
    ];

    for role in PlayerRole::ALL {
        for direction in MoveDirection::ALL {
            battery.push(Box::new(PlayerMovementTester::new(
                role,
                direction,
                config.movement_window,
                config.movement_threshold,
            )));
        }
    }

    battery.push(Box::new(BallStoppedTester::new(
        clock.frames_for(config.min_stopped_seconds),
        config.stopped_speed,
    )));
    battery.push(Box::new(BallInOutTester::new(
        config.bounce_rule,
        config.bounce_speed_ratio,
    )));

    battery
}

/// Ball positions of every frame in the window, or `None` if the window is
/// shorter than `len` or any frame lacks a ball.
fn ball_track(window: &FrameWindow<'_>, len: usize) -> Option<Vec<Coord>> {
    if window.len() < len {
        return None;
    }
    window.iter().map(|f| f.ball_pos()).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use rallycast_match_model::frame::{Ball, NormalizedFrame, Player, PlayerRole};
    use rallycast_match_model::geometry::{Coord, Court};

    use crate::frame_buffer::FrameBuffer;

    pub fn ball_frame(x: f64, y: f64) -> NormalizedFrame {
        NormalizedFrame::new(
            Some(Ball::new(Coord::new(x, y))),
            Court::canonical(),
            None,
            None,
        )
    }

    pub fn empty_frame() -> NormalizedFrame {
        NormalizedFrame::new(None, Court::canonical(), None, None)
    }

    pub fn player_frame(role: PlayerRole, x: f64, y: f64) -> NormalizedFrame {
        let player = Some(Player::new(Coord::new(x, y), role));
        match role {
            PlayerRole::P1 => NormalizedFrame::new(None, Court::canonical(), player, None),
            PlayerRole::P2 => NormalizedFrame::new(None, Court::canonical(), None, player),
        }
    }

    pub fn buffer_of(frames: impl IntoIterator<Item = NormalizedFrame>) -> FrameBuffer {
        let mut buffer = FrameBuffer::new(300);
        for frame in frames {
            buffer.push(frame);
        }
        buffer
    }

    /// Buffer of frames whose ball moves along `xs` at a fixed `y`.
    pub fn ball_xs(xs: &[f64]) -> FrameBuffer {
        buffer_of(xs.iter().map(|&x| ball_frame(x, 4.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_order_is_fixed() {
        let battery = default_battery(&TesterConfig::default(), 60);
        let names: Vec<&str> = battery.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), 13);
        assert_eq!(
            &names[..3],
            &["right_of_net", "left_of_net", "bounce_or_shot"]
        );
        assert_eq!(names[3], "p1_up");
        assert_eq!(names[10], "p2_right");
        assert_eq!(&names[11..], &["ball_stopped", "ball_in_out"]);
    }

    #[test]
    fn test_battery_window_lengths() {
        let battery = default_battery(&TesterConfig::default(), 60);
        let windows: Vec<usize> = battery.iter().map(|t| t.window_len()).collect();
        assert_eq!(&windows[..3], &[1, 1, 3]);
        assert!(windows[3..11].iter().all(|&w| w == 5));
        assert_eq!(windows[11], 31);
        assert_eq!(windows[12], 3);
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: TesterConfig =
            serde_json::from_str(r#"{"movement_threshold": 1.0, "bounce_rule": "reversal"}"#)
                .unwrap();
        assert_eq!(config.movement_threshold, 1.0);
        assert_eq!(config.bounce_rule, BounceRule::Reversal);
        assert_eq!(config.movement_window, 5);
        assert_eq!(config.bounce_speed_ratio, 0.8);
    }
}
