//! Object tracking in pixel space.
//!
//! Turns one frame of raw detector candidates into at most one ball and at
//! most two players.
//!
//! # Ball
//!
//! The ball track is a small state machine:
//!
//! ```text
//!            match                      miss (misses < limit)
//! NoTrack ---------> Tracking ----------------------------> Coasting(n)
//!    ^                  ^  |                                  |    |
//!    |                  |  +------ match ------+              |    |
//!    |                  +----------------------|---- match ---+    |
//!    +-----------------------------------------+-- miss (n = limit)+
//! ```
//!
//! Each frame the tracker predicts `position + velocity`, gates the
//! candidates (confidence, box area, in-play zone), matches the one nearest
//! the prediction (or the most confident one when there is no track), and
//! either updates the smoothed velocity or coasts on the prediction.
//!
//! # Players
//!
//! People whose feet stand on or near the court are split by the net line:
//! the most confident person below it becomes `P1`, above it `P2`.

use rallycast_match_model::detection::{Detection, DetectionFrame};
use rallycast_match_model::frame::{Ball, Frame, Player, PlayerRole};
use rallycast_match_model::geometry::{convex_quad_contains, Coord, Court};
use serde::{Deserialize, Serialize};

/// Consecutive missed frames the ball may coast through before the track
/// is dropped.
pub const MAX_COAST_FRAMES: u32 = 5;

/// Largest distance (pixels) between prediction and candidate for a match.
pub const MAX_DIST_ERROR: f64 = 100.0;

/// Top of the in-play zone. Far above the image so lobs stay in play.
const BALL_ZONE_TOP_Y: f64 = -1000.0;

/// Which point of a person's bounding box is reported as their position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAnchor {
    /// Center of the box.
    #[default]
    Center,
    /// Bottom-center of the box.
    Feet,
}

/// Configuration for the object tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Candidates below this confidence are ignored.
    pub min_confidence: f64,

    /// Ball boxes larger than this (pixels squared) are treated as noise.
    pub max_ball_area: f64,

    /// How far (pixels) the in-play zone extends past the baselines.
    pub ball_zone_buffer: f64,

    /// Match gate between prediction and candidate (pixels).
    pub max_match_distance: f64,

    /// Missed frames to coast through before dropping the track.
    pub max_coast_frames: u32,

    /// Weight of the newest velocity sample in the exponential smoothing.
    pub velocity_smoothing: f64,

    /// Keep reporting the last known ball position after the track drops.
    pub hold_last_known: bool,

    /// How far (pixels) outside the court a player's feet may be.
    pub player_court_buffer: f64,

    /// Reported player position.
    pub player_anchor: PlayerAnchor,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.15,
            max_ball_area: 400.0,
            ball_zone_buffer: 50.0,
            max_match_distance: MAX_DIST_ERROR,
            max_coast_frames: MAX_COAST_FRAMES,
            velocity_smoothing: 0.7,
            hold_last_known: false,
            player_court_buffer: 150.0,
            player_anchor: PlayerAnchor::Center,
        }
    }
}

/// State of the ball track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TrackState {
    /// No ball is being followed.
    #[default]
    NoTrack,
    /// The ball was matched on the last frame.
    Tracking { position: Coord, velocity: Coord },
    /// The ball has been missed `misses` times in a row and is reported at
    /// its predicted position.
    Coasting {
        position: Coord,
        velocity: Coord,
        misses: u32,
    },
}

impl TrackState {
    /// Last reported position, if a track exists.
    pub fn position(&self) -> Option<Coord> {
        match *self {
            TrackState::NoTrack => None,
            TrackState::Tracking { position, .. } | TrackState::Coasting { position, .. } => {
                Some(position)
            }
        }
    }

    /// Smoothed velocity in pixels per frame. Zero without a track.
    pub fn velocity(&self) -> Coord {
        match *self {
            TrackState::NoTrack => Coord::ZERO,
            TrackState::Tracking { velocity, .. } | TrackState::Coasting { velocity, .. } => {
                velocity
            }
        }
    }

    /// Consecutive missed frames.
    pub fn misses(&self) -> u32 {
        match *self {
            TrackState::Coasting { misses, .. } => misses,
            _ => 0,
        }
    }

    /// Where the ball is expected on the next frame.
    pub fn predicted(&self) -> Option<Coord> {
        self.position().map(|p| p + self.velocity())
    }
}

/// Single-ball tracker.
#[derive(Debug, Clone)]
pub struct BallTracker {
    config: TrackerConfig,
    state: TrackState,
    last_valid: Option<Coord>,
}

impl BallTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: TrackState::NoTrack,
            last_valid: None,
        }
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    /// Advance the track by one frame.
    pub fn update(&mut self, candidates: &[Detection], court: &Court) -> Option<Ball> {
        let predicted = self.state.predicted();
        let gated = self.gate(candidates, court);

        let matched = match predicted {
            Some(prediction) => gated
                .iter()
                .map(|c| (c, c.pos.distance_to(prediction)))
                .filter(|(_, dist)| *dist < self.config.max_match_distance)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(c, _)| c.pos),
            None => gated
                .iter()
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
                .map(|c| c.pos),
        };

        match (matched, predicted) {
            (Some(pos), _) => {
                let velocity = match self.state.position() {
                    Some(prev) => {
                        let alpha = self.config.velocity_smoothing;
                        (pos - prev) * alpha + self.state.velocity() * (1.0 - alpha)
                    }
                    None => self.state.velocity(),
                };
                tracing::trace!(x = pos.x, y = pos.y, "Ball matched");
                self.state = TrackState::Tracking {
                    position: pos,
                    velocity,
                };
                self.last_valid = Some(pos);
                Some(Ball::new(pos))
            }
            (None, Some(prediction)) if self.state.misses() < self.config.max_coast_frames => {
                let misses = self.state.misses() + 1;
                tracing::trace!(misses, "Ball missed, coasting on prediction");
                self.state = TrackState::Coasting {
                    position: prediction,
                    velocity: self.state.velocity(),
                    misses,
                };
                self.last_valid = Some(prediction);
                Some(Ball::new(prediction))
            }
            (None, _) => {
                if self.state != TrackState::NoTrack {
                    tracing::trace!("Ball track dropped");
                }
                self.state = TrackState::NoTrack;
                if self.config.hold_last_known {
                    self.last_valid.map(Ball::new)
                } else {
                    None
                }
            }
        }
    }

    /// Candidates that pass the confidence, size and in-play-zone gates.
    fn gate(&self, candidates: &[Detection], court: &Court) -> Vec<Candidate> {
        let zone = ball_zone(court, self.config.ball_zone_buffer);
        candidates
            .iter()
            .filter(|d| d.confidence >= self.config.min_confidence)
            .filter(|d| d.bbox.area() <= self.config.max_ball_area)
            .map(|d| Candidate {
                pos: d.bbox.center(),
                confidence: d.confidence,
            })
            .filter(|c| convex_quad_contains(&zone, c.pos))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    pos: Coord,
    confidence: f64,
}

/// The region a ball in play can appear in: the court's horizontal extent
/// widened by `buffer`, from the near baseline up past the top of the image.
pub fn ball_zone(court: &Court, buffer: f64) -> [Coord; 4] {
    [
        Coord::new(court.bl.x - buffer, BALL_ZONE_TOP_Y),
        Coord::new(court.br.x + buffer, BALL_ZONE_TOP_Y),
        Coord::new(court.br.x + buffer, court.br.y + buffer),
        Coord::new(court.bl.x - buffer, court.bl.y + buffer),
    ]
}

/// Pick at most one player per half of the court.
///
/// Returns `(P1, P2)`: the most confident person whose feet are below the
/// net line, and the most confident one above it.
pub fn select_players(
    people: &[Detection],
    court: &Court,
    config: &TrackerConfig,
) -> (Option<Player>, Option<Player>) {
    let net_y = court.net_line_y();
    let mut near: Option<&Detection> = None;
    let mut far: Option<&Detection> = None;

    for person in people
        .iter()
        .filter(|d| d.confidence >= config.min_confidence)
    {
        let feet = person.bbox.foot_point();
        if !court.contains_with_margin(feet, config.player_court_buffer) {
            continue;
        }
        let slot = if feet.y < net_y { &mut far } else { &mut near };
        if slot.map_or(true, |best| person.confidence > best.confidence) {
            *slot = Some(person);
        }
    }

    let to_player = |d: &Detection, role| {
        let pos = match config.player_anchor {
            PlayerAnchor::Center => d.bbox.center(),
            PlayerAnchor::Feet => d.bbox.foot_point(),
        };
        Player::new(pos, role)
    };

    (
        near.map(|d| to_player(d, PlayerRole::P1)),
        far.map(|d| to_player(d, PlayerRole::P2)),
    )
}

/// Tracks the ball and players across frames.
#[derive(Debug, Clone)]
pub struct ObjectTracker {
    config: TrackerConfig,
    ball: BallTracker,
}

impl ObjectTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            ball: BallTracker::new(config.clone()),
            config,
        }
    }

    /// Current ball track state.
    pub fn ball_state(&self) -> &TrackState {
        self.ball.state()
    }

    /// Produce the pixel-space frame for one set of detections.
    pub fn track(&mut self, detections: &DetectionFrame, court: &Court) -> Frame {
        let ball = self.ball.update(&detections.balls, court);
        let (player1, player2) = select_players(&detections.people, court, &self.config);
        Frame::new(ball, *court, player1, player2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rallycast_match_model::detection::BoundingBox;

    fn court() -> Court {
        Court::new(
            Coord::new(700.0, 300.0),
            Coord::new(1200.0, 300.0),
            Coord::new(1600.0, 900.0),
            Coord::new(300.0, 900.0),
        )
    }

    fn ball_at(x: f64, y: f64, confidence: f64) -> Detection {
        Detection::new(BoundingBox::centered(x, y, 12.0, 12.0), confidence)
    }

    fn person(cx: f64, feet_y: f64, confidence: f64) -> Detection {
        Detection::new(
            BoundingBox::new(cx - 30.0, feet_y - 150.0, cx + 30.0, feet_y),
            confidence,
        )
    }

    #[test]
    fn test_first_detection_starts_track_without_velocity() {
        let mut tracker = BallTracker::new(TrackerConfig::default());
        let ball = tracker.update(&[ball_at(960.0, 500.0, 0.5)], &court());

        assert_eq!(ball, Some(Ball::new(Coord::new(960.0, 500.0))));
        assert_eq!(tracker.state().velocity(), Coord::ZERO);
        assert!(matches!(tracker.state(), TrackState::Tracking { .. }));
    }

    #[test]
    fn test_velocity_is_exponentially_smoothed() {
        let mut tracker = BallTracker::new(TrackerConfig::default());
        tracker.update(&[ball_at(960.0, 500.0, 0.5)], &court());
        tracker.update(&[ball_at(970.0, 510.0, 0.5)], &court());
        let v = tracker.state().velocity();
        assert!((v.x - 7.0).abs() < 1e-9);
        assert!((v.y - 7.0).abs() < 1e-9);

        // Prediction (977, 517); instantaneous velocity (20, 0).
        tracker.update(&[ball_at(990.0, 510.0, 0.5)], &court());
        let v = tracker.state().velocity();
        assert!((v.x - (0.7 * 20.0 + 0.3 * 7.0)).abs() < 1e-9);
        assert!((v.y - (0.3 * 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_coasts_five_frames_then_drops() {
        let mut tracker = BallTracker::new(TrackerConfig::default());
        tracker.update(&[ball_at(960.0, 500.0, 0.5)], &court());
        tracker.update(&[ball_at(970.0, 510.0, 0.5)], &court());

        let mut expected = Coord::new(970.0, 510.0);
        for miss in 1..=MAX_COAST_FRAMES {
            expected = expected + Coord::new(7.0, 7.0);
            let ball = tracker
                .update(&[], &court())
                .expect("coasting reports a ball");
            assert!(ball.pos.distance_to(expected) < 1e-9);
            assert_eq!(tracker.state().misses(), miss);
        }

        assert_eq!(tracker.update(&[], &court()), None);
        assert_eq!(*tracker.state(), TrackState::NoTrack);
        assert_eq!(tracker.state().velocity(), Coord::ZERO);
        assert_eq!(tracker.state().misses(), 0);
    }

    #[test]
    fn test_rematch_while_coasting_resets_misses() {
        let mut tracker = BallTracker::new(TrackerConfig::default());
        tracker.update(&[ball_at(960.0, 500.0, 0.5)], &court());
        tracker.update(&[], &court());
        tracker.update(&[], &court());
        assert_eq!(tracker.state().misses(), 2);

        tracker.update(&[ball_at(965.0, 505.0, 0.5)], &court());
        assert_eq!(tracker.state().misses(), 0);
        assert!(matches!(tracker.state(), TrackState::Tracking { .. }));
    }

    #[test]
    fn test_candidate_beyond_gate_is_not_matched() {
        let mut tracker = BallTracker::new(TrackerConfig::default());
        tracker.update(&[ball_at(960.0, 500.0, 0.5)], &court());

        let ball = tracker.update(&[ball_at(1100.0, 500.0, 0.9)], &court());
        assert_eq!(ball, Some(Ball::new(Coord::new(960.0, 500.0))));
        assert_eq!(tracker.state().misses(), 1);
    }

    #[test]
    fn test_nearest_candidate_wins_over_confidence() {
        let mut tracker = BallTracker::new(TrackerConfig::default());
        tracker.update(&[ball_at(960.0, 500.0, 0.5)], &court());

        let ball = tracker.update(
            &[ball_at(1040.0, 500.0, 0.9), ball_at(965.0, 500.0, 0.2)],
            &court(),
        );
        assert_eq!(ball.map(|b| b.pos), Some(Coord::new(965.0, 500.0)));
    }

    #[test]
    fn test_without_track_most_confident_wins() {
        let mut tracker = BallTracker::new(TrackerConfig::default());
        let ball = tracker.update(
            &[ball_at(800.0, 500.0, 0.3), ball_at(1000.0, 600.0, 0.8)],
            &court(),
        );
        assert_eq!(ball.map(|b| b.pos), Some(Coord::new(1000.0, 600.0)));
    }

    #[test]
    fn test_gating_rejects_noise() {
        let mut tracker = BallTracker::new(TrackerConfig::default());
        let too_big = Detection::new(BoundingBox::centered(960.0, 500.0, 30.0, 30.0), 0.9);
        let off_court = ball_at(100.0, 500.0, 0.9);
        let below_baseline = ball_at(960.0, 1000.0, 0.9);
        let faint = ball_at(960.0, 500.0, 0.05);

        let ball = tracker.update(&[too_big, off_court, below_baseline, faint], &court());
        assert_eq!(ball, None);
        assert_eq!(*tracker.state(), TrackState::NoTrack);
    }

    #[test]
    fn test_zone_admits_high_lobs() {
        let mut tracker = BallTracker::new(TrackerConfig::default());
        let ball = tracker.update(&[ball_at(960.0, -200.0, 0.5)], &court());
        assert!(ball.is_some());
    }

    #[test]
    fn test_hold_last_known_after_drop() {
        let config = TrackerConfig {
            hold_last_known: true,
            max_coast_frames: 1,
            ..Default::default()
        };
        let mut tracker = BallTracker::new(config);
        tracker.update(&[ball_at(960.0, 500.0, 0.5)], &court());
        tracker.update(&[], &court());

        let held = tracker.update(&[], &court());
        assert_eq!(held, Some(Ball::new(Coord::new(960.0, 500.0))));
        assert_eq!(*tracker.state(), TrackState::NoTrack);
    }

    #[test]
    fn test_players_split_by_net_line() {
        // Net line y = 600.
        let people = [
            person(900.0, 850.0, 0.6),
            person(1000.0, 820.0, 0.9),
            person(950.0, 400.0, 0.7),
        ];
        let (p1, p2) = select_players(&people, &court(), &TrackerConfig::default());

        let p1 = p1.unwrap();
        assert_eq!(p1.role, PlayerRole::P1);
        assert_eq!(p1.pos, Coord::new(1000.0, 745.0));

        let p2 = p2.unwrap();
        assert_eq!(p2.role, PlayerRole::P2);
        assert_eq!(p2.pos, Coord::new(950.0, 325.0));
    }

    #[test]
    fn test_players_off_court_are_ignored() {
        let people = [person(50.0, 850.0, 0.99), person(960.0, 1200.0, 0.99)];
        let (p1, p2) = select_players(&people, &court(), &TrackerConfig::default());
        assert!(p1.is_none());
        assert!(p2.is_none());
    }

    #[test]
    fn test_player_within_buffer_is_kept_with_feet_anchor() {
        let config = TrackerConfig {
            player_anchor: PlayerAnchor::Feet,
            ..Default::default()
        };
        // 100 px below the near baseline, inside the 150 px buffer.
        let (p1, _) = select_players(&[person(960.0, 1000.0, 0.5)], &court(), &config);
        assert_eq!(p1.map(|p| p.pos), Some(Coord::new(960.0, 1000.0)));
    }

    #[test]
    fn test_object_tracker_builds_pixel_frame() {
        let mut tracker = ObjectTracker::new(TrackerConfig::default());
        let detections = DetectionFrame::new(
            vec![ball_at(960.0, 500.0, 0.5)],
            vec![person(960.0, 850.0, 0.8)],
        );
        let frame = tracker.track(&detections, &court());

        assert!(frame.ball.is_some());
        assert!(frame.player1.is_some());
        assert!(frame.player2.is_none());
        assert_eq!(frame.court, court());
        assert!(matches!(tracker.ball_state(), TrackState::Tracking { .. }));
    }
}
