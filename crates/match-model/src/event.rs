//! Gameplay events and the event log format.
//!
//! The event log is the pipeline's only output: a JSON array of
//! `{"frame": <1-based index>, "event": "<tag>"}` objects in frame order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::PlayerRole;

/// Direction of a player movement on the normalized court.
///
/// Up and down run along the court (towards the far and near baseline);
/// left and right run across it as seen by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Up,
        MoveDirection::Down,
        MoveDirection::Left,
        MoveDirection::Right,
    ];
}

/// A detected gameplay event. Carries nothing beyond its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Event {
    /// Ball is on the near side of the net (`x > net_x`).
    RightOfNet,
    /// Ball is on the far side of the net, or exactly over it (`x <= net_x`).
    LeftOfNet,
    /// Ball reversed its along-court direction.
    Shot,
    /// Ball lost most of its along-court speed without reversing.
    Bounce,
    PlayerUp(PlayerRole),
    PlayerDown(PlayerRole),
    PlayerLeft(PlayerRole),
    PlayerRight(PlayerRole),
    /// Ball has been (nearly) motionless for a sustained period.
    BallStopped,
    /// Ball bounced inside the singles court.
    BallIn,
    /// Ball bounced outside the singles court.
    BallOut,
}

impl Event {
    /// Every event, in a fixed order.
    pub const ALL: [Event; 15] = [
        Event::RightOfNet,
        Event::LeftOfNet,
        Event::Shot,
        Event::Bounce,
        Event::PlayerUp(PlayerRole::P1),
        Event::PlayerDown(PlayerRole::P1),
        Event::PlayerLeft(PlayerRole::P1),
        Event::PlayerRight(PlayerRole::P1),
        Event::PlayerUp(PlayerRole::P2),
        Event::PlayerDown(PlayerRole::P2),
        Event::PlayerLeft(PlayerRole::P2),
        Event::PlayerRight(PlayerRole::P2),
        Event::BallStopped,
        Event::BallIn,
        Event::BallOut,
    ];

    /// The movement event for a player and direction.
    pub fn player_moved(role: PlayerRole, direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up => Event::PlayerUp(role),
            MoveDirection::Down => Event::PlayerDown(role),
            MoveDirection::Left => Event::PlayerLeft(role),
            MoveDirection::Right => Event::PlayerRight(role),
        }
    }

    /// The tag string written to the event log.
    pub fn label(&self) -> &'static str {
        use PlayerRole::{P1, P2};
        match self {
            Event::RightOfNet => "right_of_net",
            Event::LeftOfNet => "left_of_net",
            Event::Shot => "shot",
            Event::Bounce => "bounce",
            Event::PlayerUp(P1) => "p1_up",
            Event::PlayerDown(P1) => "p1_down",
            Event::PlayerLeft(P1) => "p1_left",
            Event::PlayerRight(P1) => "p1_right",
            Event::PlayerUp(P2) => "p2_up",
            Event::PlayerDown(P2) => "p2_down",
            Event::PlayerLeft(P2) => "p2_left",
            Event::PlayerRight(P2) => "p2_right",
            Event::BallStopped => "ball_stopped",
            Event::BallIn => "ball_in",
            Event::BallOut => "ball_out",
        }
    }

    /// Parse a tag string back into an event.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == label)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Event> for String {
    fn from(event: Event) -> Self {
        event.label().to_string()
    }
}

/// Raised when a log entry carries a tag this crate does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event tag `{0}`")]
pub struct UnknownEvent(pub String);

impl TryFrom<String> for Event {
    type Error = UnknownEvent;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Event::from_label(&label).ok_or(UnknownEvent(label))
    }
}

/// One entry of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFrame {
    /// 1-based index of the frame the event was observed on.
    pub frame: u64,

    /// Event tag.
    pub event: String,
}

impl EventFrame {
    pub fn new(frame: u64, event: impl Into<String>) -> Self {
        Self {
            frame,
            event: event.into(),
        }
    }

    /// The typed event, if the tag is a known one.
    pub fn kind(&self) -> Option<Event> {
        Event::from_label(&self.event)
    }
}

impl From<(u64, Event)> for EventFrame {
    fn from((frame, event): (u64, Event)) -> Self {
        Self::new(frame, event.label())
    }
}

/// Parse an event log from its JSON array form.
pub fn parse_event_log(json: &str) -> Result<Vec<EventFrame>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serialize an event log as a pretty-printed JSON array.
pub fn serialize_event_log(events: &[EventFrame]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(events)
}
