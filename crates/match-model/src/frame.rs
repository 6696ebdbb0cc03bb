//! Tracked per-frame positions.

use serde::{Deserialize, Serialize};

use crate::geometry::{Coord, Court};

/// Stable player label, assigned by which half of the court the player is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerRole {
    /// Player on the near half (below the net in the image).
    P1,
    /// Player on the far half (above the net in the image).
    P2,
}

impl PlayerRole {
    pub const ALL: [PlayerRole; 2] = [PlayerRole::P1, PlayerRole::P2];
}

/// The tracked ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Coord,
}

impl Ball {
    pub fn new(pos: Coord) -> Self {
        Self { pos }
    }
}

/// A tracked player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Coord,
    pub role: PlayerRole,
}

impl Player {
    pub fn new(pos: Coord, role: PlayerRole) -> Self {
        Self { pos, role }
    }
}

/// One tracked sample in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub ball: Option<Ball>,
    pub court: Court,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
}

impl Frame {
    pub fn new(
        ball: Option<Ball>,
        court: Court,
        player1: Option<Player>,
        player2: Option<Player>,
    ) -> Self {
        Self {
            ball,
            court,
            player1,
            player2,
        }
    }
}

/// One tracked sample in court meters. Built only by the perspective
/// normalizer; never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFrame {
    pub ball: Option<Ball>,
    pub court: Court,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
}

impl NormalizedFrame {
    pub fn new(
        ball: Option<Ball>,
        court: Court,
        player1: Option<Player>,
        player2: Option<Player>,
    ) -> Self {
        Self {
            ball,
            court,
            player1,
            player2,
        }
    }

    /// Ball position, if the ball was tracked in this frame.
    pub fn ball_pos(&self) -> Option<Coord> {
        self.ball.map(|b| b.pos)
    }

    /// The player holding `role`, if tracked in this frame.
    pub fn player(&self, role: PlayerRole) -> Option<&Player> {
        match role {
            PlayerRole::P1 => self.player1.as_ref(),
            PlayerRole::P2 => self.player2.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_lookup_by_role() {
        let p1 = Player::new(Coord::new(20.0, 4.0), PlayerRole::P1);
        let frame = NormalizedFrame::new(None, Court::canonical(), Some(p1), None);

        assert_eq!(frame.player(PlayerRole::P1), Some(&p1));
        assert_eq!(frame.player(PlayerRole::P2), None);
        assert_eq!(frame.ball_pos(), None);
    }

    #[test]
    fn test_role_serializes_by_name() {
        assert_eq!(serde_json::to_string(&PlayerRole::P2).unwrap(), "\"P2\"");
    }
}
