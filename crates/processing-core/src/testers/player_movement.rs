use rallycast_match_model::event::{Event, MoveDirection};
use rallycast_match_model::frame::PlayerRole;

use super::{EventTester, TesterState};
use crate::frame_buffer::FrameWindow;

/// Reports one player moving in one direction.
///
/// Measures the displacement between the first and last frame of a full
/// window in which the player was tracked on every frame. Along the court,
/// decreasing `x` is up (towards the far baseline); across it, decreasing
/// `y` is left.
#[derive(Debug, Clone)]
pub struct PlayerMovementTester {
    role: PlayerRole,
    direction: MoveDirection,
    window: usize,
    threshold: f64,
}

impl PlayerMovementTester {
    pub fn new(role: PlayerRole, direction: MoveDirection, window: usize, threshold: f64) -> Self {
        Self {
            role,
            direction,
            window: window.max(2),
            threshold,
        }
    }
}

impl EventTester for PlayerMovementTester {
    fn name(&self) -> &'static str {
        Event::player_moved(self.role, self.direction).label()
    }

    fn window_len(&self) -> usize {
        self.window
    }

    fn test(&self, window: FrameWindow<'_>, _state: &mut TesterState) -> Option<Event> {
        if window.len() < self.window {
            return None;
        }
        let mut positions = window.iter().map(|f| f.player(self.role).map(|p| p.pos));
        let first = positions.next()??;
        let mut last = first;
        for pos in positions {
            last = pos?;
        }

        let d = last - first;
        let moved = match self.direction {
            MoveDirection::Up => d.x < -self.threshold,
            MoveDirection::Down => d.x > self.threshold,
            MoveDirection::Left => d.y < -self.threshold,
            MoveDirection::Right => d.y > self.threshold,
        };
        moved.then(|| Event::player_moved(self.role, self.direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testers::test_support::{buffer_of, empty_frame, player_frame};

    fn run(role: PlayerRole, direction: MoveDirection, path: &[(f64, f64)]) -> Option<Event> {
        let buffer = buffer_of(path.iter().map(|&(x, y)| player_frame(role, x, y)));
        let tester = PlayerMovementTester::new(role, direction, 5, 0.5);
        let mut state = TesterState::default();
        tester.test(buffer.window(tester.window_len()), &mut state)
    }

    fn straight(from: (f64, f64), to: (f64, f64)) -> Vec<(f64, f64)> {
        (0..5)
            .map(|i| {
                let t = i as f64 / 4.0;
                (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
            })
            .collect()
    }

    #[test]
    fn test_each_direction() {
        let p1 = PlayerRole::P1;
        let start = (20.0, 4.0);
        assert_eq!(
            run(p1, MoveDirection::Up, &straight(start, (19.0, 4.0))),
            Some(Event::PlayerUp(p1))
        );
        assert_eq!(
            run(p1, MoveDirection::Down, &straight(start, (21.0, 4.0))),
            Some(Event::PlayerDown(p1))
        );
        assert_eq!(
            run(p1, MoveDirection::Left, &straight(start, (20.0, 3.0))),
            Some(Event::PlayerLeft(p1))
        );
        assert_eq!(
            run(p1, MoveDirection::Right, &straight(start, (20.0, 5.0))),
            Some(Event::PlayerRight(p1))
        );
    }

    #[test]
    fn test_wrong_direction_is_nothing() {
        let path = straight((20.0, 4.0), (21.0, 4.0));
        assert_eq!(run(PlayerRole::P1, MoveDirection::Up, &path), None);
        assert_eq!(run(PlayerRole::P1, MoveDirection::Left, &path), None);
    }

    #[test]
    fn test_threshold_is_strict() {
        let path = straight((20.0, 4.0), (20.5, 4.0));
        assert_eq!(run(PlayerRole::P1, MoveDirection::Down, &path), None);
    }

    #[test]
    fn test_qualified_by_role() {
        let path = straight((3.0, 4.0), (2.0, 4.0));
        assert_eq!(
            run(PlayerRole::P2, MoveDirection::Up, &path),
            Some(Event::PlayerUp(PlayerRole::P2))
        );

        // Frames only carry P2, so the P1 tester sees nobody.
        let role = PlayerRole::P2;
        let buffer = buffer_of(path.iter().map(|&(x, y)| player_frame(role, x, y)));
        let tester = PlayerMovementTester::new(PlayerRole::P1, MoveDirection::Up, 5, 0.5);
        let mut state = TesterState::default();
        assert_eq!(tester.test(buffer.window(5), &mut state), None);
    }

    #[test]
    fn test_short_window_is_nothing() {
        let path = straight((20.0, 4.0), (18.0, 4.0));
        assert_eq!(run(PlayerRole::P1, MoveDirection::Up, &path[..4]), None);
    }

    #[test]
    fn test_player_missing_in_any_frame_is_nothing() {
        let role = PlayerRole::P1;
        let buffer = buffer_of([
            player_frame(role, 20.0, 4.0),
            player_frame(role, 19.5, 4.0),
            empty_frame(),
            player_frame(role, 19.0, 4.0),
            player_frame(role, 18.0, 4.0),
        ]);
        let tester = PlayerMovementTester::new(role, MoveDirection::Up, 5, 0.5);
        let mut state = TesterState::default();
        assert_eq!(tester.test(buffer.window(5), &mut state), None);
    }
}
