use rallycast_match_model::event::Event;

use super::{EventTester, TesterState};
use crate::frame_buffer::FrameWindow;

/// Which side of the net a [`SideTester`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Near side, `x > net_x`.
    Right,
    /// Far side including the net itself, `x <= net_x`.
    Left,
}

/// Reports which side of the net the ball is on in the latest frame.
#[derive(Debug, Clone)]
pub struct SideTester {
    side: Side,
}

impl SideTester {
    pub fn new(side: Side) -> Self {
        Self { side }
    }
}

impl EventTester for SideTester {
    fn name(&self) -> &'static str {
        match self.side {
            Side::Right => "right_of_net",
            Side::Left => "left_of_net",
        }
    }

    fn window_len(&self) -> usize {
        1
    }

    fn test(&self, window: FrameWindow<'_>, _state: &mut TesterState) -> Option<Event> {
        let frame = window.last()?;
        let x = frame.ball_pos()?.x;
        let net_x = frame.court.net_x();
        match self.side {
            Side::Right if x > net_x => Some(Event::RightOfNet),
            Side::Left if x <= net_x => Some(Event::LeftOfNet),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_buffer::FrameBuffer;
    use crate::testers::test_support::{ball_xs, buffer_of, empty_frame};
    use rallycast_match_model::geometry::NET_X_M;

    fn run(side: Side, xs: &[f64]) -> Option<Event> {
        let buffer = ball_xs(xs);
        let tester = SideTester::new(side);
        let mut state = TesterState::default();
        tester.test(buffer.window(tester.window_len()), &mut state)
    }

    #[test]
    fn test_right_of_net() {
        assert_eq!(run(Side::Right, &[15.0]), Some(Event::RightOfNet));
        assert_eq!(run(Side::Left, &[15.0]), None);
    }

    #[test]
    fn test_left_of_net() {
        assert_eq!(run(Side::Left, &[3.0]), Some(Event::LeftOfNet));
        assert_eq!(run(Side::Right, &[3.0]), None);
    }

    #[test]
    fn test_net_itself_counts_as_left() {
        assert_eq!(run(Side::Left, &[NET_X_M]), Some(Event::LeftOfNet));
        assert_eq!(run(Side::Right, &[NET_X_M]), None);
    }

    #[test]
    fn test_only_latest_frame_matters() {
        assert_eq!(run(Side::Right, &[3.0, 3.0, 20.0]), Some(Event::RightOfNet));
    }

    #[test]
    fn test_missing_ball_or_history() {
        let tester = SideTester::new(Side::Left);
        let mut state = TesterState::default();
        let buffer = buffer_of([empty_frame()]);
        assert_eq!(tester.test(buffer.window(1), &mut state), None);

        let empty = FrameBuffer::new(1);
        assert_eq!(tester.test(empty.window(1), &mut state), None);
    }
}
