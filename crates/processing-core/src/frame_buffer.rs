//! Bounded history of normalized frames.

use std::collections::{vec_deque, VecDeque};

use rallycast_match_model::frame::NormalizedFrame;

/// Insertion-ordered ring of the most recent frames.
///
/// Never holds more than `capacity` frames; pushing onto a full buffer
/// evicts exactly the oldest frame.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    frames: VecDeque<NormalizedFrame>,
    capacity: usize,
}

impl FrameBuffer {
    /// Buffer holding at most `capacity` frames (at least one).
    ///
    /// Storage grows with the frames actually pushed, so a large capacity
    /// costs nothing up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Buffer sized for `seconds` of history at `fps`.
    pub fn for_fps(fps: u32, seconds: u32) -> Self {
        Self::new((fps as usize).saturating_mul(seconds as usize))
    }

    pub fn push(&mut self, frame: NormalizedFrame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        assert!(
            self.frames.len() <= self.capacity,
            "frame buffer over capacity: {} > {}",
            self.frames.len(),
            self.capacity
        );
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The last `n` frames, oldest first. Shorter when the buffer holds
    /// fewer than `n`.
    pub fn window(&self, n: usize) -> FrameWindow<'_> {
        let start = self.frames.len().saturating_sub(n);
        FrameWindow {
            frames: &self.frames,
            start,
        }
    }
}

/// Read-only view over the trailing frames of a [`FrameBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct FrameWindow<'a> {
    frames: &'a VecDeque<NormalizedFrame>,
    start: usize,
}

impl<'a> FrameWindow<'a> {
    pub fn len(&self) -> usize {
        self.frames.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frame `i` of the window, `0` being the oldest.
    pub fn get(&self, i: usize) -> Option<&'a NormalizedFrame> {
        if i < self.len() {
            self.frames.get(self.start + i)
        } else {
            None
        }
    }

    pub fn first(&self) -> Option<&'a NormalizedFrame> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&'a NormalizedFrame> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> std::iter::Skip<vec_deque::Iter<'a, NormalizedFrame>> {
        self.frames.iter().skip(self.start)
    }
}
