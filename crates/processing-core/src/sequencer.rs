//! Ordered event log with run-length compression.

use rallycast_match_model::event::{Event, EventFrame};

/// Accumulates events in the order the pipeline observes them.
#[derive(Debug, Clone, Default)]
pub struct EventSequencer {
    events: Vec<EventFrame>,
}

impl EventSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event seen on `frame` (1-based).
    ///
    /// # Panics
    ///
    /// If `frame` is earlier than the last recorded frame.
    pub fn add_event(&mut self, frame: u64, event: Event) {
        if let Some(last) = self.events.last() {
            assert!(
                frame >= last.frame,
                "events out of order: frame {} after frame {}",
                frame,
                last.frame
            );
        }
        self.events.push(EventFrame::from((frame, event)));
    }

    /// Every event recorded so far, unmerged.
    pub fn events(&self) -> &[EventFrame] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The log with consecutive repeats of an event collapsed.
    pub fn merge_consecutive_events(&self) -> Vec<EventFrame> {
        merge_consecutive(&self.events)
    }

    pub fn into_events(self) -> Vec<EventFrame> {
        self.events
    }
}

/// Collapse each run of entries with the same event tag to its first entry.
///
/// Repeats that are not adjacent are kept. Idempotent.
pub fn merge_consecutive(events: &[EventFrame]) -> Vec<EventFrame> {
    let mut merged: Vec<EventFrame> = Vec::with_capacity(events.len());
    for entry in events {
        if merged.last().map_or(true, |last| last.event != entry.event) {
            merged.push(entry.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn log(entries: &[(u64, &str)]) -> Vec<EventFrame> {
        entries
            .iter()
            .map(|&(f, e)| EventFrame::new(f, e))
            .collect()
    }

    #[test]
    fn test_merge_keeps_first_of_each_run() {
        let events = log(&[
            (1, "bounce"),
            (2, "bounce"),
            (3, "shot"),
            (4, "shot"),
            (5, "bounce"),
        ]);
        let expected = log(&[(1, "bounce"), (3, "shot"), (5, "bounce")]);

        let once = merge_consecutive(&events);
        assert_eq!(once, expected);
        assert_eq!(merge_consecutive(&once), expected);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_consecutive(&[]).is_empty());
        assert!(EventSequencer::new().merge_consecutive_events().is_empty());
    }

    #[test]
    fn test_merge_only_adjacent_entries() {
        // Interleaved tags from the same frames never merge.
        let events = log(&[
            (1, "right_of_net"),
            (1, "bounce"),
            (2, "right_of_net"),
            (2, "bounce"),
        ]);
        assert_eq!(merge_consecutive(&events), events);
    }

    #[test]
    fn test_sequencer_records_in_order() {
        let mut seq = EventSequencer::new();
        seq.add_event(1, Event::LeftOfNet);
        seq.add_event(2, Event::LeftOfNet);
        seq.add_event(2, Event::Shot);
        seq.add_event(5, Event::LeftOfNet);

        assert_eq!(seq.len(), 4);
        assert_eq!(
            seq.merge_consecutive_events(),
            log(&[(1, "left_of_net"), (2, "shot"), (5, "left_of_net")])
        );
        assert_eq!(seq.events()[1], EventFrame::new(2, "left_of_net"));
    }

    #[test]
    #[should_panic(expected = "events out of order")]
    fn test_out_of_order_panics() {
        let mut seq = EventSequencer::new();
        seq.add_event(3, Event::Bounce);
        seq.add_event(2, Event::Bounce);
    }

    proptest! {
        #[test]
        fn prop_merge_is_idempotent(tags in proptest::collection::vec(0u8..3, 0..60)) {
            let events: Vec<EventFrame> = tags
                .iter()
                .enumerate()
                .map(|(i, t)| EventFrame::new(i as u64 + 1, format!("e{t}")))
                .collect();
            let once = merge_consecutive(&events);
            let twice = merge_consecutive(&once);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.windows(2).all(|w| w[0].event != w[1].event));
            prop_assert_eq!(once.first(), events.first());
        }
    }
}
