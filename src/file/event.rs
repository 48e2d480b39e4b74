use crate::error::{self, LibResult};
use snafu::{ensure, OptionExt};
use std::mem::size_of;

/// The starting allocation of the event buffer, in events.
const DEFAULT_EVENTS_CAPACITY: usize = 1024;

/// Everything the playback engine needs from a track survives parsing as one
/// of two cases; all other MIDI and meta events are dropped at parse time.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Event {
    /// A Note-On or Note-Off message, kept in raw 3-byte wire form so it can
    /// be written to the device unchanged.
    ChannelVoice([u8; 3]),
    /// A set-tempo meta event: microseconds per quarter note, 24 bits.
    TempoChange(u32),
}

/// An [`Event`] pinned to its absolute position in the piece, in ticks from
/// the start of its track.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TimedEvent {
    at_ticks: u64,
    event: Event,
}

impl TimedEvent {
    pub(crate) fn new(at_ticks: u64, event: Event) -> Self {
        Self { at_ticks, event }
    }

    pub fn at_ticks(&self) -> u64 {
        self.at_ticks
    }

    pub fn event(&self) -> &Event {
        &self.event
    }
}

/// The merged, multi-track event stream. Grown by doubling while tracks
/// parse, stably sorted by tick position afterwards, immutable during
/// playback.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct EventBuffer {
    events: Vec<TimedEvent>,
}

impl EventBuffer {
    pub(crate) fn new() -> Self {
        Self {
            events: Vec::with_capacity(DEFAULT_EVENTS_CAPACITY),
        }
    }

    /// Append an event, doubling the allocation when full. Growth is capped
    /// at half the maximum allocation size; hitting the cap, or failing to
    /// allocate, is a `BufferOverflow` error.
    pub(crate) fn push(&mut self, event: TimedEvent) -> LibResult<()> {
        if self.events.len() == self.events.capacity() {
            let grow = self.events.capacity().max(DEFAULT_EVENTS_CAPACITY);
            ensure!(
                self.events.capacity() <= max_events() - grow,
                error::BufferOverflowSnafu {
                    site: site!(),
                    limit: max_events(),
                }
            );
            self.events
                .try_reserve_exact(grow)
                .ok()
                .context(error::BufferOverflowSnafu {
                    site: site!(),
                    limit: max_events(),
                })?;
        }
        self.events.push(event);
        Ok(())
    }

    /// Sort by tick position. The sort must be stable: Note-On/Note-Off
    /// pairing and tempo-vs-note ordering at equal ticks are defined by the
    /// track-major parse order.
    pub(crate) fn sort_by_position(&mut self) {
        self.events.sort_by_key(|e| e.at_ticks());
    }

    /// The number of events in the buffer.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the buffer has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Iterator over the events in buffer order.
    pub fn iter(&self) -> impl Iterator<Item = &TimedEvent> {
        self.events.iter()
    }
}

fn max_events() -> usize {
    (isize::MAX as usize / 2) / size_of::<TimedEvent>()
}
