/*!
The `file` module is for reading the standard MIDI file format: the `MThd`
header chunk, the `MTrk` track chunks, and the merged buffer of events the
playback engine consumes.
!*/

mod event;
mod header;
mod track;

pub use event::{Event, EventBuffer, TimedEvent};
pub use header::Header;

pub(crate) use track::parse_track;
