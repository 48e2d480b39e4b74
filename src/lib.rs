/*!
A "light-following" MIDI sequencer for keyboards that expose illuminated keys
via MIDI channel 1 (e.g. the Yamaha EZ series). The library parses a standard
MIDI file (format 1) into a merged, tick-ordered event stream and plays it
back interactively: when the next channel-1 notes are due their keys light
up, and the clock stalls until the user has played each lit note.
!*/

#[macro_use]
mod error;

mod byte_iter;
mod device;

pub mod constants;
pub mod file;
pub mod play;
pub mod sandbox;
pub mod vlq;

use crate::byte_iter::ByteIter;
use crate::error::LibResult;
use log::trace;
use snafu::ResultExt;
use std::io::{Read, Seek};
use std::path::Path;

pub use crate::device::MidiPort;
#[cfg(unix)]
pub use crate::device::RawMidiPort;
pub use crate::error::{Error, Result};
pub use crate::file::{Event, EventBuffer, Header, TimedEvent};
pub use crate::play::Player;

// https://www.music.mcgill.ca/~gary/306/week9/smf.html

/// A parsed score: the header's timebase plus every playable event from every
/// track, merged and stably sorted by tick position.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Score {
    header: Header,
    events: EventBuffer,
}

impl Score {
    fn read_inner<R: Read + Seek>(mut iter: ByteIter<R>) -> LibResult<Self> {
        trace!("parsing header chunk");
        let header = Header::parse(&mut iter)?;
        let mut events = EventBuffer::new();
        for i in 0..header.track_count() {
            trace!(
                "parsing track chunk {} (zero-based) of {}",
                i,
                header.track_count()
            );
            file::parse_track(&mut iter, &mut events)?;
        }
        // playback needs events ordered by position; ties keep parse order
        events.sort_by_position();
        Ok(Self { header, events })
    }

    pub fn read<R: Read + Seek>(reader: R) -> Result<Self> {
        Ok(Self::read_inner(ByteIter::new(reader))?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::read_inner(
            ByteIter::new_file(path).context(io!())?,
        )?)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn events(&self) -> &EventBuffer {
        &self.events
    }

    pub fn ticks_pqn(&self) -> u16 {
        self.header.ticks_pqn()
    }
}
