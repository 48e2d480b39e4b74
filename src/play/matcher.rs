use crate::constants::{DATA_MASK, NOTE_OFF, NOTE_ON, STATUS_TYPE_MASK};
use crate::device::MidiPort;
use crate::error::{self, LibResult};
use crate::play::notes::NoteSet;
use crate::play::player::write_message;
use log::trace;
use snafu::ResultExt;

/// What a matcher invocation tells the wait loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MatchOutcome {
    /// The pending set is still non-empty; keep waiting.
    StillWaiting,
    /// The pending set is empty; playback may continue.
    NothingToWaitFor,
}

/// Assembles 3-byte messages from the keyboard's input stream and clears
/// pending notes as the user plays them. Each matched channel-1 Note-On is
/// mirrored back as a Note-Off so the key light goes out.
#[derive(Debug)]
pub(crate) struct InputMatcher {
    buf: [u8; 3],
    bytes_to_read: usize,
}

impl InputMatcher {
    pub(crate) fn new() -> Self {
        Self {
            buf: [0; 3],
            bytes_to_read: 3,
        }
    }

    /// Called when the input descriptor is readable. Reads at most the rest
    /// of the in-flight message; a zero-byte read means the device is gone.
    pub(crate) fn read_input(
        &mut self,
        port: &mut dyn MidiPort,
        pending: &mut NoteSet,
    ) -> LibResult<MatchOutcome> {
        if pending.is_empty() {
            return Ok(MatchOutcome::NothingToWaitFor);
        }

        let offset = 3 - self.bytes_to_read;
        let count = port
            .read(&mut self.buf[offset..])
            .context(error::InputIoSnafu { site: site!() })?;
        if count == 0 {
            return error::InputClosedSnafu { site: site!() }.fail();
        }
        self.bytes_to_read -= count;
        if self.bytes_to_read > 0 {
            return Ok(MatchOutcome::StillWaiting);
        }

        if self.buf[0] & STATUS_TYPE_MASK != NOTE_ON && self.buf[0] & STATUS_TYPE_MASK != NOTE_OFF
        {
            // not a note message; shift and resync. This assumes the
            // discarded status carried two data bytes, which does not hold
            // for every input a keyboard can send.
            trace!("discarding input status {:#04x}", self.buf[0]);
            self.buf[0] = self.buf[1];
            self.buf[1] = self.buf[2];
            self.bytes_to_read = 1;
            return Ok(MatchOutcome::StillWaiting);
        }

        // exact match means a note-on on channel 1
        if self.buf[0] == NOTE_ON {
            let mirror = [NOTE_OFF, self.buf[1], self.buf[2]];
            write_message(port, &mirror)?;
            pending.remove(self.buf[1] & DATA_MASK);
            trace!("matched key press for note {:#04x}", self.buf[1]);
        }

        self.bytes_to_read = 3;
        if pending.is_empty() {
            Ok(MatchOutcome::NothingToWaitFor)
        } else {
            Ok(MatchOutcome::StillWaiting)
        }
    }
}
