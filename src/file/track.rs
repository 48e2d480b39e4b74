use crate::byte_iter::ByteIter;
use crate::constants::{
    CHANNEL_PRESSURE, META_EVENT, META_SET_TEMPO, NOTE_OFF, NOTE_ON, PROGRAM_CHANGE, STATUS_BIT,
    STATUS_TYPE_MASK, SYSEX_F0, SYSEX_F7,
};
use crate::error::{self, LibResult};
use crate::file::{Event, EventBuffer, TimedEvent};
use log::{debug, trace};
use snafu::{ensure, OptionExt, ResultExt};
use std::io::{Read, Seek};

/// 2.3 - Track Chunks
/// The track chunks (type MTrk) are where actual song data is stored. Each
/// track chunk is simply a stream of MIDI events (and non-MIDI events),
/// preceded by delta-time values:
///
/// `<Track Chunk> = <chunk type><length><MTrk event>+`
///
/// Decoded Note-On/Note-Off and set-tempo events land in `buffer` at their
/// absolute tick positions; everything else only advances the byte cursor.
pub(crate) fn parse_track<R: Read + Seek>(
    iter: &mut ByteIter<R>,
    buffer: &mut EventBuffer,
) -> LibResult<()> {
    let track_bytes = find_track_chunk(iter)?;
    let track_end = iter.position() + u64::from(track_bytes);
    // running status is reset at every track start and does not cross track
    // boundaries
    let mut state = TrackState::default();
    while iter.position() < track_end {
        next_event(iter, buffer, &mut state)?;
    }
    Ok(())
}

/// Per-track parser state: the accumulated tick position and the last status
/// byte seen, for running status.
#[derive(Debug, Default)]
struct TrackState {
    at_ticks: u64,
    running_status: u8,
}

/// Advance to the next `MTrk` chunk, skipping foreign chunks (alien chunk
/// types must be ignored per the file spec) by their declared length.
fn find_track_chunk<R: Read + Seek>(iter: &mut ByteIter<R>) -> LibResult<u32> {
    loop {
        let magic = iter.read4().context(io!())?;
        let chunk_length = iter.read_u32().context(io!())?;
        if &magic == b"MTrk" {
            return Ok(chunk_length);
        }
        debug!(
            "skipping foreign chunk '{}' of {} bytes",
            String::from_utf8_lossy(&magic),
            chunk_length
        );
        iter.skip(u64::from(chunk_length)).context(io!())?;
    }
}

/// One step of the event-extraction state machine: delta time, status byte
/// with running-status resolution, then dispatch on the status.
fn next_event<R: Read + Seek>(
    iter: &mut ByteIter<R>,
    buffer: &mut EventBuffer,
    state: &mut TrackState,
) -> LibResult<()> {
    let delta = iter.read_vlq_u32().context(io!())?;
    let mut status = iter.read_u8().context(io!())?;
    if status & STATUS_BIT == 0 {
        // a data byte where a status byte belongs: running status. Restore
        // the previous status and step back so the data byte is read again.
        status = state.running_status;
        iter.rewind1().context(io!())?;
        trace!("running status {:#04x}", status);
    } else {
        // meta and sysex statuses land here too, like any other status
        state.running_status = status;
    }

    state.at_ticks = state
        .at_ticks
        .checked_add(u64::from(delta))
        .context(error::TickOverflowSnafu { site: site!() })?;

    match status {
        META_EVENT => meta_event(iter, buffer, state),
        SYSEX_F0 | SYSEX_F7 => {
            let length = iter.read_vlq_u32().context(io!())?;
            iter.skip(u64::from(length)).context(io!())
        }
        s if s & STATUS_TYPE_MASK == PROGRAM_CHANGE
            || s & STATUS_TYPE_MASK == CHANNEL_PRESSURE =>
        {
            iter.skip(1).context(io!())
        }
        s if s & STATUS_TYPE_MASK == NOTE_OFF || s & STATUS_TYPE_MASK == NOTE_ON => {
            let data = iter.read2().context(io!())?;
            trace!(
                "note event {:#04x} {:#04x} {:#04x} at tick {}",
                status,
                data[0],
                data[1],
                state.at_ticks
            );
            buffer.push(TimedEvent::new(
                state.at_ticks,
                Event::ChannelVoice([status, data[0], data[1]]),
            ))
        }
        _ => iter.skip(2).context(io!()),
    }
}

/// Meta events other than set-tempo are skipped by their declared length.
fn meta_event<R: Read + Seek>(
    iter: &mut ByteIter<R>,
    buffer: &mut EventBuffer,
    state: &mut TrackState,
) -> LibResult<()> {
    let meta_type = iter.read_u8().context(io!())?;
    let length = iter.read_vlq_u32().context(io!())?;
    if meta_type != META_SET_TEMPO {
        return iter.skip(u64::from(length)).context(io!());
    }
    ensure!(
        length == 3,
        error::BadTempoLengthSnafu {
            site: site!(),
            length,
        }
    );
    let mut raw = [0u8; 3];
    iter.read_exact(&mut raw).context(io!())?;
    let tempo = u32::from(raw[0]) << 16 | u32::from(raw[1]) << 8 | u32::from(raw[2]);
    debug!(
        "set tempo {} microseconds per quarter note at tick {}",
        tempo, state.at_ticks
    );
    buffer.push(TimedEvent::new(state.at_ticks, Event::TempoChange(tempo)))
}
