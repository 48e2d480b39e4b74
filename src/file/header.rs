use crate::byte_iter::ByteIter;
use crate::error::{self, LibResult};
use log::trace;
use snafu::{ensure, ResultExt};
use std::io::{Read, Seek};

/// If bit 15 of <division> is set, delta-times are SMPTE-style time-code
/// units, which this program does not support.
const DIVISION_TYPE_BIT: u16 = 0b1000_0000_0000_0000;

/// The six bytes of header payload every `MThd` chunk carries; longer headers
/// are allowed and the excess is skipped.
const HEADER_LENGTH: u32 = 6;

/// The `MThd` chunk: format (only 1 is accepted), track count, and the
/// metrical timebase in ticks per quarter note.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Header {
    track_count: u16,
    ticks_pqn: u16,
}

impl Header {
    /// The number of `MTrk` chunks the file declares.
    pub fn track_count(&self) -> u16 {
        self.track_count
    }

    /// Delta-time ticks per quarter note. Non-zero, high bit clear.
    pub fn ticks_pqn(&self) -> u16 {
        self.ticks_pqn
    }

    pub(crate) fn parse<R: Read + Seek>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        let magic = iter.read4().context(io!())?;
        ensure!(
            &magic == b"MThd",
            error::BadMagicSnafu {
                site: site!(),
                expected: "MThd",
                found: String::from_utf8_lossy(&magic).to_string(),
            }
        );
        let hdr_length = iter.read_u32().context(io!())?;
        ensure!(
            hdr_length >= HEADER_LENGTH,
            error::BadHeaderLengthSnafu {
                site: site!(),
                length: hdr_length,
            }
        );
        let format = iter.read_u16().context(io!())?;
        ensure!(
            format == 1,
            error::BadFormatSnafu {
                site: site!(),
                format,
            }
        );
        let track_count = iter.read_u16().context(io!())?;
        let ticks_pqn = iter.read_u16().context(io!())?;
        ensure!(
            ticks_pqn & DIVISION_TYPE_BIT == 0,
            error::UnsupportedDivisionSnafu { site: site!() }
        );
        ensure!(ticks_pqn != 0, error::ZeroDivisionSnafu { site: site!() });
        iter.skip(u64::from(hdr_length - HEADER_LENGTH))
            .context(io!())?;
        trace!(
            "header: {} tracks, {} ticks per quarter note",
            track_count,
            ticks_pqn
        );
        Ok(Self {
            track_count,
            ticks_pqn,
        })
    }
}
