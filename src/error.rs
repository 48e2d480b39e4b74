use snafu::Snafu;
use std::path::PathBuf;

/// The public Error type for this crate.
#[derive(Debug, Snafu)]
pub struct Error(LibError);

/// The public Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The internal Result type for this crate.
pub(crate) type LibResult<T> = std::result::Result<T, LibError>;

/// The internal Error type for this crate. Every failure is fatal to the run:
/// the engine unwinds, the device is closed and the program exits nonzero
/// after a one-line diagnostic.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum LibError {
    #[snafu(display("{}: error while reading bytes: {}", site, source))]
    Io {
        site: String,
        source: crate::byte_iter::ByteError,
    },

    #[snafu(display("{}: expected chunk magic '{}', found '{}'", site, expected, found))]
    BadMagic {
        site: String,
        expected: String,
        found: String,
    },

    #[snafu(display("{}: midi header length {} is too short", site, length))]
    BadHeaderLength { site: String, length: u32 },

    #[snafu(display(
        "{}: only standard midi file format 1 is supported, found format {}",
        site,
        format
    ))]
    BadFormat { site: String, format: u16 },

    #[snafu(display("{}: SMPTE-style delta-time units are not supported", site))]
    UnsupportedDivision { site: String },

    #[snafu(display("{}: ticks per quarter note is zero", site))]
    ZeroDivision { site: String },

    #[snafu(display(
        "{}: set-tempo meta event has length {}, expected 3",
        site,
        length
    ))]
    BadTempoLength { site: String, length: u32 },

    #[snafu(display("{}: event buffer cannot grow past {} events", site, limit))]
    BufferOverflow { site: String, limit: usize },

    #[snafu(display("{}: tick position overflowed while accumulating delta times", site))]
    TickOverflow { site: String },

    #[snafu(display(
        "{}: short write to midi device, {} of {} bytes",
        site,
        wrote,
        expected
    ))]
    OutputShort {
        site: String,
        wrote: usize,
        expected: usize,
    },

    #[snafu(display("{}: error writing to midi device: {}", site, source))]
    OutputIo {
        site: String,
        source: std::io::Error,
    },

    #[snafu(display("{}: midi device input closed", site))]
    InputClosed { site: String },

    #[snafu(display("{}: error reading from midi device: {}", site, source))]
    InputIo {
        site: String,
        source: std::io::Error,
    },

    #[snafu(display("{}: error polling midi device: {}", site, source))]
    Poll {
        site: String,
        source: std::io::Error,
    },

    #[snafu(display("{}: monotonic clock cannot represent the wait deadline", site))]
    Clock { site: String },

    #[snafu(display("{}: could not open midi device '{}': {}", site, path.display(), source))]
    DeviceOpen {
        site: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{}: could not reduce privileges: {}", site, source))]
    Sandbox {
        site: String,
        source: std::io::Error,
    },
}

macro_rules! site {
    () => {
        format!("{}:{}", file!(), line!())
    };
}

macro_rules! io {
    () => {
        crate::error::IoSnafu { site: site!() }
    };
}

#[test]
fn site_test() {
    let line = line!() + 1;
    let site = site!();
    assert!(site.contains("error.rs"));
    assert!(site.contains(format!("{}", line).as_str()));
}
