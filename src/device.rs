/*!
The MIDI device collaborator. The engine only needs three operations from a
device: poll for input readiness, write raw bytes, read raw bytes. They are
behind a trait so the playback engine can be exercised without hardware.
!*/

use std::io;
use std::time::Duration;

/// A bidirectional raw MIDI byte stream.
pub trait MidiPort {
    /// Block until input is readable or `timeout` elapses; `None` waits
    /// indefinitely. Returns `true` when a read should be attempted.
    fn poll_input(&mut self, timeout: Option<Duration>) -> io::Result<bool>;

    /// Write `bytes`, returning how many were accepted. Callers treat a
    /// short write as fatal.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Read up to `buf.len()` bytes, returning how many arrived. Callers
    /// treat zero as a closed device.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

#[cfg(unix)]
pub use raw::RawMidiPort;

#[cfg(unix)]
mod raw {
    use super::MidiPort;
    use crate::error::{self, Result};
    use log::debug;
    use snafu::ResultExt;
    use std::fs::{File, OpenOptions};
    use std::io::{self, Read, Write};
    use std::os::unix::io::AsRawFd;
    use std::path::Path;
    use std::time::Duration;

    /// A raw MIDI character device such as `/dev/midi`, read and written in
    /// place and polled through its file descriptor.
    pub struct RawMidiPort {
        file: File,
    }

    impl RawMidiPort {
        pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
            let path = path.as_ref();
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(path)
                .context(error::DeviceOpenSnafu {
                    site: site!(),
                    path,
                })?;
            debug!("opened midi device '{}'", path.display());
            Ok(Self { file })
        }
    }

    impl MidiPort for RawMidiPort {
        fn poll_input(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
            let mut fds = [libc::pollfd {
                fd: self.file.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            }];
            let timeout_ms = match timeout {
                None => -1,
                Some(duration) => {
                    // poll has no finer resolution than a millisecond, so
                    // round up rather than spin out the remainder
                    let mut millis = duration.as_millis();
                    if Duration::from_millis(millis as u64) < duration {
                        millis += 1;
                    }
                    i32::try_from(millis).unwrap_or(i32::MAX)
                }
            };
            let r = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
            if r < 0 {
                return Err(io::Error::last_os_error());
            }
            // hangup and error conditions surface as zero-byte reads
            Ok(r > 0)
        }

        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.file.write(bytes)
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.file.read(buf)
        }
    }
}
