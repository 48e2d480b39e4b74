#![allow(dead_code)]

use lightplay::MidiPort;
use log::LevelFilter;
use std::collections::VecDeque;
use std::io;
use std::sync::Once;
use std::thread;
use std::time::Duration;

static LOGGER: Once = Once::new();

pub fn enable_logging() {
    LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter(None, LevelFilter::Warn)
            .is_test(true)
            .init()
    })
}

/// An `MThd` chunk for a format-1 file.
pub fn header_chunk(track_count: u16, ticks_pqn: u16) -> Vec<u8> {
    let mut bytes = b"MThd".to_vec();
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&1u16.to_be_bytes());
    bytes.extend_from_slice(&track_count.to_be_bytes());
    bytes.extend_from_slice(&ticks_pqn.to_be_bytes());
    bytes
}

/// An `MTrk` chunk around raw event bytes.
pub fn track_chunk(events: &[u8]) -> Vec<u8> {
    let mut bytes = b"MTrk".to_vec();
    bytes.extend_from_slice(&(events.len() as u32).to_be_bytes());
    bytes.extend_from_slice(events);
    bytes
}

/// A whole format-1 file from raw per-track event bytes.
pub fn smf(ticks_pqn: u16, tracks: &[&[u8]]) -> Vec<u8> {
    let mut bytes = header_chunk(tracks.len() as u16, ticks_pqn);
    for track in tracks {
        bytes.extend_from_slice(&track_chunk(track));
    }
    bytes
}

/// A scripted stand-in for the keyboard. Input bytes are served from a
/// queue; writes are captured. A finite poll with no input sleeps out its
/// timeout so scheduled waits take real wall-clock time; an indefinite poll
/// with no input panics rather than hanging the test.
pub struct MockPort {
    pub input: VecDeque<u8>,
    pub written: Vec<u8>,
    pub closed: bool,
    pub short_writes: bool,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            written: Vec::new(),
            closed: false,
            short_writes: false,
        }
    }

    pub fn with_input(input: &[u8]) -> Self {
        let mut port = Self::new();
        port.input = input.iter().copied().collect();
        port
    }
}

impl MidiPort for MockPort {
    fn poll_input(&mut self, timeout: Option<Duration>) -> io::Result<bool> {
        if !self.input.is_empty() || self.closed {
            return Ok(true);
        }
        match timeout {
            Some(duration) => {
                thread::sleep(duration);
                Ok(false)
            }
            None => panic!("indefinite poll with no scripted input would hang"),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(bytes);
        if self.short_writes {
            Ok(bytes.len().saturating_sub(1))
        } else {
            Ok(bytes.len())
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut count = 0;
        while count < buf.len() {
            match self.input.pop_front() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}
