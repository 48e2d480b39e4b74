use crate::constants::{DATA_MASK, DEFAULT_TEMPO_US_PQN, KEY_LIGHT_VELOCITY, NOTE_ON};
use crate::device::MidiPort;
use crate::error::{self, LibResult, Result};
use crate::file::Event;
use crate::play::matcher::{InputMatcher, MatchOutcome};
use crate::play::notes::NoteSet;
use crate::Score;
use log::{debug, trace, warn};
use snafu::{ensure, OptionExt, ResultExt};
use std::io::ErrorKind;
use std::thread;
use std::time::{Duration, Instant};

/// The interactive playback loop.
///
/// The player walks the score's event buffer in order. Key lights lead
/// playback by one tick batch: whenever the user owes no key presses, lights
/// go on for the next batch of events and its channel-1 notes enter the
/// pending set. A pending note stalls the clock, making the wait before the
/// next event indefinite until the matcher has seen every lit note played.
/// Everything runs on one thread; the poll inside `wait_for_event` is the
/// only suspension point.
///
/// Without a port the player degrades to an open-loop sequencer: no lighting,
/// no input, every wait taken from the file's own schedule.
pub struct Player<'a> {
    score: &'a Score,
    port: Option<&'a mut dyn MidiPort>,
    pending: NoteSet,
    matcher: InputMatcher,
    cur_ticks: u64,
    tempo_us_pqn: u32,
    lighted_idx: usize,
}

impl<'a> Player<'a> {
    /// A player driving (and driven by) a keyboard on `port`.
    pub fn new(score: &'a Score, port: &'a mut dyn MidiPort) -> Self {
        Self {
            score,
            port: Some(port),
            pending: NoteSet::new(),
            matcher: InputMatcher::new(),
            cur_ticks: 0,
            tempo_us_pqn: DEFAULT_TEMPO_US_PQN,
            lighted_idx: 0,
        }
    }

    /// A player that never touches a device: parse-and-schedule only.
    pub fn dry_run(score: &'a Score) -> Self {
        Self {
            score,
            port: None,
            pending: NoteSet::new(),
            matcher: InputMatcher::new(),
            cur_ticks: 0,
            tempo_us_pqn: DEFAULT_TEMPO_US_PQN,
            lighted_idx: 0,
        }
    }

    /// Play the score to the end. Any device or clock failure aborts the run.
    pub fn play(mut self) -> Result<()> {
        Ok(self.play_inner()?)
    }

    fn play_inner(&mut self) -> LibResult<()> {
        let events = self.score.events().as_slice();
        for (i, event) in events.iter().enumerate() {
            // keep the lights one batch ahead of playback whenever the user
            // owes no key presses; batches without channel-1 note-ons leave
            // the pending set empty and the loop advances past them
            while self.port.is_some() && self.pending.is_empty() && self.lighted_idx <= i {
                self.light_next_batch()?;
            }

            let wait = if self.port.is_some() && self.lighted_idx <= i {
                // lights for this event are not on yet: the user still owes
                // presses for earlier notes, so the clock stalls
                None
            } else {
                Some(Duration::from_micros(self.wait_budget(event.at_ticks())))
            };
            self.wait_for_event(wait)?;

            match *event.event() {
                Event::TempoChange(tempo) => {
                    debug!("tempo change to {} microseconds per quarter note", tempo);
                    self.tempo_us_pqn = tempo;
                }
                Event::ChannelVoice(message) => self.emit(message)?,
            }
            self.cur_ticks = event.at_ticks();
        }
        // a batch lit at the tail of the buffer has no later event whose wait
        // would stall on it; hold here until the user has played every lit
        // note so the run never ends with notes pending
        if !self.pending.is_empty() {
            self.wait_for_event(None)?;
        }
        Ok(())
    }

    /// Wall-clock microseconds from the last applied event to `next_ticks`.
    /// Whole microseconds per tick, division first; the truncation error is
    /// well under a microsecond per tick at any realistic resolution.
    fn wait_budget(&self, next_ticks: u64) -> u64 {
        let diff = next_ticks - self.cur_ticks;
        let us_per_tick = u64::from(self.tempo_us_pqn) / u64::from(self.score.ticks_pqn());
        diff.saturating_mul(us_per_tick)
    }

    /// Turn on key lights for every event sharing the next unlighted event's
    /// tick. Channel-1 Note-Ons are echoed with velocity 1, which lights the
    /// key without audible sound, and the note enters the pending set.
    /// Note-Offs and other channels pass through unlit.
    fn light_next_batch(&mut self) -> LibResult<()> {
        let events = self.score.events().as_slice();
        let port = match self.port.as_deref_mut() {
            Some(port) => port,
            None => return Ok(()),
        };
        let batch_ticks = match events.get(self.lighted_idx) {
            Some(event) => event.at_ticks(),
            None => return Ok(()),
        };
        while let Some(event) = events.get(self.lighted_idx) {
            if event.at_ticks() != batch_ticks {
                break;
            }
            if let Event::ChannelVoice(message) = *event.event() {
                if message[0] == NOTE_ON {
                    write_message(port, &[message[0], message[1], KEY_LIGHT_VELOCITY])?;
                    self.pending.insert(message[1] & DATA_MASK);
                    trace!(
                        "lighted note {:#04x} at tick {}",
                        message[1],
                        batch_ticks
                    );
                }
            }
            self.lighted_idx += 1;
        }
        Ok(())
    }

    /// Wait until `wait` elapses (`None` waits indefinitely), funneling any
    /// keyboard input to the matcher. Returns as soon as the pending set
    /// drains. The remaining timeout is recomputed against the deadline on
    /// every pass so user input never stretches the total wait.
    fn wait_for_event(&mut self, wait: Option<Duration>) -> LibResult<()> {
        let port = match self.port.as_deref_mut() {
            Some(port) => port,
            None => {
                // dry run: open loop on the file's own schedule
                if let Some(duration) = wait {
                    thread::sleep(duration);
                }
                return Ok(());
            }
        };
        let deadline = match wait {
            Some(duration) => Some(
                Instant::now()
                    .checked_add(duration)
                    .context(error::ClockSnafu { site: site!() })?,
            ),
            None => None,
        };
        loop {
            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(());
                    }
                    Some(deadline - now)
                }
                None => None,
            };
            let readable = match port.poll_input(remaining) {
                Ok(readable) => readable,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {
                    // best-effort timing: log and resume the wait
                    warn!("poll interrupted, resuming wait");
                    continue;
                }
                Err(e) => return Err(e).context(error::PollSnafu { site: site!() }),
            };
            if !readable {
                continue;
            }
            match self.matcher.read_input(port, &mut self.pending)? {
                MatchOutcome::NothingToWaitFor => return Ok(()),
                MatchOutcome::StillWaiting => {}
            }
        }
    }

    /// Write a channel-voice event to the device. Channel-1 Note-Ons were
    /// already sent as key lights and the audible note comes from the user's
    /// own key press, so their second write is suppressed.
    fn emit(&mut self, message: [u8; 3]) -> LibResult<()> {
        let port = match self.port.as_deref_mut() {
            Some(port) => port,
            None => return Ok(()),
        };
        if message[0] == NOTE_ON {
            trace!("suppressing lighted note-on {:#04x}", message[1]);
            return Ok(());
        }
        write_message(port, &message)
    }
}

/// Write one 3-byte message; a short write is fatal because the device is
/// local and synchronous and would not self-heal.
pub(crate) fn write_message(port: &mut dyn MidiPort, message: &[u8; 3]) -> LibResult<()> {
    let wrote = port
        .write(message)
        .context(error::OutputIoSnafu { site: site!() })?;
    ensure!(
        wrote == message.len(),
        error::OutputShortSnafu {
            site: site!(),
            wrote,
            expected: message.len(),
        }
    );
    trace!(
        "wrote {:#04x} {:#04x} {:#04x}",
        message[0],
        message[1],
        message[2]
    );
    Ok(())
}
