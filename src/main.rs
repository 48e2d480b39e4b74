use clap::{ArgAction, Parser};
use lightplay::{sandbox, Player, RawMidiPort, Score};
use log::{debug, error, LevelFilter};
use std::path::PathBuf;

/// Default raw MIDI device node; override with the MIDIDEV environment
/// variable.
const DEFAULT_DEVICE: &str = "/dev/midi";

/// Plays a standard MIDI file on a keyboard with illuminated keys, lighting
/// each channel-1 note and waiting for the user to play it.
#[derive(Debug, Parser)]
#[command(name = "lightplay", version)]
struct Opt {
    /// Increase debug verbosity; may be repeated
    #[arg(short = 'd', action = ArgAction::Count)]
    debug: u8,

    /// Parse and schedule only, never touching the MIDI device
    #[arg(short = 'n')]
    dry_run: bool,

    /// Standard MIDI file (format 1) to play
    midifile: PathBuf,
}

fn main() {
    let opt = Opt::parse();
    init_logging(opt.debug);
    if let Err(e) = run(&opt) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(opt: &Opt) -> lightplay::Result<()> {
    let score = Score::load(&opt.midifile)?;
    debug!(
        "parsed {} events, {} ticks per quarter note",
        score.events().len(),
        score.ticks_pqn()
    );
    if opt.dry_run {
        return Player::dry_run(&score).play();
    }
    let mut port = RawMidiPort::open(device_path())?;
    sandbox::limit_to_stdio()?;
    Player::new(&score, &mut port).play()
}

fn device_path() -> PathBuf {
    std::env::var_os("MIDIDEV")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE))
}
