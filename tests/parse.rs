mod utils;

use lightplay::{Event, Score};
use std::io::Cursor;
use utils::{enable_logging, header_chunk, smf, track_chunk};

fn channel_voice(score: &Score, index: usize) -> (u64, [u8; 3]) {
    let event = &score.events().as_slice()[index];
    match *event.event() {
        Event::ChannelVoice(message) => (event.at_ticks(), message),
        ref other => panic!("wrong variant, got {:?}", other),
    }
}

#[test]
fn minimal_one_track() {
    enable_logging();
    let bytes = smf(
        0x60,
        &[&[
            0x00, 0x90, 0x3c, 0x64, // note on at tick 0
            0x18, 0x80, 0x3c, 0x40, // note off 24 ticks later
            0x00, 0xff, 0x2f, 0x00, // end of track
        ]],
    );
    let score = Score::read(Cursor::new(bytes)).unwrap();
    assert_eq!(0x60, score.ticks_pqn());
    assert_eq!(2, score.events().len());
    assert_eq!((0, [0x90, 0x3c, 0x64]), channel_voice(&score, 0));
    assert_eq!((24, [0x80, 0x3c, 0x40]), channel_voice(&score, 1));
}

#[test]
fn set_tempo_is_extracted() {
    enable_logging();
    let bytes = smf(
        0x60,
        &[&[
            0x00, 0xff, 0x51, 0x03, 0x0f, 0x42, 0x40, // tempo 1,000,000 us/qn
            0x00, 0x90, 0x40, 0x50, //
            0x60, 0x80, 0x40, 0x00, //
            0x00, 0xff, 0x2f, 0x00,
        ]],
    );
    let score = Score::read(Cursor::new(bytes)).unwrap();
    assert_eq!(3, score.events().len());
    let first = &score.events().as_slice()[0];
    assert_eq!(0, first.at_ticks());
    assert_eq!(Event::TempoChange(1_000_000), *first.event());
    assert_eq!((0, [0x90, 0x40, 0x50]), channel_voice(&score, 1));
    assert_eq!((96, [0x80, 0x40, 0x00]), channel_voice(&score, 2));
}

#[test]
fn running_status_carries_within_a_track() {
    enable_logging();
    let bytes = smf(
        0x60,
        &[&[
            0x00, 0x90, 0x3c, 0x64, //
            0x30, 0x3c, 0x00, // running status, note on velocity 0
            0x30, 0x3e, 0x64, //
            0x30, 0x3e, 0x00, //
            0x00, 0xff, 0x2f, 0x00,
        ]],
    );
    let score = Score::read(Cursor::new(bytes)).unwrap();
    assert_eq!(4, score.events().len());
    assert_eq!((0, [0x90, 0x3c, 0x64]), channel_voice(&score, 0));
    assert_eq!((48, [0x90, 0x3c, 0x00]), channel_voice(&score, 1));
    assert_eq!((96, [0x90, 0x3e, 0x64]), channel_voice(&score, 2));
    assert_eq!((144, [0x90, 0x3e, 0x00]), channel_voice(&score, 3));
}

#[test]
fn foreign_chunk_is_skipped() {
    enable_logging();
    let mut bytes = header_chunk(1, 0x60);
    bytes.extend_from_slice(b"XFIH");
    bytes.extend_from_slice(&4u32.to_be_bytes());
    bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    bytes.extend_from_slice(&track_chunk(&[
        0x00, 0x90, 0x3c, 0x64, //
        0x00, 0xff, 0x2f, 0x00,
    ]));
    let score = Score::read(Cursor::new(bytes)).unwrap();
    assert_eq!(1, score.events().len());
    assert_eq!((0, [0x90, 0x3c, 0x64]), channel_voice(&score, 0));
}

#[test]
fn two_tracks_at_one_tick_keep_parse_order() {
    enable_logging();
    let bytes = smf(
        0x60,
        &[
            &[0x00, 0x90, 0x3c, 0x64, 0x00, 0xff, 0x2f, 0x00],
            &[0x00, 0x91, 0x3c, 0x64, 0x00, 0xff, 0x2f, 0x00],
        ],
    );
    let score = Score::read(Cursor::new(bytes)).unwrap();
    assert_eq!(2, score.events().len());
    // stable sort: the track-1 event stays ahead of the track-2 event
    assert_eq!((0, [0x90, 0x3c, 0x64]), channel_voice(&score, 0));
    assert_eq!((0, [0x91, 0x3c, 0x64]), channel_voice(&score, 1));
}

#[test]
fn uninteresting_events_advance_ticks_without_emitting() {
    enable_logging();
    let bytes = smf(
        0x60,
        &[&[
            0x10, 0xc0, 0x05, // program change, one data byte
            0x00, 0xb0, 0x07, 0x64, // controller, two data bytes
            0x00, 0xf0, 0x02, 0x01, 0xf7, // sysex, skipped by length
            0x00, 0x90, 0x3c, 0x64, //
            0x00, 0xff, 0x2f, 0x00,
        ]],
    );
    let score = Score::read(Cursor::new(bytes)).unwrap();
    assert_eq!(1, score.events().len());
    // the skipped program change still carried a delta of 0x10 ticks
    assert_eq!((16, [0x90, 0x3c, 0x64]), channel_voice(&score, 0));
}

#[test]
fn parsing_twice_yields_identical_scores() {
    enable_logging();
    let bytes = smf(
        0x60,
        &[&[
            0x00, 0xff, 0x51, 0x03, 0x07, 0xa1, 0x20, //
            0x00, 0x90, 0x3c, 0x64, //
            0x60, 0x80, 0x3c, 0x40, //
            0x00, 0xff, 0x2f, 0x00,
        ]],
    );
    let once = Score::read(Cursor::new(bytes.clone())).unwrap();
    let twice = Score::read(Cursor::new(bytes)).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn load_from_disk() {
    enable_logging();
    let bytes = smf(0x60, &[&[0x00, 0x90, 0x3c, 0x64, 0x00, 0xff, 0x2f, 0x00]]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("minimal.mid");
    std::fs::write(&path, &bytes).unwrap();
    let loaded = Score::load(&path).unwrap();
    let read = Score::read(Cursor::new(bytes)).unwrap();
    assert_eq!(read, loaded);
}

#[test]
fn division_boundaries() {
    enable_logging();
    let track: &[u8] = &[0x00, 0x90, 0x3c, 0x64, 0x00, 0xff, 0x2f, 0x00];
    assert!(Score::read(Cursor::new(smf(1, &[track]))).is_ok());
    let err = Score::read(Cursor::new(smf(0x8000, &[track]))).unwrap_err();
    assert!(format!("{}", err).contains("SMPTE"), "{}", err);
    let err = Score::read(Cursor::new(smf(0, &[track]))).unwrap_err();
    assert!(format!("{}", err).contains("zero"), "{}", err);
}

#[test]
fn bad_header_magic() {
    enable_logging();
    let mut bytes = smf(0x60, &[&[0x00, 0xff, 0x2f, 0x00]]);
    bytes[0] = b'X';
    let err = Score::read(Cursor::new(bytes)).unwrap_err();
    assert!(format!("{}", err).contains("MThd"), "{}", err);
}

#[test]
fn format_zero_is_rejected() {
    enable_logging();
    let mut bytes = smf(0x60, &[&[0x00, 0xff, 0x2f, 0x00]]);
    // format word lives at offset 8
    bytes[9] = 0;
    let err = Score::read(Cursor::new(bytes)).unwrap_err();
    assert!(format!("{}", err).contains("format"), "{}", err);
}

#[test]
fn set_tempo_with_wrong_length_is_rejected() {
    enable_logging();
    let bytes = smf(
        0x60,
        &[&[0x00, 0xff, 0x51, 0x02, 0x0f, 0x42, 0x00, 0xff, 0x2f, 0x00]],
    );
    let err = Score::read(Cursor::new(bytes)).unwrap_err();
    assert!(format!("{}", err).contains("set-tempo"), "{}", err);
}

#[test]
fn truncated_file_is_a_short_read() {
    enable_logging();
    let mut bytes = smf(0x60, &[&[0x00, 0x90, 0x3c, 0x64, 0x00, 0xff, 0x2f, 0x00]]);
    bytes.truncate(bytes.len() - 3);
    let err = Score::read(Cursor::new(bytes)).unwrap_err();
    assert!(format!("{}", err).contains("end of file"), "{}", err);
}
