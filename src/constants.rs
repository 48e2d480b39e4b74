/// `0x80`: A `Note Off` message on channel 1.
pub const NOTE_OFF: u8 = 0x80;

/// `0x90`: A `Note On` message on channel 1. Target keyboards light the
/// matching key when this arrives with a velocity of at least 1.
pub const NOTE_ON: u8 = 0x90;

/// `0xC0`: A `Program change` message; carries one data byte.
pub const PROGRAM_CHANGE: u8 = 0xc0;

/// `0xD0`: A `Channel pressure` message; carries one data byte.
pub const CHANNEL_PRESSURE: u8 = 0xd0;

/// `0xF0`: File Spec: `F0 <length> <bytes to be transmitted after F0>`
pub const SYSEX_F0: u8 = 0xf0;

/// `0xF7`: File Spec: `F7 <length> <all bytes to be transmitted>`
pub const SYSEX_F7: u8 = 0xf7;

/// `0xFF`: File Spec: All meta-events begin with FF, then have an event type
/// byte (which is always less than 128).
pub const META_EVENT: u8 = 0xff;

/// `0x51`: The set-tempo meta event type, `FF 51 03 tttttt`.
pub const META_SET_TEMPO: u8 = 0x51;

/// The message type lives in the high nibble of a status byte.
pub const STATUS_TYPE_MASK: u8 = 0xf0;

/// Set on status bytes, clear on data bytes.
pub const STATUS_BIT: u8 = 0x80;

/// Masks a data byte down to its seven valid bits.
pub const DATA_MASK: u8 = 0x7f;

/// Default tempo is 120 beats per minute, which is 500,000 microseconds per
/// quarter note.
pub const DEFAULT_TEMPO_US_PQN: u32 = 500_000;

/// At least with a Yamaha EZ-220, velocity 0 does not trigger the keyboard
/// lights, but 1 is enough and is (hopefully) not going to be heard.
pub const KEY_LIGHT_VELOCITY: u8 = 1;

/// MIDI note numbers are seven bits.
pub const NOTE_COUNT: usize = 128;
