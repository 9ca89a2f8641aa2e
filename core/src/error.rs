use thiserror::Error;

/// Errors raised while feeding bytes into the MIDI 1.0 parser.
///
/// None of these are fatal: the parser always remains usable after returning
/// one of these, and the caller is expected to bump the matching counter and
/// keep feeding bytes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("SysEx buffer overflow, byte dropped")]
    Overflow,
    #[error("undefined status byte 0x{0:02X}")]
    UndefinedStatus(u8),
}

/// Errors raised while decoding a UMP word stream.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UmpError {
    #[error("truncated UMP packet: expected {expected} words, got {got}")]
    Truncated { expected: usize, got: usize },
    #[error("reserved message type 0x{0:X} has no defined semantic decoding")]
    Reserved(u8),
}

/// Errors raised by the message builders (C4). These are always returned
/// synchronously to the caller with no side effects.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("channel {0} out of range (must be < 16)")]
    InvalidChannel(u8),
    #[error("7-bit value {0} out of range (must be <= 127)")]
    InvalidDataByte(u8),
    #[error("14-bit value {0} out of range (must be <= 16383)")]
    InvalidValue14(u16),
}

/// Errors raised by the 1.0<->2.0 translator (C5).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TranslateError {
    #[error("no defined translation for status 0x{0:02X}")]
    NotSupported(u8),
    #[error("MIDI 2.0 message type 0x{0:X} has no MIDI 1.0 equivalent")]
    NotRepresentable(u8),
}

/// Errors raised by the router (C6).
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("router is not running")]
    NotRunning,
    #[error("translation failed for destination: {0}")]
    Translate(#[from] TranslateError),
}
