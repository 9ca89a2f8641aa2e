//! Byte-at-a-time MIDI 1.0 parser (C2): a persistent state machine that
//! honors Running Status, interleaved Real-Time bytes and System Exclusive
//! framing.
//!
//! Grounded on the per-status arms of `examples/sparesparrow-rtp-midi/src/midi/parser.rs`
//! and the state-transition rules of `midi_core/midi_parser.c`, restructured
//! (per the design note on tagged variants) as a persistent byte-at-a-time
//! machine rather than a whole-buffer-at-once decoder.

use std::time::{Duration, Instant};

use log::warn;

use crate::error::ParseError;
use crate::midi1::message::Midi1Message;

const DEFAULT_SYSEX_CAPACITY: usize = 256;
pub const ACTIVE_SENSING_TIMEOUT: Duration = Duration::from_millis(300);

/// The three parser states named in §4.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    Collecting { status: u8, expected: usize, have: Vec<u8> },
    InSysex,
}

/// Persistent per-transport parser state. One instance is owned exclusively
/// by the transport that feeds it bytes; it is never shared.
pub struct Midi1Parser {
    state: ParserState,
    sysex_buffer: Vec<u8>,
    sysex_capacity: usize,
    overflow_count: u64,
    undefined_status_count: u64,
    active_sensing_seen: bool,
    last_byte_at: Option<Instant>,
}

impl Default for Midi1Parser {
    fn default() -> Self {
        Self::new(DEFAULT_SYSEX_CAPACITY)
    }
}

impl Midi1Parser {
    pub fn new(sysex_capacity: usize) -> Self {
        Midi1Parser {
            state: ParserState::Idle,
            sysex_buffer: Vec::new(),
            sysex_capacity,
            overflow_count: 0,
            undefined_status_count: 0,
            active_sensing_seen: false,
            last_byte_at: None,
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn overflow_count(&self) -> u64 {
        self.overflow_count
    }

    pub fn undefined_status_count(&self) -> u64 {
        self.undefined_status_count
    }

    /// Discards all in-flight state. Used when a transport is cancelled: no
    /// partial message may become observable afterward.
    pub fn reset(&mut self) {
        self.state = ParserState::Idle;
        self.sysex_buffer.clear();
        self.active_sensing_seen = false;
        self.last_byte_at = None;
    }

    /// Time elapsed since the last byte was fed, if at least one Active
    /// Sensing byte (0xFE) has been observed since the last reset. The
    /// transport polls this to raise `ActiveSensingTimeout` per §5; the
    /// parser itself never blocks or schedules anything.
    pub fn active_sensing_elapsed(&self) -> Option<Duration> {
        if !self.active_sensing_seen {
            return None;
        }
        self.last_byte_at.map(|at| at.elapsed())
    }

    /// Feed one byte. Returns at most one emitted message (real-time bytes
    /// and completed channel/system-common messages each yield exactly one;
    /// most bytes yield none). Parse errors are non-fatal: the byte is
    /// dropped and counted, and the parser remains usable for the next byte.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Midi1Message>, ParseError> {
        self.last_byte_at = Some(Instant::now());

        if byte == 0xFE {
            self.active_sensing_seen = true;
        }

        if is_realtime(byte) {
            return self.handle_realtime(byte);
        }

        if byte & 0x80 != 0 {
            self.handle_status(byte)
        } else {
            Ok(self.handle_data(byte))
        }
    }

    fn handle_realtime(&mut self, status: u8) -> Result<Option<Midi1Message>, ParseError> {
        if matches!(status, 0xF9 | 0xFD) {
            return Err(self.undefined_status(status));
        }
        Ok(Some(Midi1Message::SystemRealTime { status }))
    }

    fn handle_status(&mut self, status: u8) -> Result<Option<Midi1Message>, ParseError> {
        match status {
            0x80..=0xEF => {
                // A new status byte always terminates an in-progress SysEx
                // without emitting it, per §4.2.
                if matches!(self.state, ParserState::InSysex) {
                    self.sysex_buffer.clear();
                }
                let expected = channel_voice_data_len(status);
                self.state = ParserState::Collecting { status, expected, have: Vec::new() };
                Ok(None)
            }
            0xF0 => {
                self.sysex_buffer.clear();
                self.state = ParserState::InSysex;
                Ok(None)
            }
            0xF7 => {
                if matches!(self.state, ParserState::InSysex) {
                    let payload = std::mem::take(&mut self.sysex_buffer);
                    self.state = ParserState::Idle;
                    Ok(Some(Midi1Message::SystemExclusive { payload }))
                } else {
                    Ok(None)
                }
            }
            0xF1 | 0xF2 | 0xF3 | 0xF6 => {
                let expected = system_common_data_len(status);
                if expected == 0 {
                    self.state = ParserState::Idle;
                    Ok(Some(Midi1Message::SystemCommon { status, d1: None, d2: None }))
                } else {
                    self.state = ParserState::Collecting { status, expected, have: Vec::new() };
                    Ok(None)
                }
            }
            _ => Err(self.undefined_status(status)),
        }
    }

    fn undefined_status(&mut self, status: u8) -> ParseError {
        self.undefined_status_count += 1;
        warn!("undefined status byte 0x{status:02X}");
        ParseError::UndefinedStatus(status)
    }

    fn handle_data(&mut self, byte: u8) -> Option<Midi1Message> {
        match &mut self.state {
            ParserState::InSysex => {
                if self.sysex_buffer.len() >= self.sysex_capacity {
                    self.overflow_count += 1;
                } else {
                    self.sysex_buffer.push(byte);
                }
                None
            }
            ParserState::Collecting { status, expected, have } => {
                have.push(byte);
                if have.len() == *expected {
                    let status = *status;
                    let have = std::mem::take(have);
                    self.state = ParserState::Collecting {
                        status,
                        expected: *expected,
                        have: Vec::new(),
                    };
                    Some(emit_collected(status, &have))
                } else {
                    None
                }
            }
            ParserState::Idle => None,
        }
    }
}

fn emit_collected(status: u8, have: &[u8]) -> Midi1Message {
    if (0x80..=0xEF).contains(&status) {
        Midi1Message::ChannelVoice {
            status,
            channel: status & 0x0F,
            d1: have[0],
            d2: have.get(1).copied(),
        }
    } else {
        Midi1Message::SystemCommon {
            status,
            d1: have.first().copied(),
            d2: have.get(1).copied(),
        }
    }
}

fn is_realtime(byte: u8) -> bool {
    (0xF8..=0xFF).contains(&byte)
}

fn channel_voice_data_len(status: u8) -> usize {
    match status & 0xF0 {
        0xC0 | 0xD0 => 1,
        _ => 2,
    }
}

fn system_common_data_len(status: u8) -> usize {
    match status {
        0xF1 | 0xF3 => 1,
        0xF2 => 2,
        0xF6 => 0,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut Midi1Parser, bytes: &[u8]) -> Vec<Midi1Message> {
        bytes.iter().filter_map(|b| parser.feed(*b).ok().flatten()).collect()
    }

    #[test]
    fn running_status_scenario() {
        let mut parser = Midi1Parser::default();
        let emitted = feed_all(&mut parser, &[0x90, 0x3C, 0x64, 0x40, 0x70]);
        assert_eq!(
            emitted,
            vec![
                Midi1Message::ChannelVoice { status: 0x90, channel: 0, d1: 0x3C, d2: Some(0x64) },
                Midi1Message::ChannelVoice { status: 0x90, channel: 0, d1: 0x40, d2: Some(0x70) },
            ]
        );
    }

    #[test]
    fn realtime_interleave_scenario() {
        let mut parser = Midi1Parser::default();
        let emitted = feed_all(&mut parser, &[0x90, 0x3C, 0xF8, 0x64]);
        assert_eq!(
            emitted,
            vec![
                Midi1Message::SystemRealTime { status: 0xF8 },
                Midi1Message::ChannelVoice { status: 0x90, channel: 0, d1: 0x3C, d2: Some(0x64) },
            ]
        );
    }

    #[test]
    fn sysex_framing() {
        let mut parser = Midi1Parser::default();
        let emitted = feed_all(&mut parser, &[0xF0, 0x01, 0x02, 0x03, 0xF7]);
        assert_eq!(emitted, vec![Midi1Message::SystemExclusive { payload: vec![0x01, 0x02, 0x03] }]);
    }

    #[test]
    fn sysex_overflow_drops_bytes_without_terminating() {
        let mut parser = Midi1Parser::new(2);
        let emitted = feed_all(&mut parser, &[0xF0, 0x01, 0x02, 0x03, 0x04, 0xF7]);
        assert_eq!(emitted, vec![Midi1Message::SystemExclusive { payload: vec![0x01, 0x02] }]);
        assert_eq!(parser.overflow_count(), 2);
    }

    #[test]
    fn renewed_sysex_start_terminates_silently() {
        let mut parser = Midi1Parser::default();
        let emitted = feed_all(&mut parser, &[0xF0, 0x01, 0x02, 0xF0, 0x03, 0xF7]);
        assert_eq!(emitted, vec![Midi1Message::SystemExclusive { payload: vec![0x03] }]);
    }

    #[test]
    fn undefined_status_is_counted_not_fatal() {
        let mut parser = Midi1Parser::default();
        let emitted = feed_all(&mut parser, &[0xF4, 0x90, 0x3C, 0x64]);
        assert_eq!(parser.undefined_status_count(), 1);
        assert_eq!(
            emitted,
            vec![Midi1Message::ChannelVoice { status: 0x90, channel: 0, d1: 0x3C, d2: Some(0x64) }]
        );
    }

    #[test]
    fn active_sensing_elapsed_tracks_fe() {
        let mut parser = Midi1Parser::default();
        assert_eq!(parser.active_sensing_elapsed(), None);
        let _ = parser.feed(0xFE);
        assert!(parser.active_sensing_elapsed().is_some());
    }
}
