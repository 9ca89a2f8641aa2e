//! `Midi1Message`: the MIDI 1.0 byte-stream message model (part of the data
//! model in §3), plus the pure classification helpers used by the parser,
//! builder and translator.

use serde::{Deserialize, Serialize};

/// A single complete MIDI 1.0 message, as emitted by the parser or produced
/// by the builder. Unlike the reference implementation this repo is
/// grounded on, `SystemExclusive` owns its payload directly rather than
/// sharing storage with the fixed-size channel-message fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Midi1Message {
    ChannelVoice {
        status: u8,
        channel: u8,
        d1: u8,
        d2: Option<u8>,
    },
    SystemCommon {
        status: u8,
        d1: Option<u8>,
        d2: Option<u8>,
    },
    SystemRealTime {
        status: u8,
    },
    SystemExclusive {
        payload: Vec<u8>,
    },
}

impl Midi1Message {
    /// `channel & 0xF0` status nibble for channel-voice messages, `None`
    /// otherwise.
    pub fn status_nibble(&self) -> Option<u8> {
        match self {
            Midi1Message::ChannelVoice { status, .. } => Some(status & 0xF0),
            _ => None,
        }
    }

    /// True for a Note On with velocity strictly greater than zero.
    pub fn is_note_on(&self) -> bool {
        matches!(
            self,
            Midi1Message::ChannelVoice { status, d2: Some(v), .. }
                if status & 0xF0 == 0x90 && *v > 0
        )
    }

    /// True for a Note Off, or a Note On with velocity zero (the MIDI 1.0
    /// "ghost note off" convention, preserved across translation per §4.4).
    pub fn is_note_off(&self) -> bool {
        match self {
            Midi1Message::ChannelVoice { status, .. } if status & 0xF0 == 0x80 => true,
            Midi1Message::ChannelVoice { status, d2: Some(0), .. } if status & 0xF0 == 0x90 => {
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_zero_velocity_is_note_off() {
        let msg = Midi1Message::ChannelVoice {
            status: 0x90,
            channel: 0,
            d1: 60,
            d2: Some(0),
        };
        assert!(!msg.is_note_on());
        assert!(msg.is_note_off());
    }

    #[test]
    fn ordinary_note_on() {
        let msg = Midi1Message::ChannelVoice {
            status: 0x90,
            channel: 0,
            d1: 60,
            d2: Some(100),
        };
        assert!(msg.is_note_on());
        assert!(!msg.is_note_off());
    }
}
