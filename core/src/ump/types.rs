//! The UMP data model (§3, §4.3): `UmpPacket` plus the Message Type
//! num_words table, grounded on
//! `examples/original_source/components/midi_core/include/ump_defs.h` and
//! `ump_parser.c`.

use serde::{Deserialize, Serialize};

/// The top 4 bits of a UMP's first word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageType(pub u8);

impl MessageType {
    pub const UTILITY: MessageType = MessageType(0x0);
    pub const SYSTEM: MessageType = MessageType(0x1);
    pub const MIDI1_CHANNEL_VOICE: MessageType = MessageType(0x2);
    pub const DATA_SYSEX7: MessageType = MessageType(0x3);
    pub const MIDI2_CHANNEL_VOICE: MessageType = MessageType(0x4);
    pub const DATA_128: MessageType = MessageType(0x5);
    pub const FLEX_DATA: MessageType = MessageType(0xD);
    pub const UMP_STREAM: MessageType = MessageType(0xF);

    /// Number of 32-bit words a packet of this MT occupies, per §4.3's
    /// table. Every MT value, including the reserved ranges, has a defined
    /// word count; only *semantic* decoding of a reserved MT is refused
    /// (see [`super::parser::parse_packet`]).
    pub fn num_words(self) -> usize {
        match self.0 {
            0x0 | 0x1 | 0x2 => 1,
            0x3 | 0x4 => 2,
            0x5 => 4,
            0x6 | 0x7 => 1,
            0x8 | 0x9 | 0xA => 2,
            0xB | 0xC => 3,
            0xD => 4,
            0xE => 4,
            0xF => 4,
            _ => unreachable!("MessageType is a 4-bit field"),
        }
    }

    /// Whether this MT carries a meaningful `group` field. Utility and
    /// Stream messages don't (§4.3).
    pub fn has_group(self) -> bool {
        !matches!(self.0, 0x0 | 0xF)
    }

    pub fn is_reserved(self) -> bool {
        matches!(self.0, 0x6 | 0x7 | 0x8 | 0x9 | 0xA | 0xB | 0xC | 0xE)
    }
}

/// A fixed-capacity UMP packet: up to four 32-bit words, `num_words` of
/// which are meaningful. `message_type` and `group` are derived from
/// `words[0]` at construction time and kept alongside it so callers don't
/// have to repeat the bit-extraction (the invariant `message_type ==
/// (words[0] >> 28) & 0xF` is maintained by construction, not checked at
/// every read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UmpPacket {
    pub words: [u32; 4],
    pub num_words: usize,
    pub message_type: MessageType,
    pub group: u8,
}

impl UmpPacket {
    /// Build a packet from its words directly, deriving `message_type` and
    /// `group` from `words[0]`. `words` beyond `num_words` are zeroed.
    pub fn from_words(words: &[u32]) -> Self {
        let mt = MessageType(((words[0] >> 28) & 0xF) as u8);
        let group = ((words[0] >> 24) & 0xF) as u8;
        let mut buf = [0u32; 4];
        let n = words.len().min(4);
        buf[..n].copy_from_slice(&words[..n]);
        UmpPacket { words: buf, num_words: n, message_type: mt, group }
    }

    pub fn word(&self, index: usize) -> u32 {
        self.words[index]
    }
}
