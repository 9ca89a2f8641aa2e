//! MIDI 2.0 Channel Voice (MT=0x4) packet builders, grounded on
//! `examples/original_source/components/midi_core/ump_message.c`, extended
//! from its Note-On-only coverage to the full set of Channel Voice kinds
//! named in §4.5.

use crate::error::BuildError;
use crate::ump::types::{MessageType, UmpPacket};

fn check_channel(channel: u8) -> Result<(), BuildError> {
    if channel >= 16 {
        Err(BuildError::InvalidChannel(channel))
    } else {
        Ok(())
    }
}

fn channel_voice_word0(group: u8, status_nibble: u8, channel: u8, index: u8) -> u32 {
    ((0x4u32) << 28)
        | ((group as u32 & 0xF) << 24)
        | ((status_nibble as u32 & 0xF) << 20)
        | ((channel as u32 & 0xF) << 16)
        | ((index as u32) << 8)
}

fn packet(word0: u32, word1: u32) -> UmpPacket {
    UmpPacket {
        words: [word0, word1, 0, 0],
        num_words: 2,
        message_type: MessageType::MIDI2_CHANNEL_VOICE,
        group: ((word0 >> 24) & 0xF) as u8,
    }
}

/// Note On. `velocity16` is the already-upscaled 16-bit velocity; attribute
/// type/data default to 0 as the translator does for messages with no
/// per-note attribute.
pub fn note_on(group: u8, channel: u8, note: u8, velocity16: u16) -> Result<UmpPacket, BuildError> {
    check_channel(channel)?;
    let word0 = channel_voice_word0(group, 0x9, channel, note);
    let word1 = (velocity16 as u32) << 16;
    Ok(packet(word0, word1))
}

pub fn note_off(group: u8, channel: u8, note: u8, velocity16: u16) -> Result<UmpPacket, BuildError> {
    check_channel(channel)?;
    let word0 = channel_voice_word0(group, 0x8, channel, note);
    let word1 = (velocity16 as u32) << 16;
    Ok(packet(word0, word1))
}

pub fn poly_pressure(group: u8, channel: u8, note: u8, pressure32: u32) -> Result<UmpPacket, BuildError> {
    check_channel(channel)?;
    let word0 = channel_voice_word0(group, 0xA, channel, note);
    Ok(packet(word0, pressure32))
}

pub fn control_change(group: u8, channel: u8, controller: u8, value32: u32) -> Result<UmpPacket, BuildError> {
    check_channel(channel)?;
    let word0 = channel_voice_word0(group, 0xB, channel, controller);
    Ok(packet(word0, value32))
}

pub fn program_change(group: u8, channel: u8, program: u8) -> Result<UmpPacket, BuildError> {
    check_channel(channel)?;
    // Options byte (bank_valid) lives in the low byte of word0; bank_valid
    // is always false coming from a 1.0 Program Change (§4.5).
    let word0 = channel_voice_word0(group, 0xC, channel, 0);
    let word1 = (program as u32) << 24;
    Ok(packet(word0, word1))
}

pub fn channel_pressure(group: u8, channel: u8, pressure32: u32) -> Result<UmpPacket, BuildError> {
    check_channel(channel)?;
    let word0 = channel_voice_word0(group, 0xD, channel, 0);
    Ok(packet(word0, pressure32))
}

pub fn pitch_bend(group: u8, channel: u8, value32: u32) -> Result<UmpPacket, BuildError> {
    check_channel(channel)?;
    let word0 = channel_voice_word0(group, 0xE, channel, 0);
    Ok(packet(word0, value32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_matches_reference_bit_layout() {
        // {0x90, note=60, vel=64} with default_group=0 -> word0=0x40903C00, word1=0x80000000
        let packet = note_on(0, 0, 60, 0x8000).unwrap();
        assert_eq!(packet.words[0], 0x4090_3C00);
        assert_eq!(packet.words[1], 0x8000_0000);
    }
}
