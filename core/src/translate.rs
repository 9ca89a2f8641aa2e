//! Bidirectional MIDI 1.0 <-> MIDI 2.0 translator (C5), grounded on
//! `examples/original_source/components/midi_core/midi_translator.c`'s
//! `midi_translate_1to2`/`midi_translate_2to1`, extended from the
//! reference's Note-On-only stub to the full per-status table §4.5 names.

use crate::error::TranslateError;
use crate::midi1::message::Midi1Message;
use crate::scale::{downscale_16_7, downscale_32_14, downscale_32_7, upscale_14_32, upscale_7_16};
use crate::ump::builder as ump_build;
use crate::ump::types::{MessageType, UmpPacket};

/// Translator-wide configuration. `default_group` is used for every message
/// translated 1.0 -> 2.0, since MIDI 1.0 byte streams carry no group field
/// of their own.
#[derive(Debug, Clone, Copy)]
pub struct TranslatorConfig {
    pub default_group: u8,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig { default_group: 0 }
    }
}

const SYSEX7_CHUNK: usize = 6;

/// Translate a MIDI 1.0 message to its MIDI 2.0 UMP equivalent(s). Most
/// messages translate to exactly one packet; a SysEx payload longer than
/// one chunk translates to a Start/Continue/.../End sequence of MT=0x3
/// packets.
pub fn translate_1_to_2(
    msg: &Midi1Message,
    config: TranslatorConfig,
) -> Result<Vec<UmpPacket>, TranslateError> {
    let group = config.default_group;
    match msg {
        Midi1Message::ChannelVoice { status, channel, d1, d2 } => {
            translate_channel_voice_1_to_2(*status, *channel, *d1, *d2, group)
        }
        Midi1Message::SystemCommon { status, d1, d2 } => {
            Ok(vec![system_word_packet(group, *status, *d1, *d2)])
        }
        Midi1Message::SystemRealTime { status } => {
            Ok(vec![system_word_packet(group, *status, None, None)])
        }
        Midi1Message::SystemExclusive { payload } => Ok(sysex_to_ump(group, payload)),
    }
}

fn translate_channel_voice_1_to_2(
    status: u8,
    channel: u8,
    d1: u8,
    d2: Option<u8>,
    group: u8,
) -> Result<Vec<UmpPacket>, TranslateError> {
    let packet = match status & 0xF0 {
        0x80 => {
            let velocity = d2.unwrap_or(0);
            ump_build::note_off(group, channel, d1, upscale_7_16(velocity))
        }
        0x90 => {
            let velocity = d2.unwrap_or(0);
            // Note On with velocity 0 is a Note Off (§4.5).
            if velocity == 0 {
                ump_build::note_off(group, channel, d1, 0)
            } else {
                ump_build::note_on(group, channel, d1, upscale_7_16(velocity))
            }
        }
        0xA0 => {
            let value = d2.unwrap_or(0);
            let upscaled = upscale_7_16(value) as u32;
            ump_build::poly_pressure(group, channel, d1, (upscaled << 16) | upscaled)
        }
        0xB0 => {
            let value = d2.unwrap_or(0);
            let upscaled = upscale_7_16(value) as u32;
            ump_build::control_change(group, channel, d1, (upscaled << 16) | upscaled)
        }
        0xC0 => ump_build::program_change(group, channel, d1),
        0xD0 => {
            let upscaled = upscale_7_16(d1) as u32;
            ump_build::channel_pressure(group, channel, (upscaled << 16) | upscaled)
        }
        0xE0 => {
            let value14 = ((d2.unwrap_or(0) as u16) << 7) | (d1 as u16);
            ump_build::pitch_bend(group, channel, upscale_14_32(value14))
        }
        _ => return Err(TranslateError::NotSupported(status)),
    };
    packet
        .map(|p| vec![p])
        .map_err(|_| TranslateError::NotSupported(status))
}

fn system_word_packet(group: u8, status: u8, d1: Option<u8>, d2: Option<u8>) -> UmpPacket {
    let word0 = (0x1u32 << 28)
        | ((group as u32 & 0xF) << 24)
        | ((status as u32) << 16)
        | ((d1.unwrap_or(0) as u32) << 8)
        | (d2.unwrap_or(0) as u32);
    UmpPacket { words: [word0, 0, 0, 0], num_words: 1, message_type: MessageType::SYSTEM, group }
}

fn sysex_to_ump(group: u8, payload: &[u8]) -> Vec<UmpPacket> {
    if payload.is_empty() {
        return vec![sysex7_packet(group, 0x0, &[])];
    }
    let chunks: Vec<&[u8]> = payload.chunks(SYSEX7_CHUNK).collect();
    let last = chunks.len() - 1;
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let status = match (i == 0, i == last) {
                (true, true) => 0x0,  // Complete SysEx in one packet
                (true, false) => 0x1, // Start
                (false, true) => 0x3, // End
                (false, false) => 0x2, // Continue
            };
            sysex7_packet(group, status, chunk)
        })
        .collect()
}

fn sysex7_packet(group: u8, status_nibble: u8, chunk: &[u8]) -> UmpPacket {
    let mut word0 = (0x3u32 << 28) | ((group as u32 & 0xF) << 24);
    word0 |= ((status_nibble as u32) << 20) | ((chunk.len() as u32) << 16);
    for (i, byte) in chunk.iter().take(2).enumerate() {
        word0 |= (*byte as u32) << (8 - i * 8);
    }
    let mut word1 = 0u32;
    for (i, byte) in chunk.iter().skip(2).take(4).enumerate() {
        word1 |= (*byte as u32) << (24 - i * 8);
    }
    UmpPacket { words: [word0, word1, 0, 0], num_words: 2, message_type: MessageType::DATA_SYSEX7, group }
}

/// Translate a MIDI 2.0 UMP packet back to its MIDI 1.0 equivalent. Only
/// Channel Voice (MT=0x2, round-trips the embedded bytes directly),
/// Channel Voice (MT=0x4, via the §4.1 downscales) and System (MT=0x1) are
/// representable; everything else fails with `NotRepresentable`.
pub fn translate_2_to_1(packet: &UmpPacket) -> Result<Midi1Message, TranslateError> {
    match packet.message_type.0 {
        0x2 => midi1_channel_voice_from_word(packet.words[0]),
        0x4 => translate_midi2_channel_voice_to_1(packet),
        0x1 => {
            let word0 = packet.words[0];
            let status = ((word0 >> 16) & 0xFF) as u8;
            let d1 = ((word0 >> 8) & 0xFF) as u8;
            let d2 = (word0 & 0xFF) as u8;
            if (0xF8..=0xFF).contains(&status) {
                Ok(Midi1Message::SystemRealTime { status })
            } else {
                Ok(Midi1Message::SystemCommon {
                    status,
                    d1: if d1 != 0 { Some(d1) } else { None },
                    d2: if d2 != 0 { Some(d2) } else { None },
                })
            }
        }
        mt => Err(TranslateError::NotRepresentable(mt)),
    }
}

fn midi1_channel_voice_from_word(word0: u32) -> Result<Midi1Message, TranslateError> {
    let status = ((word0 >> 16) & 0xFF) as u8;
    let d1 = ((word0 >> 8) & 0xFF) as u8;
    let d2 = (word0 & 0xFF) as u8;
    let has_d2 = !matches!(status & 0xF0, 0xC0 | 0xD0);
    Ok(Midi1Message::ChannelVoice {
        status,
        channel: status & 0x0F,
        d1,
        d2: if has_d2 { Some(d2) } else { None },
    })
}

fn translate_midi2_channel_voice_to_1(packet: &UmpPacket) -> Result<Midi1Message, TranslateError> {
    let word0 = packet.words[0];
    let word1 = packet.words[1];
    let status_nibble = ((word0 >> 20) & 0xF) as u8;
    let channel = ((word0 >> 16) & 0xF) as u8;
    let index = ((word0 >> 8) & 0xFF) as u8;

    let status = 0x80 | (status_nibble << 4) | channel;
    match status_nibble {
        0x8 | 0x9 => {
            let velocity16 = ((word1 >> 16) & 0xFFFF) as u16;
            Ok(Midi1Message::ChannelVoice {
                status,
                channel,
                d1: index,
                d2: Some(downscale_16_7(velocity16)),
            })
        }
        0xA => Ok(Midi1Message::ChannelVoice {
            status,
            channel,
            d1: index,
            d2: Some(downscale_32_7(word1)),
        }),
        0xB => Ok(Midi1Message::ChannelVoice {
            status,
            channel,
            d1: index,
            d2: Some(downscale_32_7(word1)),
        }),
        0xC => {
            let program = ((word1 >> 24) & 0x7F) as u8;
            Ok(Midi1Message::ChannelVoice { status, channel, d1: program, d2: None })
        }
        0xD => Ok(Midi1Message::ChannelVoice {
            status,
            channel,
            d1: downscale_32_7(word1),
            d2: None,
        }),
        0xE => {
            let value14 = downscale_32_14(word1);
            Ok(Midi1Message::ChannelVoice {
                status,
                channel,
                d1: (value14 & 0x7F) as u8,
                d2: Some(((value14 >> 7) & 0x7F) as u8),
            })
        }
        // Per-Note Controllers, Per-Note Management, Per-Note Pitch Bend,
        // Registered/Assignable per-note controllers, Relative Controllers.
        _ => Err(TranslateError::NotRepresentable(0x4)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi1::builder as midi1_build;

    #[test]
    fn note_on_translates_to_matching_ump_word0() {
        let msg = midi1_build::note_on(0, 60, 64).unwrap();
        let packets = translate_1_to_2(&msg, TranslatorConfig::default()).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].words[0], 0x4090_3C00);
        assert_eq!(packets[0].words[1], 0x8000_0000);
    }

    #[test]
    fn note_on_velocity_zero_becomes_note_off() {
        let msg = midi1_build::note_on(0, 60, 0).unwrap();
        let packets = translate_1_to_2(&msg, TranslatorConfig::default()).unwrap();
        assert_eq!((packets[0].words[0] >> 20) & 0xF, 0x8);
    }

    #[test]
    fn roundtrip_1_to_2_to_1_on_note_on() {
        let msg = midi1_build::note_on(3, 60, 100).unwrap();
        let packets = translate_1_to_2(&msg, TranslatorConfig::default()).unwrap();
        let back = translate_2_to_1(&packets[0]).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn per_note_pitch_bend_is_not_representable() {
        // MT=0x4, status nibble 0x6 (Per-Note Pitch Bend) has no 1.0 equivalent.
        let packet = UmpPacket {
            words: [0x4060_0000, 0, 0, 0],
            num_words: 2,
            message_type: MessageType::MIDI2_CHANNEL_VOICE,
            group: 0,
        };
        assert!(matches!(translate_2_to_1(&packet), Err(TranslateError::NotRepresentable(_))));
    }

    #[test]
    fn sysex_splits_into_six_byte_chunks() {
        let payload: Vec<u8> = (0..13).collect();
        let msg = Midi1Message::SystemExclusive { payload: payload.clone() };
        let packets = translate_1_to_2(&msg, TranslatorConfig::default()).unwrap();
        // 13 bytes -> chunks of 6,6,1 -> 3 packets, Start/Continue/End.
        assert_eq!(packets.len(), 3);
        assert_eq!((packets[0].words[0] >> 20) & 0xF, 0x1);
        assert_eq!((packets[1].words[0] >> 20) & 0xF, 0x2);
        assert_eq!((packets[2].words[0] >> 20) & 0xF, 0x3);
    }
}
