//! UMP word-stream parser (C3): classify by Message Type, read the right
//! number of words, grounded on
//! `examples/original_source/components/midi_core/ump_parser.c`.

use crate::error::UmpError;
use crate::ump::types::{MessageType, UmpPacket};

/// Parse one packet starting at `words[0]`. Returns the packet and the
/// number of words consumed. Fails with `UmpError::Truncated` if fewer
/// words are available than the Message Type requires.
pub fn parse_packet(words: &[u32]) -> Result<(UmpPacket, usize), UmpError> {
    if words.is_empty() {
        return Err(UmpError::Truncated { expected: 1, got: 0 });
    }
    let mt = MessageType(((words[0] >> 28) & 0xF) as u8);
    let expected = mt.num_words();
    if words.len() < expected {
        return Err(UmpError::Truncated { expected, got: words.len() });
    }
    Ok((UmpPacket::from_words(&words[..expected]), expected))
}

/// Parse an entire buffer of words into successive packets. Stops (without
/// error) at a trailing partial packet shorter than its MT requires — the
/// caller is expected to re-synchronize on the next word boundary once more
/// words arrive, per §4.3's truncation contract.
pub fn parse_all(mut words: &[u32]) -> Vec<UmpPacket> {
    let mut packets = Vec::new();
    while !words.is_empty() {
        match parse_packet(words) {
            Ok((packet, consumed)) => {
                packets.push(packet);
                words = &words[consumed..];
            }
            Err(UmpError::Truncated { .. }) => break,
            Err(_) => break,
        }
    }
    packets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midi1_channel_voice_is_one_word() {
        let words = [0x2090_3C64u32];
        let (packet, consumed) = parse_packet(&words).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(packet.message_type.0, 0x2);
        assert_eq!(packet.num_words, 1);
    }

    #[test]
    fn midi2_channel_voice_is_two_words() {
        let words = [0x4090_3C00u32, 0x8000_0000u32];
        let (packet, consumed) = parse_packet(&words).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(packet.message_type.0, 0x4);
        assert_eq!(packet.words[1], 0x8000_0000);
    }

    #[test]
    fn truncated_midi2_channel_voice_errors() {
        let words = [0x4090_3C00u32];
        let err = parse_packet(&words).unwrap_err();
        assert_eq!(err, UmpError::Truncated { expected: 2, got: 1 });
    }

    #[test]
    fn stream_format_is_four_words() {
        let words = [0xF000_0000u32, 0, 0, 0];
        let (packet, consumed) = parse_packet(&words).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(packet.num_words, 4);
    }

    #[test]
    fn group_not_meaningful_for_utility_mt() {
        let words = [0x0000_0000u32];
        let (packet, _) = parse_packet(&words).unwrap();
        assert!(!packet.message_type.has_group());
    }
}
