//! Logical-field constructors and byte serialization for `Midi1Message`
//! (C4), grounded on `examples/sparesparrow-rtp-midi/src/midi/parser.rs`'s
//! `write_to_bytes`.

use bytes::{BufMut, BytesMut};

use crate::error::BuildError;
use crate::midi1::message::Midi1Message;

fn check_channel(channel: u8) -> Result<(), BuildError> {
    if channel >= 16 {
        Err(BuildError::InvalidChannel(channel))
    } else {
        Ok(())
    }
}

fn check_data_byte(v: u8) -> Result<(), BuildError> {
    if v > 127 {
        Err(BuildError::InvalidDataByte(v))
    } else {
        Ok(())
    }
}

pub fn note_on(channel: u8, note: u8, velocity: u8) -> Result<Midi1Message, BuildError> {
    check_channel(channel)?;
    check_data_byte(note)?;
    check_data_byte(velocity)?;
    Ok(Midi1Message::ChannelVoice { status: 0x90 | channel, channel, d1: note, d2: Some(velocity) })
}

pub fn note_off(channel: u8, note: u8, velocity: u8) -> Result<Midi1Message, BuildError> {
    check_channel(channel)?;
    check_data_byte(note)?;
    check_data_byte(velocity)?;
    Ok(Midi1Message::ChannelVoice { status: 0x80 | channel, channel, d1: note, d2: Some(velocity) })
}

pub fn poly_pressure(channel: u8, note: u8, value: u8) -> Result<Midi1Message, BuildError> {
    check_channel(channel)?;
    check_data_byte(note)?;
    check_data_byte(value)?;
    Ok(Midi1Message::ChannelVoice { status: 0xA0 | channel, channel, d1: note, d2: Some(value) })
}

pub fn control_change(channel: u8, controller: u8, value: u8) -> Result<Midi1Message, BuildError> {
    check_channel(channel)?;
    check_data_byte(controller)?;
    check_data_byte(value)?;
    Ok(Midi1Message::ChannelVoice {
        status: 0xB0 | channel,
        channel,
        d1: controller,
        d2: Some(value),
    })
}

pub fn program_change(channel: u8, program: u8) -> Result<Midi1Message, BuildError> {
    check_channel(channel)?;
    check_data_byte(program)?;
    Ok(Midi1Message::ChannelVoice { status: 0xC0 | channel, channel, d1: program, d2: None })
}

pub fn channel_pressure(channel: u8, value: u8) -> Result<Midi1Message, BuildError> {
    check_channel(channel)?;
    check_data_byte(value)?;
    Ok(Midi1Message::ChannelVoice { status: 0xD0 | channel, channel, d1: value, d2: None })
}

/// `value14` is a 14-bit pitch bend value (0..16383, center 8192).
pub fn pitch_bend(channel: u8, value14: u16) -> Result<Midi1Message, BuildError> {
    check_channel(channel)?;
    if value14 > 16383 {
        return Err(BuildError::InvalidValue14(value14));
    }
    let lsb = (value14 & 0x7F) as u8;
    let msb = ((value14 >> 7) & 0x7F) as u8;
    Ok(Midi1Message::ChannelVoice { status: 0xE0 | channel, channel, d1: lsb, d2: Some(msb) })
}

/// The 14-bit value encoded by a pitch-bend message's two data bytes.
pub fn pitch_bend_value14(lsb: u8, msb: u8) -> u16 {
    ((msb as u16) << 7) | (lsb as u16)
}

/// Serialize a message to its MIDI 1.0 byte-stream form. Never introduces
/// Running Status; that optimization belongs to the transport, not the
/// message contract (§4.4).
pub fn serialize(msg: &Midi1Message, buf: &mut BytesMut) {
    match msg {
        Midi1Message::ChannelVoice { status, d1, d2, .. } => {
            buf.put_u8(*status);
            buf.put_u8(*d1);
            if let Some(d2) = d2 {
                buf.put_u8(*d2);
            }
        }
        Midi1Message::SystemCommon { status, d1, d2 } => {
            buf.put_u8(*status);
            if let Some(d1) = d1 {
                buf.put_u8(*d1);
            }
            if let Some(d2) = d2 {
                buf.put_u8(*d2);
            }
        }
        Midi1Message::SystemRealTime { status } => buf.put_u8(*status),
        Midi1Message::SystemExclusive { payload } => {
            buf.put_u8(0xF0);
            buf.put_slice(payload);
            buf.put_u8(0xF7);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_rejects_out_of_range_channel() {
        assert!(matches!(note_on(16, 60, 100), Err(BuildError::InvalidChannel(16))));
    }

    #[test]
    fn note_on_velocity_zero_is_accepted() {
        let msg = note_on(0, 60, 0).unwrap();
        assert!(msg.is_note_off());
    }

    #[test]
    fn serialize_roundtrips_through_parser() {
        use crate::midi1::parser::Midi1Parser;

        let msg = note_on(3, 64, 100).unwrap();
        let mut buf = BytesMut::new();
        serialize(&msg, &mut buf);

        let mut parser = Midi1Parser::default();
        let mut emitted = None;
        for b in buf {
            if let Ok(Some(m)) = parser.feed(b) {
                emitted = Some(m);
            }
        }
        assert_eq!(emitted, Some(msg));
    }

    #[test]
    fn pitch_bend_byte_layout() {
        let msg = pitch_bend(0, 0x2000).unwrap();
        match msg {
            Midi1Message::ChannelVoice { d1, d2: Some(d2), .. } => {
                assert_eq!(d1, 0x00);
                assert_eq!(d2, 0x40);
            }
            _ => panic!("expected channel voice"),
        }
    }
}
