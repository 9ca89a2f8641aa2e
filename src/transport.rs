//! In-memory demo transports: no UART/USB/Ethernet/WiFi hardware is touched
//! (that is out of scope, see spec §1). Each demo transport is a byte-level
//! loopback pair so the interactive shell and integration tests have
//! something concrete to route between.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::BytesMut;
use log::{debug, info};
use midi_router_core::midi1::builder::serialize as serialize_midi1;
use midi_router_core::midi1::parser::Midi1Parser;
use midi_router_core::router::transport::{Payload, RouterPacket, Sink, SinkError, TransportId};
use midi_router_core::router::RouterCore;
use midi_router_core::ump::parser::parse_packet;

/// A destination sink that serializes whatever the router hands it back onto
/// its (simulated) wire and logs the bytes, standing in for a real driver.
pub struct DemoSink {
    transport: TransportId,
    outbound: Mutex<Vec<u8>>,
}

impl DemoSink {
    pub fn new(transport: TransportId) -> Self {
        DemoSink { transport, outbound: Mutex::new(Vec::new()) }
    }

    /// Bytes written to this sink since the last drain, oldest first.
    pub fn take_outbound(&self) -> Vec<u8> {
        std::mem::take(&mut self.outbound.lock().unwrap())
    }
}

#[async_trait]
impl Sink for DemoSink {
    async fn send(&self, packet: &RouterPacket) -> Result<(), SinkError> {
        let mut bytes = BytesMut::new();
        match &packet.payload {
            Payload::Midi1(msg) => serialize_midi1(msg, &mut bytes),
            Payload::Ump(ump) => {
                for i in 0..ump.num_words {
                    bytes.extend_from_slice(&ump.word(i).to_be_bytes());
                }
            }
        }
        debug!("{:?} <- {:02X?}", self.transport, bytes.as_ref());
        self.outbound.lock().unwrap().extend_from_slice(&bytes);
        Ok(())
    }
}

/// Feed raw MIDI 1.0 bytes, as if received on `transport`'s wire, through a
/// parser and into the router. Used by the stdin command loop's `inject`
/// command and by integration tests; a real UART driver would call this
/// from its RX interrupt or read loop instead.
pub fn inject_midi1_bytes(
    router: &RouterCore,
    transport: TransportId,
    parser: &mut Midi1Parser,
    bytes: &[u8],
    timestamp_us: u64,
) {
    for &byte in bytes {
        match parser.feed(byte) {
            Ok(Some(msg)) => {
                router.enqueue(RouterPacket::new(transport, Payload::Midi1(msg), timestamp_us));
            }
            Ok(None) => {}
            Err(err) => info!("{:?}: malformed byte dropped ({err})", transport),
        }
    }
}

/// Feed a raw UMP word stream, as if received on `transport`'s wire, into
/// the router.
pub fn inject_ump_words(
    router: &RouterCore,
    transport: TransportId,
    words: &[u32],
    timestamp_us: u64,
) {
    let mut offset = 0;
    while offset < words.len() {
        match parse_packet(&words[offset..]) {
            Ok((packet, consumed)) => {
                offset += consumed;
                router.enqueue(RouterPacket::new(transport, Payload::Ump(packet), timestamp_us));
            }
            Err(err) => {
                info!("{:?}: truncated UMP word stream dropped ({err})", transport);
                break;
            }
        }
    }
}
