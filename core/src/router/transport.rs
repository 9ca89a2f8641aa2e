//! Transport-facing types: the fixed 4-way `TransportId`, the packet the
//! router consumes, and the sink contract transports register against it
//! (§6). Grounded on `midi_transport_t` in
//! `examples/original_source/components/midi_router/include/midi_router.h`.

use async_trait::async_trait;

use crate::midi1::message::Midi1Message;
use crate::ump::types::UmpPacket;

/// The four fixed router ports, in the fixed index order used throughout
/// the routing matrix, filter table and stats arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportId {
    Uart,
    Usb,
    Ethernet,
    Wifi,
}

impl TransportId {
    pub const ALL: [TransportId; 4] =
        [TransportId::Uart, TransportId::Usb, TransportId::Ethernet, TransportId::Wifi];

    pub fn index(self) -> usize {
        match self {
            TransportId::Uart => 0,
            TransportId::Usb => 1,
            TransportId::Ethernet => 2,
            TransportId::Wifi => 3,
        }
    }

    /// The wire format this transport prefers when `auto_translate` is in
    /// effect. UART is always MIDI 1.0; the others prefer UMP (§4.6).
    pub fn preferred_format(self) -> WireFormat {
        match self {
            TransportId::Uart => WireFormat::Midi1,
            TransportId::Usb | TransportId::Ethernet | TransportId::Wifi => WireFormat::Ump,
        }
    }
}

/// The wire representation a `RouterPacket` carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Midi1,
    Ump,
}

/// The payload of a `RouterPacket`, tagged by which parser (C2 or C3)
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Midi1(Midi1Message),
    Ump(UmpPacket),
}

impl Payload {
    pub fn format(&self) -> WireFormat {
        match self {
            Payload::Midi1(_) => WireFormat::Midi1,
            Payload::Ump(_) => WireFormat::Ump,
        }
    }
}

/// A packet in flight through the router, created once at the transport
/// boundary and consumed exactly once by the router (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct RouterPacket {
    pub source: TransportId,
    pub payload: Payload,
    pub timestamp_us: u64,
}

impl RouterPacket {
    pub fn new(source: TransportId, payload: Payload, timestamp_us: u64) -> Self {
        RouterPacket { source, payload, timestamp_us }
    }
}

/// Errors a sink may return from `send`. A `Transient` failure is counted
/// and the router moves on; nothing in the core distinguishes a `Fatal`
/// failure's disposition from a transient one (both are counted drops for
/// that destination), the split exists so a sink implementation can log
/// them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    Transient,
    Fatal,
}

/// The contract each registered destination transport implements (§6). A
/// sink must not re-enter the router for the same packet; acyclicity is
/// enforced by registering all sinks before the router starts (§9), not by
/// a runtime guard.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn send(&self, packet: &RouterPacket) -> Result<(), SinkError>;
}
