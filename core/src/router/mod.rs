pub mod core;
pub mod filter;
pub mod matrix;
pub mod stats;
pub mod transport;

pub use self::core::{RouterCore, RouterState};
pub use filter::Filter;
pub use matrix::RoutingSnapshot;
pub use stats::RouterStats;
pub use transport::{Payload, RouterPacket, Sink, SinkError, TransportId, WireFormat};
