//! Multi-transport MIDI router protocol engine: MIDI 1.0 byte-stream
//! parsing, Universal MIDI Packet parsing/building, bit-exact 1.0<->2.0
//! translation, and the routing matrix that ties them together.
//!
//! This crate has no I/O of its own. Hardware bring-up, network session
//! keepalives and the event-loop glue that feeds bytes from a driver into
//! the parser are the caller's responsibility; see `router::transport` for
//! the boundary contract.

pub mod active_sensing;
pub mod error;
pub mod midi1;
pub mod router;
pub mod scale;
pub mod translate;
pub mod ump;

pub use error::{BuildError, ParseError, RouterError, TranslateError, UmpError};
pub use router::{RouterCore, RouterState};
pub use translate::TranslatorConfig;
