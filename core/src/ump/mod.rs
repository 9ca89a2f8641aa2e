pub mod builder;
pub mod parser;
pub mod types;

pub use builder::*;
pub use parser::parse_packet;
pub use types::{MessageType, UmpPacket};
