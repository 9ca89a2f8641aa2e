pub mod builder;
pub mod message;
pub mod parser;

pub use builder::*;
pub use message::Midi1Message;
pub use parser::{Midi1Parser, ParserState};
