//! Active Sensing timeout detection (§5): the one timing-sensitive contract
//! in the core. The parser only tracks elapsed time since the last byte
//! once it has seen `0xFE`; this module is the polling side a transport
//! task runs to turn that into an event.

use std::time::Duration;

use crate::midi1::parser::{Midi1Parser, ACTIVE_SENSING_TIMEOUT};

/// Signaled when a parser has observed Active Sensing and then gone silent
/// for [`ACTIVE_SENSING_TIMEOUT`]. Routing is unaffected; the transport
/// that owns the parser decides whether to react (e.g. emit All Notes Off).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSensingTimeout {
    pub elapsed: Duration,
}

/// Poll a parser for an Active Sensing timeout. Intended to be called
/// periodically (e.g. on a short interval timer) by the transport task that
/// owns `parser`; the parser itself never suspends or schedules anything.
pub fn poll(parser: &Midi1Parser) -> Option<ActiveSensingTimeout> {
    parser
        .active_sensing_elapsed()
        .filter(|elapsed| *elapsed >= ACTIVE_SENSING_TIMEOUT)
        .map(|elapsed| ActiveSensingTimeout { elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_timeout_before_active_sensing_observed() {
        let parser = Midi1Parser::default();
        assert_eq!(poll(&parser), None);
    }

    #[test]
    fn no_timeout_immediately_after_active_sensing() {
        let mut parser = Midi1Parser::default();
        let _ = parser.feed(0xFE);
        assert_eq!(poll(&parser), None);
    }
}
