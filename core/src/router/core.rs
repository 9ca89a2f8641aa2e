//! `RouterCore` (C6): the value that owns the routing matrix, filter table,
//! statistics, inbound queue and sink registry (§9 "no hidden singletons").
//! Grounded on the per-packet processing order and state machine of
//! `examples/original_source/components/midi_router/midi_router.c`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use tokio::sync::{mpsc, Notify};

use crate::error::RouterError;
use crate::router::filter::Filter;
use crate::router::matrix::RoutingSnapshot;
use crate::router::stats::{RouterStats, RouterStatsSnapshot};
use crate::router::transport::{Payload, RouterPacket, Sink, TransportId, WireFormat};
use crate::translate::{translate_1_to_2, translate_2_to_1, TranslatorConfig};

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// The router's lifecycle state machine (§4.6): only `Running` accepts
/// packets; `ShuttingDown` drains the queue and refuses new enqueues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Uninitialized,
    Running,
    ShuttingDown,
}

struct Inner {
    state: Mutex<RouterState>,
    snapshot: Mutex<Arc<RoutingSnapshot>>,
    stats: RouterStats,
    sinks: Mutex<HashMap<TransportId, Arc<dyn Sink>>>,
    translator_config: TranslatorConfig,
    shutdown: Notify,
}

/// A cloneable handle onto the router. Administrative calls (`set_route`,
/// `set_filter`, ...), `enqueue`, and `get_stats` all go through this handle;
/// exactly one task (spawned from `run`) drains the inbound queue.
#[derive(Clone)]
pub struct RouterCore {
    inner: Arc<Inner>,
    sender: mpsc::Sender<RouterPacket>,
}

/// The receiving half, owned by whichever task calls `run`. Kept separate
/// from `RouterCore` so the queue has exactly one consumer by construction.
pub struct RouterReceiver {
    receiver: mpsc::Receiver<RouterPacket>,
}

impl RouterCore {
    pub fn new(translator_config: TranslatorConfig) -> (RouterCore, RouterReceiver) {
        Self::with_capacity(translator_config, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(
        translator_config: TranslatorConfig,
        capacity: usize,
    ) -> (RouterCore, RouterReceiver) {
        let (sender, receiver) = mpsc::channel(capacity);
        let inner = Arc::new(Inner {
            state: Mutex::new(RouterState::Uninitialized),
            snapshot: Mutex::new(Arc::new(RoutingSnapshot::default())),
            stats: RouterStats::default(),
            sinks: Mutex::new(HashMap::new()),
            translator_config,
            shutdown: Notify::new(),
        });
        (RouterCore { inner, sender }, RouterReceiver { receiver })
    }

    pub fn state(&self) -> RouterState {
        *self.inner.state.lock().unwrap()
    }

    /// Register a destination sink. Per §9's acyclicity rule, all sinks
    /// must be registered before `run` is called.
    pub fn register_sink(&self, transport: TransportId, sink: Arc<dyn Sink>) {
        self.inner.sinks.lock().unwrap().insert(transport, sink);
    }

    pub fn start(&self) {
        *self.inner.state.lock().unwrap() = RouterState::Running;
    }

    /// Begin shutdown. The running `drain` loop will stop accepting new
    /// enqueues and, after draining whatever is already queued, transition
    /// back to `Uninitialized`.
    pub fn begin_shutdown(&self) {
        *self.inner.state.lock().unwrap() = RouterState::ShuttingDown;
        self.inner.shutdown.notify_one();
    }

    /// Non-blocking enqueue from a transport RX path. Drops the packet and
    /// counts it on overflow or when the router is not running; never
    /// blocks the caller (§4.6).
    pub fn enqueue(&self, packet: RouterPacket) {
        if self.state() != RouterState::Running {
            self.inner.stats.record_dropped(packet.source);
            return;
        }
        if let Err(err) = self.sender.try_send(packet) {
            let dropped = match err {
                mpsc::error::TrySendError::Full(p) | mpsc::error::TrySendError::Closed(p) => p,
            };
            self.inner.stats.record_dropped(dropped.source);
        }
    }

    pub fn set_route(&self, source: TransportId, destination: TransportId, enabled: bool) {
        self.publish(|s| s.with_route(source, destination, enabled));
    }

    pub fn set_filter(&self, input: TransportId, filter: Filter) {
        self.publish(|s| s.with_filter(input, filter));
    }

    pub fn set_merge_mode(&self, merge_inputs: bool) {
        self.publish(|s| s.with_merge_inputs(merge_inputs));
    }

    fn publish(&self, f: impl FnOnce(RoutingSnapshot) -> RoutingSnapshot) {
        let mut guard = self.inner.snapshot.lock().unwrap();
        let current = (**guard).clone();
        *guard = Arc::new(f(current));
    }

    pub fn get_stats(&self) -> RouterStatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.inner.stats.reset();
    }

    /// Drain the inbound queue, processing one packet per iteration, until
    /// the router enters `ShuttingDown`. Suspends only on the queue receive
    /// and on sink invocation (§5). Once `ShuttingDown` is observed, the
    /// remaining queued packets are discarded without dispatch, since §5
    /// requires that no sink be invoked after shutdown begins.
    pub async fn run(&self, mut rx: RouterReceiver) {
        loop {
            match self.state() {
                RouterState::Uninitialized => break,
                RouterState::ShuttingDown => {
                    while rx.receiver.try_recv().is_ok() {}
                    *self.inner.state.lock().unwrap() = RouterState::Uninitialized;
                    break;
                }
                RouterState::Running => {
                    tokio::select! {
                        packet = rx.receiver.recv() => match packet {
                            Some(packet) => self.process(packet).await,
                            None => break,
                        },
                        _ = self.inner.shutdown.notified() => continue,
                    }
                }
            }
        }
    }

    async fn process(&self, packet: RouterPacket) {
        let snapshot = self.inner.snapshot.lock().unwrap().clone();

        if snapshot.filter(packet.source).blocks(&packet.payload) {
            self.inner.stats.record_filtered(packet.source);
            return;
        }

        let sinks = self.inner.sinks.lock().unwrap().clone();

        for destination in snapshot.candidates(packet.source) {
            let Some(sink) = sinks.get(&destination) else { continue };

            let dispatched = self.prepare_payloads(&packet.payload, destination, &snapshot);
            let payloads = match dispatched {
                Ok(payloads) => payloads,
                Err(err) => {
                    warn!("translation failed routing to {destination:?}: {err}");
                    self.inner.stats.record_routing_error();
                    continue;
                }
            };

            // A SysEx payload split into several MT=0x3 chunks becomes several
            // wire packets to the same destination; each is sent and counted
            // independently, in order.
            let mut any_failed = false;
            for payload in payloads {
                let out = RouterPacket::new(packet.source, payload, packet.timestamp_us);
                match sink.send(&out).await {
                    Ok(()) => {
                        self.inner.stats.record_routed(packet.source, destination);
                        debug!("routed {:?} -> {:?}", packet.source, destination);
                    }
                    Err(_) => any_failed = true,
                }
            }
            if any_failed {
                self.inner.stats.record_dropped(destination);
            }
        }
    }

    fn prepare_payloads(
        &self,
        payload: &Payload,
        destination: TransportId,
        snapshot: &RoutingSnapshot,
    ) -> Result<Vec<Payload>, RouterError> {
        let preferred = destination.preferred_format();
        if !snapshot.auto_translate || payload.format() == preferred {
            return Ok(vec![payload.clone()]);
        }
        match (payload, preferred) {
            (Payload::Midi1(msg), WireFormat::Ump) => {
                let packets = translate_1_to_2(msg, self.inner.translator_config)?;
                self.inner.stats.record_translation_1to2();
                Ok(packets.into_iter().map(Payload::Ump).collect())
            }
            (Payload::Ump(packet), WireFormat::Midi1) => {
                let msg = translate_2_to_1(packet)?;
                self.inner.stats.record_translation_2to1();
                Ok(vec![Payload::Midi1(msg)])
            }
            _ => Ok(vec![payload.clone()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi1::builder as midi1_build;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::router::transport::SinkError;

    struct RecordingSink {
        calls: Arc<AtomicUsize>,
        last_format: Mutex<Option<WireFormat>>,
    }

    #[async_trait]
    impl Sink for RecordingSink {
        async fn send(&self, packet: &RouterPacket) -> Result<(), SinkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_format.lock().unwrap() = Some(packet.payload.format());
            Ok(())
        }
    }

    #[tokio::test]
    async fn routing_scenario_invokes_only_configured_destination() {
        let (router, receiver) = RouterCore::new(TranslatorConfig::default());
        router.set_route(TransportId::Uart, TransportId::Usb, true);
        router.start();

        let usb_calls = Arc::new(AtomicUsize::new(0));
        let usb_sink =
            Arc::new(RecordingSink { calls: usb_calls.clone(), last_format: Mutex::new(None) });
        router.register_sink(TransportId::Usb, usb_sink.clone());

        let eth_calls = Arc::new(AtomicUsize::new(0));
        let eth_sink =
            Arc::new(RecordingSink { calls: eth_calls.clone(), last_format: Mutex::new(None) });
        router.register_sink(TransportId::Ethernet, eth_sink);

        let handle = tokio::spawn({
            let router = router.clone();
            async move { router.run(receiver).await }
        });

        let msg = midi1_build::note_on(0, 60, 100).unwrap();
        router.enqueue(RouterPacket::new(TransportId::Uart, Payload::Midi1(msg), 0));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        router.begin_shutdown();
        let _ = handle.await;

        assert_eq!(usb_calls.load(Ordering::SeqCst), 1);
        assert_eq!(eth_calls.load(Ordering::SeqCst), 0);
        assert_eq!(*usb_sink.last_format.lock().unwrap(), Some(WireFormat::Ump));

        let stats = router.get_stats();
        assert_eq!(stats.packets_routed[TransportId::Uart.index()][TransportId::Usb.index()], 1);
    }

    #[tokio::test]
    async fn filter_scenario_drops_unmatched_channel() {
        let (router, receiver) = RouterCore::new(TranslatorConfig::default());
        router.set_route(TransportId::Uart, TransportId::Usb, true);
        router.set_filter(
            TransportId::Uart,
            Filter { enabled: true, channel_mask: 0x0001, block_active_sensing: false, block_clock: false },
        );
        router.start();

        let usb_calls = Arc::new(AtomicUsize::new(0));
        let usb_sink =
            Arc::new(RecordingSink { calls: usb_calls.clone(), last_format: Mutex::new(None) });
        router.register_sink(TransportId::Usb, usb_sink);

        let handle = tokio::spawn({
            let router = router.clone();
            async move { router.run(receiver).await }
        });

        let msg = midi1_build::note_on(1, 60, 100).unwrap();
        router.enqueue(RouterPacket::new(TransportId::Uart, Payload::Midi1(msg), 0));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        router.begin_shutdown();
        let _ = handle.await;

        assert_eq!(usb_calls.load(Ordering::SeqCst), 0);
        assert_eq!(router.get_stats().packets_filtered[TransportId::Uart.index()], 1);
    }

    #[tokio::test]
    async fn loop_suppression_holds_under_merge_mode() {
        let (router, receiver) = RouterCore::new(TranslatorConfig::default());
        router.set_merge_mode(true);
        router.start();

        let handle = tokio::spawn({
            let router = router.clone();
            async move { router.run(receiver).await }
        });

        let msg = midi1_build::note_on(0, 60, 100).unwrap();
        router.enqueue(RouterPacket::new(TransportId::Uart, Payload::Midi1(msg), 0));

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        router.begin_shutdown();
        let _ = handle.await;

        let stats = router.get_stats();
        assert_eq!(stats.packets_routed[TransportId::Uart.index()][TransportId::Uart.index()], 0);
    }
}
