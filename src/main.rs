use std::collections::HashMap;
use std::sync::Arc;

use log::{error, info, warn};
use midi_router_core::midi1::parser::Midi1Parser;
use midi_router_core::router::filter::Filter;
use midi_router_core::router::transport::TransportId;
use midi_router_core::router::RouterCore;
use midi_router_core::translate::TranslatorConfig;
use tokio::io::{AsyncBufReadExt, BufReader};

mod config;
mod transport;

use transport::DemoSink;

/// Interactive demo shell: wires a `RouterCore` to four in-memory transports
/// and exposes the admin surface (§6) as a line-oriented stdin command loop.
/// Grounded on the teacher's `run_service_loop` / `Config::load_from_file`
/// entry point shape.
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (router, receiver) = RouterCore::new(TranslatorConfig::default());

    if let Some(path) = std::env::args().nth(1) {
        match config::load_from_file(&path) {
            Ok(cfg) => apply_config(&router, cfg),
            Err(e) => {
                error!("failed to load config {path}: {e:#}");
                std::process::exit(1);
            }
        }
    }

    let mut sinks = HashMap::new();
    for transport in TransportId::ALL {
        let sink = Arc::new(DemoSink::new(transport));
        router.register_sink(transport, sink.clone());
        sinks.insert(transport, sink);
    }
    router.start();

    let router_for_ctrlc = router.clone();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received, shutting down");
        router_for_ctrlc.begin_shutdown();
    })
    .expect("failed to install Ctrl+C handler");

    let router_task = {
        let router = router.clone();
        tokio::spawn(async move { router.run(receiver).await })
    };

    info!("router running, type 'help' for commands");
    run_command_loop(&router, &sinks).await;

    router.begin_shutdown();
    if let Err(e) = router_task.await {
        warn!("router task ended abnormally: {e}");
    }
    info!("shut down cleanly");
}

fn apply_config(router: &RouterCore, cfg: config::RouterConfig) {
    router.set_merge_mode(cfg.merge_inputs);
    for route in cfg.routes {
        router.set_route(route.source.into(), route.destination.into(), route.enabled);
    }
    for entry in cfg.filters {
        router.set_filter(entry.transport.into(), entry.as_filter());
    }
}

async fn run_command_loop(router: &RouterCore, sinks: &HashMap<TransportId, Arc<DemoSink>>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut parsers: HashMap<TransportId, Midi1Parser> = HashMap::new();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break, // stdin closed (e.g. piped input exhausted)
            Err(e) => {
                warn!("error reading stdin: {e}");
                break;
            }
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => print_help(),
            ["route", src, dst, state] => handle_route(router, src, dst, state),
            ["filter", transport, "mask", hex] => handle_filter_mask(router, transport, hex),
            ["merge", state] => match parse_on_off(state) {
                Some(on) => router.set_merge_mode(on),
                None => println!("merge: expected on|off"),
            },
            ["stats"] => print_stats(router),
            ["reset-stats"] => {
                router.reset_stats();
                println!("stats reset");
            }
            ["inject", transport, rest @ ..] => handle_inject(router, &mut parsers, transport, rest),
            ["drain", transport] => handle_drain(sinks, transport),
            _ => println!("unrecognized command, type 'help'"),
        }
    }
}

fn print_help() {
    println!(
        "commands:\n\
         \x20 route <src> <dst> on|off     enable/disable one matrix entry\n\
         \x20 filter <transport> mask <hex> set a 16-bit channel mask (e.g. ffff)\n\
         \x20 merge on|off                  merge-all-inputs mode\n\
         \x20 stats                         print routing/translation counters\n\
         \x20 reset-stats                   zero all counters\n\
         \x20 inject <transport> <hex bytes...>  feed raw MIDI 1.0 bytes as if received on that wire\n\
         \x20 drain <transport>            print and clear bytes the router has sent to that transport\n\
         \x20 quit                          shut down\n\
         transports: uart usb ethernet wifi"
    );
}

fn handle_drain(sinks: &HashMap<TransportId, Arc<DemoSink>>, transport: &str) {
    let Some(transport) = parse_transport(transport) else {
        println!("drain: unknown transport {transport}");
        return;
    };
    let bytes = sinks[&transport].take_outbound();
    println!("{transport:?}: {bytes:02x?}");
}

fn handle_inject(
    router: &RouterCore,
    parsers: &mut HashMap<TransportId, Midi1Parser>,
    transport: &str,
    hex_bytes: &[&str],
) {
    let Some(transport) = parse_transport(transport) else {
        println!("inject: unknown transport {transport}");
        return;
    };
    let mut bytes = Vec::with_capacity(hex_bytes.len());
    for word in hex_bytes {
        match u8::from_str_radix(word, 16) {
            Ok(byte) => bytes.push(byte),
            Err(_) => {
                println!("inject: {word} is not a hex byte");
                return;
            }
        }
    }
    let parser = parsers.entry(transport).or_default();
    transport::inject_midi1_bytes(router, transport, parser, &bytes, 0);
}

fn parse_transport(name: &str) -> Option<TransportId> {
    match name.to_ascii_lowercase().as_str() {
        "uart" => Some(TransportId::Uart),
        "usb" => Some(TransportId::Usb),
        "ethernet" | "eth" => Some(TransportId::Ethernet),
        "wifi" => Some(TransportId::Wifi),
        _ => None,
    }
}

fn parse_on_off(word: &str) -> Option<bool> {
    match word {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn handle_route(router: &RouterCore, src: &str, dst: &str, state: &str) {
    let (Some(src), Some(dst), Some(on)) =
        (parse_transport(src), parse_transport(dst), parse_on_off(state))
    else {
        println!("route: usage: route <uart|usb|ethernet|wifi> <uart|usb|ethernet|wifi> on|off");
        return;
    };
    router.set_route(src, dst, on);
    println!("route {src:?} -> {dst:?}: {}", if on { "on" } else { "off" });
}

fn handle_filter_mask(router: &RouterCore, transport: &str, hex: &str) {
    let Some(transport) = parse_transport(transport) else {
        println!("filter: unknown transport {transport}");
        return;
    };
    let Ok(channel_mask) = u16::from_str_radix(hex.trim_start_matches("0x"), 16) else {
        println!("filter: expected a hex mask, e.g. ffff");
        return;
    };
    router.set_filter(
        transport,
        Filter { enabled: true, channel_mask, block_active_sensing: false, block_clock: false },
    );
    println!("filter {transport:?}: channel_mask=0x{channel_mask:04x}");
}

fn print_stats(router: &RouterCore) {
    let stats = router.get_stats();
    for source in TransportId::ALL {
        for destination in TransportId::ALL {
            let count = stats.packets_routed[source.index()][destination.index()];
            if count > 0 {
                println!("routed {source:?} -> {destination:?}: {count}");
            }
        }
        let dropped = stats.packets_dropped[source.index()];
        let filtered = stats.packets_filtered[source.index()];
        if dropped > 0 || filtered > 0 {
            println!("{source:?}: dropped={dropped} filtered={filtered}");
        }
    }
    println!(
        "translations: 1.0->2.0={} 2.0->1.0={} routing_errors={}",
        stats.translations_1to2, stats.translations_2to1, stats.routing_errors
    );
}
