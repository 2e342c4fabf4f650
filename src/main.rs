//! trace - a classic sequential UDP traceroute.
//!
//! This is the command-line interface for the trace library.

use clap::Parser;
use std::io;
use std::time::Duration;
use trace::traceroute::DEFAULT_PACKET_SIZE;
use trace::{probe_identity, DnsResolver, RawSocketTransport, TraceConfig, TraceEngine, TraceError};

/// Command-line arguments for the trace tool.
#[derive(Parser, Debug)]
#[clap(version, about = "Print the route packets take to a network host", long_about = None)]
struct Args {
    /// Display the ttl value of the returned packet
    #[clap(short = 'l')]
    display_ttl: bool,

    /// Max time-to-live value (max hops) in the outgoing packets
    #[clap(short = 'm', value_name = "max_ttl", default_value_t = 64)]
    max_ttl: u8,

    /// Print hop addresses numerically instead of using hostnames
    #[clap(short = 'n')]
    numeric: bool,

    /// Destination port for outgoing UDP packets
    #[clap(short = 'p', value_name = "port", default_value_t = 33434)]
    port: u16,

    /// Number of queries per address
    #[clap(short = 'q', value_name = "nqueries", default_value_t = 3)]
    nqueries: u16,

    /// Verbose output; every received ICMP message kind is printed
    #[clap(short = 'v')]
    verbose: bool,

    /// Time in seconds to wait for a response
    #[clap(short = 'w', value_name = "waittime", default_value_t = 3)]
    waittime: u64,

    /// Hostname or address to trace
    #[clap(value_name = "host")]
    host: String,

    /// Size of probe packets in bytes
    #[clap(value_name = "packetsize")]
    packetsize: Option<usize>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("trace: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args) -> Result<(), TraceError> {
    // Validate the configuration before touching the network; a bad
    // packetsize must be refused before any socket is opened.
    let config = TraceConfig::builder()
        .target(&args.host)
        .display_ttl(args.display_ttl)
        .max_ttl(args.max_ttl)
        .numeric(args.numeric)
        .base_port(args.port)
        .nqueries(args.nqueries)
        .verbose(args.verbose)
        .wait_time(Duration::from_secs(args.waittime))
        .packet_size(args.packetsize.unwrap_or(DEFAULT_PACKET_SIZE))
        .build()
        .map_err(TraceError::Config)?;

    let resolver = DnsResolver::new()?;
    let target = resolver.resolve_target(&config.target)?;

    let identity = probe_identity();
    let transport = RawSocketTransport::open(target.addr, identity, config.payload_len())?;

    let mut engine = TraceEngine::new(config, target, identity, transport, resolver)?;
    let stdout = io::stdout();
    engine.run(&mut stdout.lock())
}
