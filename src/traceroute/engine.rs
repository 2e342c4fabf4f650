//! Core trace engine
//!
//! Drives the TTL loop: one probe outstanding at a time, a bounded
//! wait for the matching ICMP answer, per-probe round-trip timing, and
//! termination once any non-time-exceeded answer arrives. Strictly
//! single-threaded; the only suspension point is the bounded receive.

use crate::dns::HopResolver;
use crate::socket::ProbeTransport;
use crate::traceroute::classify::{classify, ClassifiedResponse, IcmpKind};
use crate::traceroute::{Target, TraceConfig, TraceError};
use std::io::Write;
use std::net::Ipv4Addr;
use std::time::Instant;

/// Trace engine
pub struct TraceEngine<T: ProbeTransport, R: HopResolver> {
    config: TraceConfig,
    target: Target,
    identity: u16,
    transport: T,
    resolver: R,
    /// Origin address of the most recently printed hop name. Updated
    /// only when a different address responds, and kept for the whole
    /// trace so a hop answering across consecutive queries or rows is
    /// named once.
    last_printed: Option<Ipv4Addr>,
}

impl<T: ProbeTransport, R: HopResolver> TraceEngine<T, R> {
    /// Create a new trace engine
    pub fn new(
        config: TraceConfig,
        target: Target,
        identity: u16,
        transport: T,
        resolver: R,
    ) -> Result<Self, TraceError> {
        config.validate().map_err(TraceError::Config)?;

        Ok(Self {
            config,
            target,
            identity,
            transport,
            resolver,
            last_printed: None,
        })
    }

    /// Run the trace, writing rows to `out` as they complete.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<(), TraceError> {
        writeln!(
            out,
            "traceroute to {} ({}), {} hops max, {} byte packets",
            self.target.hostname, self.target.addr, self.config.max_ttl, self.config.packet_size
        )?;

        let mut reached = false;
        for ttl in 1..=self.config.max_ttl {
            write!(out, " {ttl} ")?;
            out.flush()?;

            for query in 0..self.config.nqueries {
                let dest_port = self.config.base_port.wrapping_add(query);
                let sent_at = Instant::now();
                self.transport
                    .send_probe(ttl, dest_port)
                    .map_err(|e| TraceError::Send(e.to_string()))?;

                // Wait for a message belonging to this probe. Foreign
                // traffic re-arms a fresh full wait window.
                loop {
                    let raw = match self.transport.recv_control(self.config.wait_time) {
                        Ok(raw) => raw,
                        Err(e) => {
                            // A failed read is indistinguishable from
                            // silence as far as the row is concerned.
                            if self.config.verbose {
                                eprintln!("trace: receive error: {e}");
                            }
                            None
                        }
                    };

                    match raw {
                        None => {
                            write!(out, "  *")?;
                            break;
                        }
                        Some(bytes) => match classify(&bytes, self.identity) {
                            ClassifiedResponse::Unrelated => continue,
                            ClassifiedResponse::InProgress {
                                origin,
                                arrival_ttl,
                                kind,
                            } => {
                                self.report_hop(out, origin, arrival_ttl, kind, sent_at)?;
                                break;
                            }
                            ClassifiedResponse::Final {
                                origin,
                                arrival_ttl,
                                kind,
                            } => {
                                self.report_hop(out, origin, arrival_ttl, kind, sent_at)?;
                                // The remaining queries at this TTL
                                // still run before the trace ends.
                                reached = true;
                                break;
                            }
                        },
                    }
                }
                out.flush()?;
            }

            writeln!(out)?;
            if reached {
                break;
            }
        }

        Ok(())
    }

    /// Print one responded probe: hop name when the origin changed,
    /// verbose kind line when enabled, then the elapsed time.
    fn report_hop(
        &mut self,
        out: &mut dyn Write,
        origin: Ipv4Addr,
        arrival_ttl: u8,
        kind: IcmpKind,
        sent_at: Instant,
    ) -> Result<(), TraceError> {
        // Stamp before any name lookup so DNS latency never inflates
        // the displayed round-trip. Sub-millisecond answers display
        // as 1 ms.
        let elapsed = sent_at.elapsed().as_millis().max(1);

        if self.last_printed != Some(origin) {
            let name = if self.config.numeric {
                origin.to_string()
            } else {
                self.resolver
                    .reverse_lookup(origin)
                    .unwrap_or_else(|| origin.to_string())
            };
            write!(out, "{name} ({origin})")?;
            if self.config.display_ttl {
                write!(out, " ttl={arrival_ttl}")?;
            }
            self.last_printed = Some(origin);
        }

        if self.config.verbose {
            write!(out, "\n\t{} from {origin} after", kind.name())?;
        }

        write!(out, "  {elapsed} ms")?;
        Ok(())
    }
}
