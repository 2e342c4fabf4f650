//! Name resolution for targets and responding hops
//!
//! Forward resolution turns the user's hostname-or-literal string into
//! a [`Target`] before any socket is opened. Reverse resolution is
//! best-effort display sugar for responding hops: a missing PTR record
//! or a failed lookup never aborts a trace, the caller just falls back
//! to the numeric address.

use crate::traceroute::{Target, TraceError};
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use std::net::{IpAddr, Ipv4Addr};

/// Reverse lookup seam the scheduler sees.
///
/// The production implementation queries DNS; engine tests substitute
/// a scripted one. Numeric-only mode bypasses this entirely.
pub trait HopResolver {
    /// Best-effort PTR lookup; `None` on any failure.
    fn reverse_lookup(&self, addr: Ipv4Addr) -> Option<String>;
}

/// DNS-backed resolver.
///
/// Owns a private current-thread tokio runtime so lookups can block
/// the caller; the probing engine itself stays strictly synchronous.
/// No timeout is imposed beyond what the underlying resolver applies.
pub struct DnsResolver {
    runtime: tokio::runtime::Runtime,
    resolver: TokioResolver,
}

impl DnsResolver {
    /// Build a resolver backed by a current-thread runtime.
    pub fn new() -> Result<Self, TraceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TraceError::Resolution(format!("failed to start resolver: {e}")))?;

        // Construct inside the runtime so the resolver picks up its
        // handle for connection spawning.
        let resolver = runtime.block_on(async {
            TokioResolver::builder_with_config(
                ResolverConfig::cloudflare(),
                TokioConnectionProvider::default(),
            )
            .build()
        });

        Ok(Self { runtime, resolver })
    }

    /// Resolve the user-supplied host string to a trace target.
    ///
    /// A valid literal IPv4 address short-circuits DNS entirely;
    /// otherwise a forward A lookup runs and an empty answer is a
    /// [`TraceError::Resolution`].
    pub fn resolve_target(&self, host: &str) -> Result<Target, TraceError> {
        if let Ok(addr) = host.parse::<Ipv4Addr>() {
            return Ok(Target::new(addr, host));
        }

        let lookup = self
            .runtime
            .block_on(self.resolver.ipv4_lookup(host))
            .map_err(|e| TraceError::Resolution(format!("{host}: {e}")))?;

        let addr = lookup
            .iter()
            .next()
            .map(|a| a.0)
            .ok_or_else(|| TraceError::Resolution(format!("no address found for {host}")))?;

        Ok(Target::new(addr, host))
    }
}

impl HopResolver for DnsResolver {
    fn reverse_lookup(&self, addr: Ipv4Addr) -> Option<String> {
        let lookup = self
            .runtime
            .block_on(self.resolver.reverse_lookup(IpAddr::V4(addr)))
            .ok()?;

        let name = lookup.iter().next()?.to_string();
        // PTR names come back rooted; strip the trailing dot for display
        let name = name.strip_suffix('.').unwrap_or(&name).to_string();
        Some(name)
    }
}
