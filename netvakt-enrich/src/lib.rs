//! netvakt-enrich
//!
//! Opportunistic geolocation enrichment of external source addresses.
//! Lookups run out-of-band from the capture path, deduplicate successfully
//! resolved addresses, and isolate every failure: a timed-out or refused
//! lookup is dropped silently and retried on the next packet from the same
//! address.

pub mod enricher;
pub mod lookup;

pub use enricher::GeoEnricher;
pub use lookup::{GeoLookup, GeoReply, IpApiClient, LookupError};
