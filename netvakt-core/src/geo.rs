//! Geolocation records and the at-most-once resolution table.

use std::collections::HashSet;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Ownership and location metadata for one external source address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoRecord {
    pub ip: IpAddr,
    /// Human-readable "City, Country" label.
    pub location: String,
    pub country: String,
    pub isp: String,
    pub org: String,
    /// Autonomous-system identifier, e.g. "AS15169 Google LLC".
    pub asn: String,
    pub lat: f64,
    pub lon: f64,
    /// Protocol label of the packet that triggered the lookup.
    pub protocol: String,
    pub is_proxy: bool,
    pub is_hosting: bool,
}

/// Append-only record list plus the set of successfully resolved addresses.
///
/// Both live behind one lock so the membership check and the insert are a
/// single atomic step: two racing enrichments of the same address can never
/// both append. Only a successful lookup marks an address as seen — failed
/// attempts stay eligible for retry on the next packet.
#[derive(Debug, Default)]
pub struct GeoTable {
    records: Vec<GeoRecord>,
    seen: HashSet<IpAddr>,
}

impl GeoTable {
    /// Inserts a record unless its address was already resolved.
    ///
    /// Returns false when the address was a duplicate.
    pub fn insert(&mut self, record: GeoRecord) -> bool {
        if !self.seen.insert(record.ip) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn is_seen(&self, ip: IpAddr) -> bool {
        self.seen.contains(&ip)
    }

    pub fn records(&self) -> &[GeoRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.seen.clear();
    }
}
