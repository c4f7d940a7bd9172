//! The lookup seam and its HTTP implementation.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// A single lookup attempt failing, in any of its shapes. All of them mean
/// the same thing to the enricher: drop the attempt, retry on a later packet.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup timed out")]
    Timeout,

    #[error("lookup transport failed: {0}")]
    Transport(String),

    #[error("lookup returned HTTP {0}")]
    Http(u16),

    #[error("lookup reply could not be decoded: {0}")]
    Decode(String),
}

/// Reply shape of the lookup service. Field absence is normal; consumers
/// fall back to "Unknown".
#[derive(Debug, Clone, Deserialize)]
pub struct GeoReply {
    #[serde(default)]
    pub status: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub isp: Option<String>,
    pub org: Option<String>,
    #[serde(rename = "as")]
    pub asn: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub proxy: Option<bool>,
    pub hosting: Option<bool>,
}

impl GeoReply {
    /// Only positively-statused replies produce a record.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Resolves a public address to location/ownership metadata.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoReply, LookupError>;
}

const REPLY_FIELDS: &str = "status,city,country,isp,org,as,lat,lon,proxy,hosting";

/// ip-api.com client with a bounded per-request timeout.
///
/// Rate limits and quota are owned entirely by the service; a 429 surfaces
/// as [`LookupError::Http`] like any other failure.
#[derive(Debug, Clone)]
pub struct IpApiClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl IpApiClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[async_trait]
impl GeoLookup for IpApiClient {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoReply, LookupError> {
        let url = format!(
            "{}/{}?fields={}",
            self.endpoint.trim_end_matches('/'),
            ip,
            REPLY_FIELDS
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout
                } else {
                    LookupError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(LookupError::Http(response.status().as_u16()));
        }

        response
            .json::<GeoReply>()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))
    }
}
