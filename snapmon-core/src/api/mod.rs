//! SnapRoute REST API access.
//!
//! The collector only needs "GET a URL, hand back the body". That seam is the
//! [`DeviceApi`] trait; [`HttpDeviceApi`] is the production implementation on
//! top of `reqwest`.

mod types;

pub use types::{
    PortObject, PortState, PortsDocument, StatusDocument, SystemStatus, OPER_STATE_UP,
};

use crate::error::{Result, SnapmonError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Path of the port listing, relative to the API base URL.
pub const PORTS_PATH: &str = "state/Ports";

/// Path of the system status object, relative to the API base URL.
pub const SYSTEM_STATUS_PATH: &str = "state/SystemStatus";

/// Transport used by the collector to read API documents.
///
/// Implementations return the raw response body. Any failure to obtain a body
/// is reported as [`SnapmonError::Transport`].
#[async_trait]
pub trait DeviceApi: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// `reqwest`-backed device API client.
#[derive(Clone)]
pub struct HttpDeviceApi {
    client: Client,
}

impl HttpDeviceApi {
    /// Create a client whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            SnapmonError::InvalidConfig { reason: format!("Failed to create HTTP client: {}", e) }
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DeviceApi for HttpDeviceApi {
    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let transport = |reason: String| SnapmonError::Transport { url: url.to_string(), reason };

        let response = self.client.get(url).send().await.map_err(|e| transport(e.to_string()))?;

        // The status code is not checked; the body alone decides the outcome
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| transport(e.to_string()))?;
        debug!(status, bytes = body.len(), "Fetched API document");
        Ok(body.to_vec())
    }
}

/// Decode an API document, logging the offending body on failure.
pub fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        error!(url = %url, error = %e, "Failed to decode API response");
        error!(url = %url, content = %String::from_utf8_lossy(body), "Undecodable response body");
        SnapmonError::Decode { url: url.to_string(), reason: e.to_string() }
    })
}
