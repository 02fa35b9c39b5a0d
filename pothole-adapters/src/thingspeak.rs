//! ThingSpeak adapter using the channel feeds HTTP API.
//!
//! Reads the most recent entries of a channel from
//! `GET {base_url}/channels/{channel_id}/feeds.json?results={n}`, adding
//! `api_key` when a read key is configured (private channels).
//!
//! ## Example
//!
//! ```rust,no_run
//! use pothole_adapters::{thingspeak::ThingSpeakClient, FeedSource};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ThingSpeakClient::builder("3153910")
//!         .results(100)
//!         .timeout(Duration::from_secs(10))
//!         .build()?;
//!
//!     for record in client.fetch().await? {
//!         println!("{:?} {:?}", record.entry_id, record.field1);
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{FeedEnvelope, FeedSource, FetchError, RawRecord};

/// Public ThingSpeak API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.thingspeak.com";

/// Number of most recent entries requested per read.
pub const DEFAULT_RESULTS: u32 = 500;

/// Upper bound ThingSpeak accepts for `results`.
pub const MAX_RESULTS: u32 = 8000;

/// Client for one ThingSpeak channel.
#[derive(Clone)]
pub struct ThingSpeakClient {
    client: Client,
    base_url: String,
    channel_id: String,
    read_key: Option<String>,
    results: u32,
    description: String,
}

impl ThingSpeakClient {
    /// Create a new builder for the given channel.
    pub fn builder(channel_id: impl Into<String>) -> ThingSpeakClientBuilder {
        ThingSpeakClientBuilder::new(channel_id)
    }

    /// The feeds endpoint for this channel, without query parameters.
    pub fn feeds_url(&self) -> String {
        format!(
            "{}/channels/{}/feeds.json",
            self.base_url.trim_end_matches('/'),
            self.channel_id
        )
    }

    /// Query parameters sent with every read.
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("results", self.results.to_string())];
        if let Some(key) = &self.read_key {
            query.push(("api_key", key.clone()));
        }
        query
    }

    /// Number of records requested per read.
    pub fn results(&self) -> u32 {
        self.results
    }
}

#[async_trait]
impl FeedSource for ThingSpeakClient {
    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
        let response = self
            .client
            .get(self.feeds_url())
            .query(&self.query())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let envelope = FeedEnvelope::parse(&body)?;

        debug!(
            channel = %self.channel_id,
            records = envelope.feeds.len(),
            "fetched feed"
        );

        Ok(envelope.feeds)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for ThingSpeakClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThingSpeakClient")
            .field("base_url", &self.base_url)
            .field("channel_id", &self.channel_id)
            .field("read_key", &self.read_key.as_ref().map(|_| "<redacted>"))
            .field("results", &self.results)
            .finish()
    }
}

/// Builder for ThingSpeakClient.
#[derive(Debug, Default)]
pub struct ThingSpeakClientBuilder {
    channel_id: String,
    base_url: Option<String>,
    read_key: Option<String>,
    results: Option<u32>,
    timeout: Option<Duration>,
}

impl ThingSpeakClientBuilder {
    /// Create a builder for the given channel.
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            ..Self::default()
        }
    }

    /// Set the API base URL (default: `https://api.thingspeak.com`).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the channel read key. Empty keys are treated as absent.
    pub fn read_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.read_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    /// Set how many of the most recent records to request (default: 500).
    ///
    /// Clamped to `1..=8000`.
    pub fn results(mut self, results: u32) -> Self {
        self.results = Some(results);
        self
    }

    /// Set a request timeout. Without one the transport default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ThingSpeakClient, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Http(format!("failed to build HTTP client: {}", e)))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let description = format!("thingspeak: channel {}", self.channel_id);

        Ok(ThingSpeakClient {
            client,
            base_url,
            channel_id: self.channel_id,
            read_key: self.read_key,
            results: self.results.unwrap_or(DEFAULT_RESULTS).clamp(1, MAX_RESULTS),
            description,
        })
    }
}
