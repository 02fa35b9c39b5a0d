//! Layered settings for the dashboard.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, or `pothole.toml` in the working directory if it exists)
//! 3. environment variables prefixed `POTHOLE__`, e.g. `POTHOLE__FEED__READ_KEY`
//! 4. command-line overrides
//!
//! ```toml
//! [feed]
//! base_url = "https://api.thingspeak.com"
//! channel_id = "3153910"
//! read_key = "..."          # better supplied via POTHOLE__FEED__READ_KEY
//! results = 500
//! timeout = "10s"
//!
//! [poll]
//! interval = "60s"
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use pothole_adapters::thingspeak::{ThingSpeakClient, DEFAULT_BASE_URL, DEFAULT_RESULTS, MAX_RESULTS};
use serde::Deserialize;

use crate::duration::parse_duration;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "pothole.toml";

/// Channel polled when none is configured.
pub const DEFAULT_CHANNEL_ID: &str = "3153910";

const ENV_PREFIX: &str = "POTHOLE";

/// Command-line values that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub channel_id: Option<String>,
    pub interval: Option<String>,
    pub results: Option<u32>,
}

/// How to reach the feed.
#[derive(Clone, PartialEq)]
pub struct FeedSettings {
    pub base_url: String,
    pub channel_id: String,
    pub read_key: Option<String>,
    pub results: u32,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for FeedSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSettings")
            .field("base_url", &self.base_url)
            .field("channel_id", &self.channel_id)
            .field("read_key", &self.read_key.as_ref().map(|_| "<redacted>"))
            .field("results", &self.results)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub feed: FeedSettings,
    pub poll_interval: Duration,
}

#[derive(Deserialize)]
struct RawSettings {
    feed: RawFeed,
    poll: RawPoll,
}

#[derive(Deserialize)]
struct RawFeed {
    base_url: String,
    channel_id: String,
    #[serde(default)]
    read_key: Option<String>,
    results: u32,
    #[serde(default)]
    timeout: Option<String>,
}

#[derive(Deserialize)]
struct RawPoll {
    interval: String,
}

impl Settings {
    /// Load settings from all sources.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(
            path,
            overrides,
            Environment::with_prefix(ENV_PREFIX).separator("__"),
        )
    }

    fn load_with_env(path: Option<&Path>, overrides: &Overrides, env: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let raw: RawSettings = Config::builder()
            .set_default("feed.base_url", DEFAULT_BASE_URL)?
            .set_default("feed.channel_id", DEFAULT_CHANNEL_ID)?
            .set_default("feed.results", i64::from(DEFAULT_RESULTS))?
            .set_default("poll.interval", "60s")?
            .add_source(file)
            .add_source(env)
            .set_override_option("feed.channel_id", overrides.channel_id.clone())?
            .set_override_option("feed.results", overrides.results.map(i64::from))?
            .set_override_option("poll.interval", overrides.interval.clone())?
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Self::resolve(raw)
    }

    fn resolve(raw: RawSettings) -> Result<Self> {
        let channel_id = raw.feed.channel_id.trim().to_string();
        if channel_id.is_empty() {
            bail!("feed.channel_id must not be empty");
        }
        if raw.feed.results == 0 || raw.feed.results > MAX_RESULTS {
            bail!("feed.results must be between 1 and {}", MAX_RESULTS);
        }

        let timeout = raw
            .feed
            .timeout
            .as_deref()
            .map(parse_duration)
            .transpose()
            .context("Invalid feed.timeout")?;

        let poll_interval = parse_duration(&raw.poll.interval).context("Invalid poll.interval")?;
        if poll_interval.is_zero() {
            bail!("poll.interval must be greater than zero");
        }

        Ok(Self {
            feed: FeedSettings {
                base_url: raw.feed.base_url,
                channel_id,
                read_key: raw.feed.read_key.filter(|k| !k.trim().is_empty()),
                results: raw.feed.results,
                timeout,
            },
            poll_interval,
        })
    }

    /// Build the feed client these settings describe.
    pub fn feed_client(&self) -> Result<ThingSpeakClient> {
        let mut builder = ThingSpeakClient::builder(&self.feed.channel_id)
            .base_url(&self.feed.base_url)
            .results(self.feed.results);
        if let Some(key) = &self.feed.read_key {
            builder = builder.read_key(key);
        }
        if let Some(timeout) = self.feed.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().context("Failed to create feed client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: ::config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(map))
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn defaults_apply_without_sources() {
        let file = toml_file("");
        let settings = Settings::load_with_env(Some(file.path()), &Overrides::default(), env(&[]))
            .unwrap();

        assert_eq!(settings.feed.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.feed.channel_id, DEFAULT_CHANNEL_ID);
        assert_eq!(settings.feed.results, 500);
        assert!(settings.feed.read_key.is_none());
        assert!(settings.feed.timeout.is_none());
        assert_eq!(settings.poll_interval, Duration::from_secs(60));
    }

    #[test]
    fn file_values_are_read() {
        let file = toml_file(
            r#"
            [feed]
            channel_id = "42"
            results = 100
            timeout = "5s"

            [poll]
            interval = "30s"
            "#,
        );
        let settings = Settings::load_with_env(Some(file.path()), &Overrides::default(), env(&[]))
            .unwrap();

        assert_eq!(settings.feed.channel_id, "42");
        assert_eq!(settings.feed.results, 100);
        assert_eq!(settings.feed.timeout, Some(Duration::from_secs(5)));
        assert_eq!(settings.poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn env_overrides_file_and_cli_overrides_env() {
        let file = toml_file("[feed]\nchannel_id = \"42\"\n");
        let env = env(&[
            ("POTHOLE__FEED__CHANNEL_ID", "77"),
            ("POTHOLE__FEED__READ_KEY", "ENVKEY"),
            ("POTHOLE__POLL__INTERVAL", "90s"),
        ]);
        let overrides = Overrides {
            interval: Some("2m".into()),
            ..Overrides::default()
        };

        let settings = Settings::load_with_env(Some(file.path()), &overrides, env).unwrap();
        assert_eq!(settings.feed.channel_id, "77");
        assert_eq!(settings.feed.read_key.as_deref(), Some("ENVKEY"));
        assert_eq!(settings.poll_interval, Duration::from_secs(120));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(Settings::load_with_env(Some(&path), &Overrides::default(), env(&[])).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let file = toml_file("[poll]\ninterval = \"0s\"\n");
        assert!(Settings::load_with_env(Some(file.path()), &Overrides::default(), env(&[])).is_err());

        let file = toml_file("[poll]\ninterval = \"whenever\"\n");
        assert!(Settings::load_with_env(Some(file.path()), &Overrides::default(), env(&[])).is_err());

        let file = toml_file("[feed]\nresults = 0\n");
        assert!(Settings::load_with_env(Some(file.path()), &Overrides::default(), env(&[])).is_err());

        let file = toml_file("[feed]\nchannel_id = \"  \"\n");
        assert!(Settings::load_with_env(Some(file.path()), &Overrides::default(), env(&[])).is_err());
    }

    #[test]
    fn debug_output_redacts_read_key() {
        let file = toml_file("[feed]\nread_key = \"TOPSECRETKEY\"\n");
        let settings = Settings::load_with_env(Some(file.path()), &Overrides::default(), env(&[]))
            .unwrap();

        let debug = format!("{:?}", settings);
        assert!(!debug.contains("TOPSECRETKEY"));
        assert!(debug.contains("<redacted>"));
        assert!(settings.feed_client().is_ok());
    }
}
