//! Client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "http://api.jotform.com";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Response format requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Xml,
}

impl OutputFormat {
    /// Case-insensitive parse; anything other than `json` selects XML.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Xml
        }
    }

    /// Suffix appended to every resource path.
    pub fn suffix(&self) -> &'static str {
        match self {
            OutputFormat::Json => "",
            OutputFormat::Xml => ".xml",
        }
    }
}

/// Settings fixed for the lifetime of a `JotformClient`.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub output_format: OutputFormat,
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: &str, output_format: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            output_format: OutputFormat::parse(output_format),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = version.trim_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Create configuration from environment variables
    ///
    /// Expects:
    /// - `JOTFORM_API_KEY`: API key (required)
    /// - `JOTFORM_OUTPUT_FORMAT`: `json` or `xml` (default: `json`)
    /// - `JOTFORM_BASE_URL`: API host (default: `http://api.jotform.com`)
    /// - `JOTFORM_TIMEOUT_SECS`: per-request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("JOTFORM_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ApiError::Config("JOTFORM_API_KEY not set".into()))?;
        let format = lookup("JOTFORM_OUTPUT_FORMAT").unwrap_or_else(|| "json".to_string());
        let mut config = Self::new(&api_key, &format);

        if let Some(base_url) = lookup("JOTFORM_BASE_URL") {
            config = config.with_base_url(&base_url);
        }
        if let Some(secs) = lookup("JOTFORM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("JOTFORM_TIMEOUT_SECS is not a number: {secs}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("output_format", &self.output_format)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}
