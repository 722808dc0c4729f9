//! Bridge configuration.
//!
//! Settings merge in layers: built-in defaults, then an optional TOML file,
//! then `CAS__*` environment variables, then per-instance overrides.
//! Overrides win on conflict. The merged configuration is read once at
//! bridge construction and is immutable afterwards.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default port for the CAS server.
fn default_port() -> u16 {
    443
}

/// CAS protocol version spoken by the client.
///
/// Accepts the upstream constant names (`CAS_VERSION_2_0`) as well as the
/// dotted forms (`2.0`). Anything else is fatal at configuration time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CasVersion {
    V1,
    #[default]
    V2,
    V3,
}

impl CasVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
            Self::V3 => "3.0",
        }
    }
}

impl fmt::Display for CasVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CasVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" | "CAS_VERSION_1_0" => Ok(Self::V1),
            "2.0" | "CAS_VERSION_2_0" => Ok(Self::V2),
            "3.0" | "CAS_VERSION_3_0" => Ok(Self::V3),
            other => Err(ConfigError::UnknownVersion(other.to_string())),
        }
    }
}

impl TryFrom<String> for CasVersion {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CasVersion> for String {
    fn from(version: CasVersion) -> Self {
        version.as_str().to_string()
    }
}

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasConfig {
    /// CAS protocol version.
    pub version: CasVersion,

    /// CAS server hostname. Required.
    pub hostname: String,

    /// CAS server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URI of the CAS endpoints on the server (e.g. `/cas`).
    pub uri: String,

    /// Path for protocol-level debug logging. Absent means disabled.
    pub debug_log: Option<PathBuf>,

    /// Extra transport options handed to the protocol client verbatim.
    pub transport_options: HashMap<String, String>,

    /// CA certificate bundle for validating the CAS server.
    /// Absent means server certificate validation is disabled.
    pub ca_cert: Option<PathBuf>,

    /// Name of an extra event published after a successful handshake,
    /// for workflows outside the host's native login path.
    pub login_event: Option<String>,

    /// External base URL of this application, used to absolutize relative
    /// post-logout redirect targets.
    pub service_url: Option<Url>,
}

impl Default for CasConfig {
    fn default() -> Self {
        Self {
            version: CasVersion::default(),
            hostname: String::new(),
            port: default_port(),
            uri: String::new(),
            debug_log: None,
            transport_options: HashMap::new(),
            ca_cert: None,
            login_event: None,
            service_url: None,
        }
    }
}

impl CasConfig {
    /// Load configuration from an optional TOML file plus `CAS__*`
    /// environment variables. File values override defaults; environment
    /// values override the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let built = builder
            .add_source(Environment::with_prefix("CAS").separator("__"))
            .build()?;

        Ok(built.try_deserialize()?)
    }

    /// Apply per-instance overrides on top of this configuration.
    /// Overrides win on conflict.
    pub fn merge(mut self, overrides: CasConfigOverrides) -> Self {
        if let Some(version) = overrides.version {
            self.version = version;
        }
        if let Some(hostname) = overrides.hostname {
            self.hostname = hostname;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(uri) = overrides.uri {
            self.uri = uri;
        }
        if let Some(debug_log) = overrides.debug_log {
            self.debug_log = Some(debug_log);
        }
        if let Some(transport_options) = overrides.transport_options {
            self.transport_options = transport_options;
        }
        if let Some(ca_cert) = overrides.ca_cert {
            self.ca_cert = Some(ca_cert);
        }
        if let Some(login_event) = overrides.login_event {
            self.login_event = Some(login_event);
        }
        if let Some(service_url) = overrides.service_url {
            self.service_url = Some(service_url);
        }
        self
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hostname.is_empty() {
            return Err(ConfigError::MissingHostname);
        }
        Ok(())
    }
}

/// Per-instance configuration overrides: an all-optional mirror of
/// [`CasConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasConfigOverrides {
    pub version: Option<CasVersion>,
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub uri: Option<String>,
    pub debug_log: Option<PathBuf>,
    pub transport_options: Option<HashMap<String, String>>,
    pub ca_cert: Option<PathBuf>,
    pub login_event: Option<String>,
    pub service_url: Option<Url>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The protocol version string names no known CAS protocol constant.
    #[error("unknown CAS protocol version: {0}")]
    UnknownVersion(String),

    /// No CAS server hostname configured.
    #[error("CAS server hostname is required")]
    MissingHostname,

    /// A configuration source failed to load or deserialize.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
