//! Relay configuration.
//!
//! Loaded once from a TOML file, validated, then shared read-only. Every
//! section except `[server]` and `[signing]` has defaults.
//!
//! ```toml
//! proxy = "10.0.0.2:3128"
//!
//! [server]
//! base_url = "https://sessions.example.net"
//!
//! [signing]
//! secret = "0123456789abcdef"
//! iv = "fedcba9876543210"
//!
//! [upload]
//! batch_size = 50
//! ```

use std::path::{Path, PathBuf};

use motion::config::SynthesisConfig;
use motion::generators::SegmentWidths;
use motion::model::GeoPoint;
use serde::Deserialize;

use crate::errors::ConfigError;
use crate::signing::RequestSigner;

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Outbound proxy for protocol calls. A missing port defaults to 80.
    #[serde(default)]
    pub proxy: Option<String>,
    /// Start position for free runs without a recorded trajectory.
    #[serde(default)]
    pub default_origin: Option<GeoPoint>,
    pub server: ServerConfig,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub client: ClientIdentity,
    pub signing: SigningConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub route: Option<RouteConfig>,
    #[serde(default)]
    pub callback: Option<CallbackConfig>,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub segments: SegmentWidths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    concat!("relay/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Per-account credentials. Run parameters may override any of them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub authorization: String,
    pub satoken: String,
    pub device_id: String,
}

/// Client identity echoed in every request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientIdentity {
    pub model_name: String,
    pub app_version: String,
    pub build_version: String,
    pub channel: String,
    pub app_code: String,
    pub system_version: String,
    pub platform: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            model_name: String::new(),
            app_version: String::new(),
            build_version: String::new(),
            channel: "other".to_string(),
            app_code: String::new(),
            system_version: "12".to_string(),
            platform: "2".to_string(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct SigningConfig {
    pub secret: String,
    pub iv: String,
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Fixed delay between trajectory batches.
    pub batch_delay_ms: u64,
    /// Random delay range between segment and checkpoint uploads.
    pub step_delay_ms: (u64, u64),
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            batch_delay_ms: 500,
            step_delay_ms: (500, 1500),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub batch_size: usize,
    /// Business codes meaning the credential has expired.
    pub auth_expired_codes: Vec<i64>,
    /// Trajectory points repeated in the finish call.
    pub finish_tail_points: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            auth_expired_codes: vec![1503, 1516],
            finish_tail_points: 4,
        }
    }
}

/// Walking-direction service used to join checkpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    pub endpoint: String,
    pub key: String,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

/// Orchestrator notified once per run.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackConfig {
    pub url: String,
}

impl RelayConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: RelayConfig = toml::from_str(content)?;
        config.proxy = config.proxy.as_deref().and_then(normalize_proxy);
        config.validate()?;
        Ok(config)
    }

    /// Replaces the proxy, normalizing it the same way as a configured one.
    pub fn with_proxy(mut self, proxy: Option<&str>) -> Self {
        if let Some(proxy) = proxy {
            self.proxy = normalize_proxy(proxy);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.server.base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Missing("server.base_url"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "server.base_url",
                reason: format!("expected an http(s) URL, got {base}"),
            });
        }
        if self.server.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "server.timeout_secs",
                reason: "must be positive".to_string(),
            });
        }

        self.signer()?;

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.upload.batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "upload.batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        let (min, max) = self.pacing.step_delay_ms;
        if min > max {
            return Err(ConfigError::Invalid {
                field: "pacing.step_delay_ms",
                reason: format!("range {min}..{max} is empty"),
            });
        }
        self.validate_synthesis()?;
        if let Some(origin) = self.default_origin {
            if !origin.is_valid() {
                return Err(ConfigError::Invalid {
                    field: "default_origin",
                    reason: format!("{}, {} is not a WGS84 coordinate", origin.lng, origin.lat),
                });
            }
        }
        if let Some(callback) = &self.callback {
            if callback.url.trim().is_empty() {
                return Err(ConfigError::Missing("callback.url"));
            }
        }
        Ok(())
    }

    fn validate_synthesis(&self) -> Result<(), ConfigError> {
        let synthesis = &self.synthesis;
        let (min_spacing, max_spacing) = synthesis.connective_spacing_m;
        let spacings = [
            ("synthesis.curve_spacing_m", synthesis.curve_spacing_m),
            ("synthesis.sample_interval_s", synthesis.sample_interval_s),
            ("synthesis.smoothing_spacing_m", synthesis.smoothing_spacing_m),
            ("synthesis.connective_spacing_m", min_spacing),
            ("synthesis.loop_path.radius_m", synthesis.loop_path.radius_m),
        ];
        for (field, value) in spacings {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        if !(max_spacing.is_finite() && max_spacing >= min_spacing) {
            return Err(ConfigError::Invalid {
                field: "synthesis.connective_spacing_m",
                reason: format!("range {min_spacing}..{max_spacing} is empty"),
            });
        }
        if synthesis.loop_path.laps == 0 || synthesis.loop_path.points_per_lap < 3 {
            return Err(ConfigError::Invalid {
                field: "synthesis.loop_path",
                reason: "needs at least one lap of three points".to_string(),
            });
        }
        Ok(())
    }

    pub fn signer(&self) -> Result<RequestSigner, ConfigError> {
        Ok(RequestSigner::new(&self.signing.secret, &self.signing.iv)?)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.server.base_url.trim().trim_end_matches('/')
    }
}

/// Adds a scheme and a default port of 80 to a bare proxy address.
/// Blank input means no proxy.
pub fn normalize_proxy(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (scheme, rest) = match raw.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", raw),
    };
    let (authority, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let host = authority.rsplit('@').next().unwrap_or(authority);

    if host.contains(':') {
        Some(format!("{scheme}://{authority}{path}"))
    } else {
        Some(format!("{scheme}://{authority}:80{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[server]
base_url = "https://sessions.example.net/"

[signing]
secret = "0123456789abcdef"
iv = "fedcba9876543210"
"#;

    #[test]
    fn test_minimal_uses_defaults() {
        let config = RelayConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.base_url(), "https://sessions.example.net");
        assert_eq!(config.server.timeout_secs, 15);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.upload.batch_size, 50);
        assert_eq!(config.upload.auth_expired_codes, vec![1503, 1516]);
        assert_eq!(config.pacing.step_delay_ms, (500, 1500));
        assert_eq!(config.client.platform, "2");
        assert_eq!(config.segments.pace_m, 50);
        assert!(config.proxy.is_none());
        assert!(config.route.is_none());
    }

    #[test]
    fn test_full_document() {
        let content = r#"
proxy = "10.0.0.2"
default_origin = { lng = 120.5235, lat = 30.6474 }

[server]
base_url = "http://localhost:8080"
timeout_secs = 5

[credentials]
authorization = "token"
device_id = "device"

[signing]
secret = "0123456789abcdef"
iv = "fedcba9876543210"

[retry]
max_attempts = 5

[pacing]
step_delay_ms = [10, 20]

[upload]
auth_expired_codes = [401]

[route]
endpoint = "http://routes.local/walking"
key = "k"

[callback]
url = "http://orchestrator.local/notify"

[synthesis.loop_path]
laps = 4
"#;
        let config = RelayConfig::from_toml_str(content).unwrap();

        assert_eq!(config.proxy.as_deref(), Some("http://10.0.0.2:80"));
        assert_eq!(config.server.timeout_secs, 5);
        assert_eq!(config.default_origin, Some(GeoPoint::new(120.5235, 30.6474)));
        assert_eq!(config.credentials.authorization, "token");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.max_delay_ms, 10_000);
        assert_eq!(config.pacing.step_delay_ms, (10, 20));
        assert_eq!(config.upload.auth_expired_codes, vec![401]);
        assert_eq!(config.synthesis.loop_path.laps, 4);
        assert!(config.route.is_some());
        assert!(config.callback.is_some());
    }

    #[test]
    fn test_signing_is_required() {
        let content = r#"
[server]
base_url = "http://localhost"
"#;
        assert!(matches!(
            RelayConfig::from_toml_str(content),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_invalid_settings() {
        let bad_secret = MINIMAL.replace("0123456789abcdef", "short");
        assert!(matches!(
            RelayConfig::from_toml_str(&bad_secret),
            Err(ConfigError::Signing(_))
        ));

        let bad_url = MINIMAL.replace("https://sessions.example.net/", "sessions");
        assert!(matches!(
            RelayConfig::from_toml_str(&bad_url),
            Err(ConfigError::Invalid { field: "server.base_url", .. })
        ));

        let bad_origin = format!("default_origin = {{ lng = 200.0, lat = 0.0 }}\n{MINIMAL}");
        assert!(matches!(
            RelayConfig::from_toml_str(&bad_origin),
            Err(ConfigError::Invalid { field: "default_origin", .. })
        ));

        let bad_batch = format!("{MINIMAL}\n[upload]\nbatch_size = 0\n");
        assert!(matches!(
            RelayConfig::from_toml_str(&bad_batch),
            Err(ConfigError::Invalid { field: "upload.batch_size", .. })
        ));
    }

    #[test]
    fn test_invalid_synthesis() {
        let zero_spacing = format!("{MINIMAL}\n[synthesis]\ncurve_spacing_m = 0.0\n");
        assert!(matches!(
            RelayConfig::from_toml_str(&zero_spacing),
            Err(ConfigError::Invalid { field: "synthesis.curve_spacing_m", .. })
        ));

        let zero_interval = format!("{MINIMAL}\n[synthesis]\nsample_interval_s = 0.0\n");
        assert!(matches!(
            RelayConfig::from_toml_str(&zero_interval),
            Err(ConfigError::Invalid { field: "synthesis.sample_interval_s", .. })
        ));

        let zero_smoothing = format!("{MINIMAL}\n[synthesis]\nsmoothing_spacing_m = 0.0\n");
        assert!(matches!(
            RelayConfig::from_toml_str(&zero_smoothing),
            Err(ConfigError::Invalid { field: "synthesis.smoothing_spacing_m", .. })
        ));

        let bad_connective = format!("{MINIMAL}\n[synthesis]\nconnective_spacing_m = [-1.0, 4.0]\n");
        assert!(matches!(
            RelayConfig::from_toml_str(&bad_connective),
            Err(ConfigError::Invalid { field: "synthesis.connective_spacing_m", .. })
        ));

        let no_laps = format!("{MINIMAL}\n[synthesis.loop_path]\nlaps = 0\n");
        assert!(matches!(
            RelayConfig::from_toml_str(&no_laps),
            Err(ConfigError::Invalid { field: "synthesis.loop_path", .. })
        ));
    }

    #[test]
    fn test_normalize_proxy() {
        assert_eq!(normalize_proxy("1.2.3.4").as_deref(), Some("http://1.2.3.4:80"));
        assert_eq!(
            normalize_proxy("1.2.3.4:3128").as_deref(),
            Some("http://1.2.3.4:3128")
        );
        assert_eq!(
            normalize_proxy("socks5://user:pw@proxy.local").as_deref(),
            Some("socks5://user:pw@proxy.local:80")
        );
        assert_eq!(
            normalize_proxy("http://proxy.local:8080/").as_deref(),
            Some("http://proxy.local:8080/")
        );
        assert_eq!(normalize_proxy("  "), None);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = RelayConfig::from_file(&path)
            .unwrap()
            .with_proxy(Some("127.0.0.1"));
        assert_eq!(config.proxy.as_deref(), Some("http://127.0.0.1:80"));

        assert!(matches!(
            RelayConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
