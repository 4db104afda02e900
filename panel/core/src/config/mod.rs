//! Panel Configuration
//!
//! Which contract to drive, which provider to talk to and how long to wait
//! before re-reading status. Layers, later ones winning:
//! defaults, `panel.toml`, `GUARDPANEL_*` environment variables, then
//! command-line flags applied through [`ConfigOverrides`].
//!
//! The file lives at `$XDG_CONFIG_HOME/guardpanel/panel.toml`; a missing
//! file is not an error.
//!
//! # panel.toml
//!
//! ```toml
//! [contract]
//! address = "0x2798016fFFC711A153Fae8623d4429535Bd95397"
//! abi = "abi.json"
//! currency_symbol = "C2FLR"
//!
//! [provider]
//! rpc_url = "http://127.0.0.1:8545"
//! request_timeout_ms = 30000
//! receipt_poll_interval_ms = 1000
//! receipt_timeout_secs = 120
//!
//! [refresh]
//! after_connect_ms = 500
//! after_action_ms = 1000
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::is_address;

/// Contract the panel is bound to unless configured otherwise
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x2798016fFFC711A153Fae8623d4429535Bd95397";

// =============================================================================
// Error Types
// =============================================================================

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("Cannot read {path}: {source}")]
    ReadError {
        /// Config file path
        path: PathBuf,
        /// IO error
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("Malformed panel.toml: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value parsed but is not acceptable
    #[error("Bad configuration value: {0}")]
    ValidationError(String),
}

// =============================================================================
// Sources
// =============================================================================

/// Highest-priority layer that contributed a value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Command-line flag
    Cli,
    /// `GUARDPANEL_*` variable
    Env,
    /// `panel.toml`
    File,
    /// Built-in defaults only
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Cli => "command line",
            Self::Env => "environment",
            Self::File => "panel.toml",
            Self::Default => "defaults",
        })
    }
}

// =============================================================================
// File Schema
// =============================================================================

/// Contract section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractToml {
    /// Contract address
    pub address: Option<String>,

    /// Interface description path or URL
    pub abi: Option<String>,

    /// Currency symbol shown next to amounts
    pub currency_symbol: Option<String>,
}

/// Provider section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderToml {
    /// JSON-RPC endpoint
    pub rpc_url: Option<String>,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: Option<u64>,

    /// Receipt polling interval in milliseconds
    pub receipt_poll_interval_ms: Option<u64>,

    /// Maximum wait for inclusion in seconds
    pub receipt_timeout_secs: Option<u64>,
}

/// Refresh section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshToml {
    /// Delay before the status refresh that follows a connect
    pub after_connect_ms: Option<u64>,

    /// Delay before the status refresh that follows an action
    pub after_action_ms: Option<u64>,
}

/// Contents of `panel.toml`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelToml {
    /// Contract configuration section
    pub contract: ContractToml,

    /// Provider configuration section
    pub provider: ProviderToml,

    /// Refresh configuration section
    pub refresh: RefreshToml,
}

// =============================================================================
// Resolved Settings
// =============================================================================

/// Contract binding
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractConfig {
    /// Fixed contract address
    pub address: Address,
    /// Interface description location (path or URL)
    pub abi: String,
    /// Currency symbol shown next to amounts
    pub currency_symbol: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: address!("0x2798016fFFC711A153Fae8623d4429535Bd95397"),
            abi: "abi.json".to_string(),
            currency_symbol: "C2FLR".to_string(),
        }
    }
}

/// Provider connection settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Receipt polling interval in milliseconds
    pub receipt_poll_interval_ms: u64,
    /// Maximum wait for inclusion in seconds
    pub receipt_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            request_timeout_ms: 30_000,
            receipt_poll_interval_ms: 1_000,
            receipt_timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// Per-request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Receipt polling interval (never zero)
    #[must_use]
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms.max(1))
    }

    /// Maximum wait for inclusion
    #[must_use]
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }
}

/// Delays before the status refresh that follows a state change
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshConfig {
    /// After a successful connect, in milliseconds
    pub after_connect_ms: u64,
    /// After a successful status-relevant action, in milliseconds
    pub after_action_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            after_connect_ms: 500,
            after_action_ms: 1_000,
        }
    }
}

impl RefreshConfig {
    /// Delay after connect
    #[must_use]
    pub fn after_connect(&self) -> Duration {
        Duration::from_millis(self.after_connect_ms)
    }

    /// Delay after an action
    #[must_use]
    pub fn after_action(&self) -> Duration {
        Duration::from_millis(self.after_action_ms)
    }
}

/// Everything the dispatcher needs to know, after layering
#[derive(Clone, Debug, Default)]
pub struct PanelConfig {
    /// Contract binding
    pub contract: ContractConfig,

    /// Provider connection settings
    pub provider: ProviderConfig,

    /// Refresh delays
    pub refresh: RefreshConfig,

    /// `panel.toml` that contributed, if one did
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl PanelConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }
}

// =============================================================================
// Loading
// =============================================================================

/// `guardpanel/panel.toml` under the platform config directory
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("guardpanel").join("panel.toml"))
}

/// Resolve defaults, the default `panel.toml` and the environment
///
/// # Errors
///
/// Fails on an unreadable or malformed file, or an invalid contract address.
pub fn load_config() -> Result<PanelConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Same as [`load_config`] with an explicit file
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PanelConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PanelConfig, ConfigError> {
    let mut config = PanelConfig::default();

    match path {
        Some(file) if file.exists() => {
            let text = std::fs::read_to_string(&file).map_err(|source| ConfigError::ReadError {
                path: file.clone(),
                source,
            })?;
            let parsed: PanelToml = toml::from_str(&text)?;
            apply_toml_config(&mut config, &parsed)?;
            tracing::info!(path = %file.display(), "Read panel.toml");
            config.config_file_path = Some(file);
            config.source = ConfigSource::File;
        }
        Some(file) => {
            tracing::debug!(path = %file.display(), "No panel.toml, built-in defaults apply");
        }
        None => {}
    }

    apply_env_config(&mut config, env)?;

    Ok(config)
}

fn parse_contract_address(raw: &str) -> Result<Address, ConfigError> {
    let raw = raw.trim();
    let invalid = || ConfigError::ValidationError(format!("invalid contract address {raw:?}"));
    if !is_address(raw) {
        return Err(invalid());
    }
    let address = Address::from_str(raw).map_err(|_| invalid())?;
    if address.is_zero() {
        return Err(invalid());
    }
    Ok(address)
}

fn apply_toml_config(config: &mut PanelConfig, toml: &PanelToml) -> Result<(), ConfigError> {
    if let Some(ref address) = toml.contract.address {
        config.contract.address = parse_contract_address(address)?;
    }
    if let Some(ref abi) = toml.contract.abi {
        config.contract.abi.clone_from(abi);
    }
    if let Some(ref symbol) = toml.contract.currency_symbol {
        config.contract.currency_symbol.clone_from(symbol);
    }

    if let Some(ref url) = toml.provider.rpc_url {
        config.provider.rpc_url.clone_from(url);
    }
    if let Some(timeout) = toml.provider.request_timeout_ms {
        config.provider.request_timeout_ms = timeout;
    }
    if let Some(interval) = toml.provider.receipt_poll_interval_ms {
        config.provider.receipt_poll_interval_ms = interval;
    }
    if let Some(timeout) = toml.provider.receipt_timeout_secs {
        config.provider.receipt_timeout_secs = timeout;
    }

    if let Some(delay) = toml.refresh.after_connect_ms {
        config.refresh.after_connect_ms = delay;
    }
    if let Some(delay) = toml.refresh.after_action_ms {
        config.refresh.after_action_ms = delay;
    }

    Ok(())
}

/// `GUARDPANEL_*` variables; unparsable numbers are ignored
fn apply_env_config(
    config: &mut PanelConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let mut touched = false;
    let mut text = |key: &str| {
        let value = env(key);
        touched |= value.is_some();
        value
    };

    if let Some(address) = text("GUARDPANEL_CONTRACT") {
        config.contract.address = parse_contract_address(&address)?;
    }
    if let Some(abi) = text("GUARDPANEL_ABI") {
        config.contract.abi = abi;
    }
    if let Some(symbol) = text("GUARDPANEL_SYMBOL") {
        config.contract.currency_symbol = symbol;
    }
    if let Some(url) = text("GUARDPANEL_RPC_URL") {
        config.provider.rpc_url = url;
    }

    let mut millis = |key: &str| text(key).and_then(|v| v.trim().parse::<u64>().ok());
    if let Some(ms) = millis("GUARDPANEL_REQUEST_TIMEOUT_MS") {
        config.provider.request_timeout_ms = ms;
    }
    if let Some(secs) = millis("GUARDPANEL_RECEIPT_TIMEOUT_SECS") {
        config.provider.receipt_timeout_secs = secs;
    }
    if let Some(ms) = millis("GUARDPANEL_REFRESH_AFTER_CONNECT_MS") {
        config.refresh.after_connect_ms = ms;
    }
    if let Some(ms) = millis("GUARDPANEL_REFRESH_AFTER_ACTION_MS") {
        config.refresh.after_action_ms = ms;
    }

    if touched {
        config.source = ConfigSource::Env;
    }
    Ok(())
}

// =============================================================================
// Command-Line Layer
// =============================================================================

/// Flag values layered over a loaded [`PanelConfig`]
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// `--rpc-url`
    pub rpc_url: Option<String>,

    /// `--contract`, validated on apply
    pub contract: Option<String>,

    /// `--abi`
    pub abi: Option<String>,
}

impl ConfigOverrides {
    /// No flags given
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint flag
    #[must_use]
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    /// Contract flag
    #[must_use]
    pub fn with_contract(mut self, address: impl Into<String>) -> Self {
        self.contract = Some(address.into());
        self
    }

    /// Interface flag
    #[must_use]
    pub fn with_abi(mut self, abi: impl Into<String>) -> Self {
        self.abi = Some(abi.into());
        self
    }

    /// Overwrite `config` with every flag that was given
    ///
    /// # Errors
    ///
    /// Fails if `contract` is not a usable address.
    pub fn apply(&self, config: &mut PanelConfig) -> Result<(), ConfigError> {
        if let Some(ref address) = self.contract {
            config.contract.address = parse_contract_address(address)?;
        }
        if let Some(ref url) = self.rpc_url {
            config.provider.rpc_url.clone_from(url);
        }
        if let Some(ref abi) = self.abi {
            config.contract.abi.clone_from(abi);
        }

        if self.rpc_url.is_some() || self.contract.is_some() || self.abi.is_some() {
            config.source = ConfigSource::Cli;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_built_in_values() {
        let config = PanelConfig::default();

        assert_eq!(
            config.contract.address.to_checksum(None),
            DEFAULT_CONTRACT_ADDRESS
        );
        assert_eq!(config.contract.abi, "abi.json");
        assert_eq!(config.contract.currency_symbol, "C2FLR");
        assert_eq!(config.provider.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.refresh.after_connect(), Duration::from_millis(500));
        assert_eq!(config.refresh.after_action(), Duration::from_millis(1000));
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_file_lives_under_guardpanel_dir() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("guardpanel/panel.toml"));
        }
    }

    #[test]
    fn test_absent_file_is_not_an_error() {
        let config = load_config_with_env(
            Some(PathBuf::from("/nonexistent/guardpanel/panel.toml")),
            no_env,
        )
        .expect("defaults");
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_file_values_fill_missing_keys_with_defaults() {
        let file = write_toml(
            r#"
[contract]
address = "0x1111111111111111111111111111111111111111"
currency_symbol = "FLR"

[provider]
rpc_url = "http://node:8545"
receipt_timeout_secs = 30

[refresh]
after_action_ms = 250
"#,
        );

        let config =
            load_config_with_env(Some(file.path().to_path_buf()), no_env).expect("loads");

        assert_eq!(config.contract.address, Address::repeat_byte(0x11));
        assert_eq!(config.contract.currency_symbol, "FLR");
        assert_eq!(config.contract.abi, "abi.json");
        assert_eq!(config.provider.rpc_url, "http://node:8545");
        assert_eq!(config.provider.receipt_timeout(), Duration::from_secs(30));
        assert_eq!(config.refresh.after_action_ms, 250);
        assert_eq!(config.refresh.after_connect_ms, 500);
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_malformed_file_rejected() {
        let file = write_toml("[contract\naddress = ");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_contract_address_is_error() {
        let file = write_toml("[contract]\naddress = \"0x1234\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_environment_beats_file() {
        let file = write_toml("[provider]\nrpc_url = \"http://file:8545\"\n");
        let env = env_from(&[
            ("GUARDPANEL_RPC_URL", "http://env:8545"),
            ("GUARDPANEL_REFRESH_AFTER_CONNECT_MS", "50"),
            ("GUARDPANEL_RECEIPT_TIMEOUT_SECS", "not-a-number"),
        ]);

        let config = load_config_with_env(Some(file.path().to_path_buf()), env).expect("loads");

        assert_eq!(config.provider.rpc_url, "http://env:8545");
        assert_eq!(config.refresh.after_connect_ms, 50);
        assert_eq!(config.provider.receipt_timeout_secs, 120);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_env_contract_is_validated() {
        let env = env_from(&[("GUARDPANEL_CONTRACT", "0x0000000000000000000000000000000000000000")]);
        assert!(load_config_with_env(None, env).is_err());
    }

    #[test]
    fn test_flags_beat_environment() {
        let env = env_from(&[("GUARDPANEL_ABI", "env.json")]);
        let mut config = load_config_with_env(None, env).expect("loads");

        ConfigOverrides::new()
            .with_abi("cli.json")
            .with_contract("0x2222222222222222222222222222222222222222")
            .apply(&mut config)
            .expect("valid overrides");

        assert_eq!(config.contract.abi, "cli.json");
        assert_eq!(config.contract.address, Address::repeat_byte(0x22));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_no_flags_leaves_source_alone() {
        let mut config = PanelConfig::default();
        ConfigOverrides::new().apply(&mut config).expect("no-op");
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let config = ProviderConfig {
            receipt_poll_interval_ms: 0,
            ..ProviderConfig::default()
        };
        assert_eq!(config.receipt_poll_interval(), Duration::from_millis(1));
    }
}
