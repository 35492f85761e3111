//! Scanner configuration.
//!
//! Loaded from `~/.gatepass/scanner.toml` (or `GATEPASS_CONFIG`). A missing
//! file yields defaults; a present but invalid file is an error so a typo in
//! a terminator binding never silently turns scanning off.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::accumulator::TerminatorKeys;
use crate::error::{GateError, Result};
use crate::keys::Key;
use crate::timer::DEFAULT_INACTIVITY_WINDOW;

pub const CONFIG_ENV: &str = "GATEPASS_CONFIG";
pub const API_URL_ENV: &str = "GATEPASS_API_URL";
pub const API_TOKEN_ENV: &str = "GATEPASS_API_TOKEN";

const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".gatepass/scanner.toml";
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_DEDUPE_WINDOW_MS: u64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Warden,
    Security,
    Admin,
}

impl Role {
    /// Only gate security staff drive the scanner.
    pub fn is_scanner_operator(&self) -> bool {
        matches!(self, Role::Security)
    }
}

impl FromStr for Role {
    type Err = GateError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "warden" => Ok(Role::Warden),
            "security" => Ok(Role::Security),
            "admin" => Ok(Role::Admin),
            _ => Err(GateError::InvalidRole(value.to_string())),
        }
    }
}

/// On-disk shape. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScannerConfigFile {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    api_token: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    check_in_key: Option<String>,
    #[serde(default)]
    check_out_key: Option<String>,
    #[serde(default)]
    auto_key: Option<String>,
    #[serde(default)]
    inactivity_window_ms: Option<u64>,
    #[serde(default)]
    request_timeout_ms: Option<u64>,
    #[serde(default)]
    dedupe_window_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub role: Role,
    pub terminators: TerminatorKeys,
    pub inactivity_window: Duration,
    /// Zero disables the pipeline-side deadline.
    pub request_timeout: Duration,
    /// Zero disables duplicate suppression.
    pub dedupe_window: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: None,
            role: Role::Security,
            terminators: TerminatorKeys::default(),
            inactivity_window: DEFAULT_INACTIVITY_WINDOW,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            dedupe_window: Duration::from_millis(DEFAULT_DEDUPE_WINDOW_MS),
        }
    }
}

impl ScannerConfig {
    /// Loads from `path`, `GATEPASS_CONFIG`, or the default location, then
    /// applies environment overrides.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from)) {
            Some(path) => path,
            None => default_config_path()?,
        };

        let mut config = Self::load_file(&config_path)?;
        config.apply_overrides(|name| env::var(name).ok());
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No scanner config; using defaults");
            return Ok(Self::default());
        }

        let content =
            fs_err::read_to_string(path).map_err(|source| GateError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content).map_err(|err| match err {
            GateError::ConfigMalformed { details, .. } => GateError::ConfigMalformed {
                path: path.to_path_buf(),
                details,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ScannerConfigFile =
            toml::from_str(content).map_err(|err| GateError::ConfigMalformed {
                path: PathBuf::new(),
                details: err.to_string(),
            })?;
        Self::from_file(file)
    }

    fn from_file(file: ScannerConfigFile) -> Result<Self> {
        let defaults = Self::default();

        let terminators = TerminatorKeys {
            check_in: parse_key(file.check_in_key.as_deref(), defaults.terminators.check_in)?,
            check_out: parse_key(
                file.check_out_key.as_deref(),
                defaults.terminators.check_out,
            )?,
            auto: file.auto_key.as_deref().map(Key::from_str).transpose()?,
        };
        validate_terminators(&terminators)?;

        let role = match file.role.as_deref() {
            Some(value) => value.parse()?,
            None => defaults.role,
        };

        let inactivity_window = file
            .inactivity_window_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.inactivity_window);
        if inactivity_window.is_zero() {
            return Err(GateError::InvalidConfig(
                "inactivity_window_ms must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_base_url: file
                .api_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.api_base_url),
            api_token: file.api_token.filter(|token| !token.trim().is_empty()),
            role,
            terminators,
            inactivity_window,
            request_timeout: file
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            dedupe_window: file
                .dedupe_window_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.dedupe_window),
        })
    }

    /// Applies `GATEPASS_API_URL` / `GATEPASS_API_TOKEN` style overrides.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|token| !token.trim().is_empty()) {
            self.api_token = Some(token);
        }
    }
}

/// Returns the path to the gatepass directory (~/.gatepass).
pub fn gatepass_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".gatepass"))
        .ok_or(GateError::HomeNotFound)
}

fn default_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CONFIG_RELATIVE_PATH))
        .ok_or(GateError::HomeNotFound)
}

fn parse_key(value: Option<&str>, default: Key) -> Result<Key> {
    match value {
        Some(name) => name.parse(),
        None => Ok(default),
    }
}

fn validate_terminators(keys: &TerminatorKeys) -> Result<()> {
    let mut bound = vec![&keys.check_in, &keys.check_out];
    bound.extend(keys.auto.as_ref());

    for (i, key) in bound.iter().enumerate() {
        if key.printable_char().is_some() {
            return Err(GateError::InvalidConfig(format!(
                "terminator {} is a printable character and would appear inside scans",
                key
            )));
        }
        if bound[i + 1..].contains(key) {
            return Err(GateError::InvalidConfig(format!(
                "terminator {} is bound to more than one channel",
                key
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ScannerConfig::from_toml_str("").expect("config");
        assert_eq!(config, ScannerConfig::default());
        assert_eq!(config.terminators.check_in, Key::Enter);
        assert_eq!(config.terminators.check_out, Key::Tab);
        assert_eq!(config.inactivity_window, Duration::from_millis(2000));
    }

    #[test]
    fn reads_all_fields() {
        let config = ScannerConfig::from_toml_str(
            r#"
            api_base_url = "https://hostel.example.edu/api/"
            api_token = "secret"
            role = "warden"
            check_in_key = "F9"
            check_out_key = "F10"
            auto_key = "F11"
            inactivity_window_ms = 1500
            request_timeout_ms = 4000
            dedupe_window_ms = 0
            "#,
        )
        .expect("config");

        assert_eq!(config.api_base_url, "https://hostel.example.edu/api");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.role, Role::Warden);
        assert_eq!(config.terminators.check_in, Key::Function(9));
        assert_eq!(config.terminators.auto, Some(Key::Function(11)));
        assert_eq!(config.inactivity_window, Duration::from_millis(1500));
        assert_eq!(config.request_timeout, Duration::from_millis(4000));
        assert!(config.dedupe_window.is_zero());
    }

    #[test]
    fn rejects_same_key_for_both_channels() {
        let err = ScannerConfig::from_toml_str(
            r#"
            check_in_key = "Enter"
            check_out_key = "Enter"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_printable_terminator() {
        let err = ScannerConfig::from_toml_str(r#"check_in_key = "x""#).unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_unknown_key_and_role() {
        assert!(matches!(
            ScannerConfig::from_toml_str(r#"check_out_key = "Hyper""#).unwrap_err(),
            GateError::InvalidKey(_)
        ));
        assert!(matches!(
            ScannerConfig::from_toml_str(r#"role = "janitor""#).unwrap_err(),
            GateError::InvalidRole(_)
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = ScannerConfig::from_toml_str(r#"check_in = "Enter""#).unwrap_err();
        assert!(matches!(err, GateError::ConfigMalformed { .. }));
    }

    #[test]
    fn rejects_zero_inactivity_window() {
        let err = ScannerConfig::from_toml_str("inactivity_window_ms = 0").unwrap_err();
        assert!(matches!(err, GateError::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = ScannerConfig::load_file(&dir.path().join("absent.toml")).expect("config");
        assert_eq!(config, ScannerConfig::default());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("scanner.toml");
        std::fs::write(&path, "role = [").expect("write config");

        match ScannerConfig::load_file(&path).unwrap_err() {
            GateError::ConfigMalformed { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn env_overrides_win() {
        let mut config = ScannerConfig::default();
        let vars: HashMap<&str, &str> = [
            (API_URL_ENV, "https://gate.example.edu/api/"),
            (API_TOKEN_ENV, "tok"),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|name| vars.get(name).map(|value| value.to_string()));

        assert_eq!(config.api_base_url, "https://gate.example.edu/api");
        assert_eq!(config.api_token.as_deref(), Some("tok"));
    }

    #[test]
    fn only_security_operates_scanner() {
        assert!(Role::Security.is_scanner_operator());
        assert!(!Role::Warden.is_scanner_operator());
        assert!(!Role::Student.is_scanner_operator());
        assert!(!Role::Admin.is_scanner_operator());
    }
}
