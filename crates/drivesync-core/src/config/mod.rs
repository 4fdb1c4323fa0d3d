//! Sync configuration.
//!
//! A JSON file names the OAuth files, the requested scopes and the list of
//! (pattern, container) targets. It is validated and normalized once on
//! load; the resulting [`SyncConfig`] is immutable and handed to the driver.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::DRIVE_FILE_SCOPE;
use crate::models::{ContainerId, SyncTarget};
use crate::sync::TieBreak;
use crate::util::{normalize_text_option, resolve_against};
use crate::{resolve, Error, Result};

const CONFIG_DIR_NAME: &str = "drivesync";
const CONFIG_FILE_NAME: &str = "config.json";
const SUPPORTED_VERSION: u32 = 1;
const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
const DEFAULT_TOKEN_FILE: &str = "token.json";

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV_VAR: &str = "DRIVESYNC_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncConfig {
    pub version: u32,
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
    pub scopes: Vec<String>,
    pub tie_break: TieBreak,
    pub stop_on_error: bool,
    pub targets: Vec<SyncTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_config_version")]
    version: u32,
    #[serde(default)]
    credentials_path: Option<String>,
    #[serde(default)]
    token_path: Option<String>,
    #[serde(default)]
    scopes: Vec<String>,
    #[serde(default)]
    tie_break: TieBreak,
    #[serde(default)]
    stop_on_error: bool,
    #[serde(default)]
    targets: Option<Vec<RawTarget>>,
    #[serde(default)]
    files: Option<Vec<String>>,
    #[serde(default)]
    directories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    pattern: String,
    container: String,
}

const fn default_config_version() -> u32 {
    SUPPORTED_VERSION
}

/// `<config_dir>/drivesync/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Pick the config file: explicit flag, then `DRIVESYNC_CONFIG`, then the
/// platform default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_config_path_with(explicit, std::env::var(CONFIG_ENV_VAR).ok())
}

fn resolve_config_path_with(explicit: Option<&Path>, env_value: Option<String>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = normalize_text_option(env_value) {
        return Ok(PathBuf::from(value));
    }
    default_config_path().ok_or_else(|| {
        Error::Config(format!(
            "could not determine a config directory; pass --config or set {CONFIG_ENV_VAR}"
        ))
    })
}

impl SyncConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            Error::Config(format!(
                "Failed to read config at {}: {}",
                path.display(),
                error
            ))
        })?;
        Self::from_json(&raw, path.parent()).map_err(|error| match error {
            Error::Config(message) => {
                Error::Config(format!("{} ({})", message, path.display()))
            }
            other => other,
        })
    }

    /// Parse and validate a config document. Relative file paths are
    /// resolved against `base_dir`.
    pub fn from_json(raw: &str, base_dir: Option<&Path>) -> Result<Self> {
        let parsed: RawConfig = serde_json::from_str(raw)
            .map_err(|error| Error::Config(format!("Failed to parse config: {error}")))?;
        parsed.normalize(base_dir)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl RawConfig {
    fn normalize(self, base_dir: Option<&Path>) -> Result<SyncConfig> {
        if self.version != SUPPORTED_VERSION {
            return Err(Error::Config(format!(
                "unsupported config version {} (expected {})",
                self.version, SUPPORTED_VERSION
            )));
        }

        let targets = collect_targets(self.targets, self.files, self.directories)?;
        if targets.is_empty() {
            return Err(Error::Config("no sync targets configured".to_string()));
        }
        for target in &targets {
            resolve::validate(&target.pattern)?;
        }

        let credentials_path = normalize_text_option(self.credentials_path)
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string());
        let token_path = normalize_text_option(self.token_path)
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string());

        let mut seen = HashSet::new();
        let mut scopes: Vec<String> = self
            .scopes
            .into_iter()
            .filter_map(|scope| normalize_text_option(Some(scope)))
            .filter(|scope| seen.insert(scope.clone()))
            .collect();
        if scopes.is_empty() {
            scopes.push(DRIVE_FILE_SCOPE.to_string());
        }

        Ok(SyncConfig {
            version: self.version,
            credentials_path: resolve_against(base_dir, &credentials_path),
            token_path: resolve_against(base_dir, &token_path),
            scopes,
            tie_break: self.tie_break,
            stop_on_error: self.stop_on_error,
            targets,
        })
    }
}

fn collect_targets(
    targets: Option<Vec<RawTarget>>,
    files: Option<Vec<String>>,
    directories: Option<Vec<String>>,
) -> Result<Vec<SyncTarget>> {
    match (targets, files, directories) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(Error::Config(
            "use either `targets` or `files`/`directories`, not both".to_string(),
        )),
        (Some(targets), None, None) => targets
            .into_iter()
            .enumerate()
            .map(|(index, target)| build_target(index, target.pattern, target.container))
            .collect(),
        (None, files, directories) => {
            let files = files.unwrap_or_default();
            let directories = directories.unwrap_or_default();
            if files.len() != directories.len() {
                return Err(Error::Config(format!(
                    "`files` has {} entries but `directories` has {}",
                    files.len(),
                    directories.len()
                )));
            }
            files
                .into_iter()
                .zip(directories)
                .enumerate()
                .map(|(index, (pattern, container))| build_target(index, pattern, container))
                .collect()
        }
    }
}

fn build_target(index: usize, pattern: String, container: String) -> Result<SyncTarget> {
    let container = ContainerId::new(container).map_err(|error| with_target_index(index, error))?;
    SyncTarget::new(pattern, container).map_err(|error| with_target_index(index, error))
}

fn with_target_index(index: usize, error: Error) -> Error {
    match error {
        Error::Config(message) => Error::Config(format!("target #{}: {message}", index + 1)),
        other => other,
    }
}
