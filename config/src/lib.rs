//! Configuration loading, parsing, and persistence for Venire.
//!
//! ```toml
//! [case]
//! name = "Rivera v. Coastal Freight"
//! venue = "Dept. 12"
//!
//! [grid]
//! columns = 7
//! rows = 5
//! start_corner = "bottom-left"
//!
//! [strikes]
//! plaintiff_peremptory = 6
//! defense_peremptory = 6
//!
//! [seating]
//! jury_size = 12
//! alternates = 2
//!
//! [suggest]
//! api_key = "${OPENAI_API_KEY}"
//! model = "gpt-4o-mini"
//! debounce_ms = 600
//!
//! [storage]
//! data_dir = "~/.venire"
//! ```
//!
//! Every section is optional. [`VenireConfig`] mirrors the file with `Option`
//! fields; [`VenireConfig::resolve`] turns it into validated [`Settings`].

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

use venire_types::{
    ApiKey, GridError, GridLayout, SeatingLimits, SettingsError, StartCorner, StrikeAllowance,
    SuggestSettings,
};
use venire_utils::AtomicWriteOptions;

/// Overrides `~/.venire` as the home for config, snapshots and logs.
pub const HOME_ENV_VAR: &str = "VENIRE_HOME";
/// Used when `[suggest] api_key` is absent.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Default, Deserialize)]
pub struct VenireConfig {
    pub case: Option<CaseConfig>,
    pub grid: Option<GridConfig>,
    pub strikes: Option<StrikesConfig>,
    pub seating: Option<SeatingConfig>,
    pub suggest: Option<SuggestConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to write config at {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("could not determine config path")]
    NoConfigPath,
    #[error("invalid [grid] section: {0}")]
    Grid(#[from] GridError),
    #[error(
        "unknown start_corner {0:?} (expected top-left, top-right, bottom-left or bottom-right)"
    )]
    UnknownCorner(String),
    #[error("invalid setting: {0}")]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Default, Deserialize)]
pub struct CaseConfig {
    pub name: Option<String>,
    pub venue: Option<String>,
}

/// Grid shape. Written back by [`VenireConfig::persist_grid`].
#[derive(Debug, Default, Deserialize)]
pub struct GridConfig {
    pub columns: Option<u32>,
    pub rows: Option<u32>,
    pub start_corner: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StrikesConfig {
    pub plaintiff_peremptory: Option<u32>,
    pub defense_peremptory: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeatingConfig {
    pub jury_size: Option<u32>,
    pub alternates: Option<u32>,
}

#[derive(Default, Deserialize)]
pub struct SuggestConfig {
    /// Literal key or `${ENV_VAR}` reference.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub debounce_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for SuggestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestConfig")
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("debounce_ms", &self.debounce_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseInfo {
    pub name: String,
    pub venue: String,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub case: CaseInfo,
    pub grid: GridLayout,
    pub strikes: StrikeAllowance,
    pub seating: SeatingLimits,
    pub suggest: SuggestSettings,
    pub data_dir: PathBuf,
}

impl Settings {
    /// Where the workspace snapshot lives.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("workspace.json")
    }
}

impl VenireConfig {
    /// Load from the default path. `Ok(None)` means no config file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match venire_utils::read_recovering(path) {
            Ok(Some(content)) => content,
            Ok(None) => return Ok(None),
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let case = self
            .case
            .as_ref()
            .map(|case| CaseInfo {
                name: case.name.clone().unwrap_or_default(),
                venue: case.venue.clone().unwrap_or_default(),
            })
            .unwrap_or_default();

        let grid = resolve_grid(self.grid.as_ref())?;

        let strikes = match &self.strikes {
            Some(strikes) => StrikeAllowance::new(
                strikes
                    .plaintiff_peremptory
                    .unwrap_or(StrikeAllowance::DEFAULT_PEREMPTORY),
                strikes
                    .defense_peremptory
                    .unwrap_or(StrikeAllowance::DEFAULT_PEREMPTORY),
            )?,
            None => StrikeAllowance::default(),
        };

        let seating = match &self.seating {
            Some(seating) => {
                let defaults = SeatingLimits::default();
                SeatingLimits::new(
                    seating.jury_size.unwrap_or(defaults.jury_size()),
                    seating.alternates.unwrap_or(defaults.alternates()),
                )?
            }
            None => SeatingLimits::default(),
        };

        let suggest = resolve_suggest(self.suggest.as_ref());

        let data_dir = self
            .storage
            .as_ref()
            .and_then(|storage| storage.data_dir.as_deref())
            .map(|raw| expand_home(&expand_env_vars(raw)))
            .or_else(venire_home)
            .unwrap_or_else(|| PathBuf::from(".venire"));

        Ok(Settings {
            case,
            grid,
            strikes,
            seating,
            suggest,
            data_dir,
        })
    }

    /// Persist the grid shape to the config file at `path`.
    ///
    /// Uses `toml_edit` to preserve comments and formatting. Creates the file
    /// if it doesn't exist.
    pub fn persist_grid(path: &Path, layout: GridLayout) -> Result<(), ConfigError> {
        let write_err = |source: io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        let content = venire_utils::read_recovering(path)
            .map_err(write_err)?
            .unwrap_or_default();

        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        if !doc.contains_key("grid") {
            doc["grid"] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        doc["grid"]["columns"] = toml_edit::value(i64::from(layout.columns()));
        doc["grid"]["rows"] = toml_edit::value(i64::from(layout.rows()));
        doc["grid"]["start_corner"] = toml_edit::value(layout.start_corner().as_str());

        venire_utils::atomic_write_with_options(
            path,
            doc.to_string().as_bytes(),
            AtomicWriteOptions {
                sync_all: true,
                dir_sync: true,
                unix_mode: Some(0o600),
            },
        )
        .map_err(write_err)?;

        tracing::debug!(
            path = %path.display(),
            columns = layout.columns(),
            rows = layout.rows(),
            corner = layout.start_corner().as_str(),
            "Persisted grid layout"
        );
        Ok(())
    }
}

fn resolve_grid(grid: Option<&GridConfig>) -> Result<GridLayout, ConfigError> {
    let defaults = GridLayout::default();
    let Some(grid) = grid else {
        return Ok(defaults);
    };
    let corner = match grid.start_corner.as_deref() {
        Some(raw) => {
            StartCorner::parse(raw).ok_or_else(|| ConfigError::UnknownCorner(raw.to_string()))?
        }
        None => defaults.start_corner(),
    };
    Ok(GridLayout::new(
        grid.columns.unwrap_or(defaults.columns()),
        grid.rows.unwrap_or(defaults.rows()),
        corner,
    )?)
}

fn resolve_suggest(suggest: Option<&SuggestConfig>) -> SuggestSettings {
    let defaults = SuggestSettings::default();
    let configured_key = suggest
        .and_then(|s| s.api_key.as_deref())
        .map(expand_env_vars)
        .and_then(ApiKey::new);
    let api_key =
        configured_key.or_else(|| env::var(API_KEY_ENV_VAR).ok().and_then(ApiKey::new));

    let Some(suggest) = suggest else {
        return SuggestSettings {
            api_key,
            ..defaults
        };
    };

    SuggestSettings {
        api_key,
        model: suggest
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(defaults.model),
        base_url: suggest
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url),
        debounce: suggest
            .debounce_ms
            .map_or(defaults.debounce, Duration::from_millis),
        timeout: suggest
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map_or(defaults.timeout, Duration::from_secs),
    }
}

/// Replace `${VAR}` references with environment values (missing -> empty).
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + end_rel];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + end_rel + 1..];
    }

    out.push_str(rest);
    out
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

/// `$VENIRE_HOME`, else `~/.venire`.
#[must_use]
pub fn venire_home() -> Option<PathBuf> {
    if let Ok(home) = env::var(HOME_ENV_VAR)
        && !home.trim().is_empty()
    {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|home| home.join(".venire"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    venire_home().map(|home| home.join("config.toml"))
}

/// Ensure the data directory exists, tightening permissions on Unix.
pub fn ensure_data_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(dir)?.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }
    }
    Ok(())
}
