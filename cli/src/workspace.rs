//! The persisted workspace a command operates on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use venire_config::{Settings, VenireConfig};
use venire_core::{Action, JuryState, JuryStore, persistence};
use venire_types::GridLayout;

pub struct Workspace {
    config_path: Option<PathBuf>,
    settings: Settings,
    store: JuryStore,
}

impl Workspace {
    /// Load config and the saved snapshot, seeding a fresh workspace when
    /// nothing has been saved yet.
    pub fn open(config_path: Option<PathBuf>) -> Result<Self> {
        let (config_path, settings) = load_settings(config_path)?;
        let snapshot_path = settings.snapshot_path();
        let state = persistence::load(&snapshot_path, settings.grid, settings.seating)
            .with_context(|| format!("loading workspace from {}", snapshot_path.display()))?
            .unwrap_or_else(|| seed(&settings));

        Ok(Self {
            config_path,
            settings,
            store: JuryStore::new(state),
        })
    }

    /// Write a fresh workspace, refusing to overwrite one unless `force`.
    /// An unreadable snapshot is replaced too when forced.
    pub fn init(config_path: Option<PathBuf>, force: bool) -> Result<Self> {
        let (config_path, settings) = load_settings(config_path)?;
        let path = settings.snapshot_path();
        if path.exists() && !force {
            bail!(
                "workspace already exists at {}; pass --force to start over",
                path.display()
            );
        }
        let workspace = Self {
            config_path,
            store: JuryStore::new(seed(&settings)),
            settings,
        };
        workspace.save(workspace.store.state())?;
        tracing::info!(path = %path.display(), "Initialized workspace");
        Ok(workspace)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &JuryState {
        self.store.state()
    }

    /// Dispatch one action and save the result. Nothing is written when the
    /// action is rejected.
    ///
    /// A changed grid goes to the config file before the snapshot, so a failed
    /// config write leaves the saved jurors untouched.
    pub fn apply(&mut self, action: Action) -> Result<&JuryState> {
        let mut next = self.store.clone();
        next.dispatch(action)?;

        let layout = *next.state().layout();
        if layout != *self.store.state().layout() {
            self.persist_grid(layout)?;
        }
        self.save(next.state())?;
        self.store = next;
        Ok(self.store.state())
    }

    fn save(&self, state: &JuryState) -> Result<()> {
        venire_config::ensure_data_dir(&self.settings.data_dir).with_context(|| {
            format!(
                "creating data directory {}",
                self.settings.data_dir.display()
            )
        })?;
        persistence::save(state, &self.settings.snapshot_path())?;
        Ok(())
    }

    fn persist_grid(&mut self, layout: GridLayout) -> Result<()> {
        let Some(path) = self.config_path.as_deref() else {
            tracing::warn!("No config path available; grid change not persisted");
            return Ok(());
        };
        ensure_parent(path)?;
        VenireConfig::persist_grid(path, layout)?;
        self.settings.grid = layout;
        Ok(())
    }
}

fn load_settings(config_path: Option<PathBuf>) -> Result<(Option<PathBuf>, Settings)> {
    let config_path = config_path.or_else(VenireConfig::path);
    let config = match &config_path {
        Some(path) => VenireConfig::load_from(path)?,
        None => None,
    }
    .unwrap_or_default();
    Ok((config_path, config.resolve()?))
}

fn seed(settings: &Settings) -> JuryState {
    JuryState::seeded(settings.grid, settings.strikes, settings.seating)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}
