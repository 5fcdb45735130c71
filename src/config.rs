/*
 * Quesuene - Configuration Module
 * Version: 1.0
 * Copyright (c) 2025 Peter Leukanič
 * Under MIT License
 * Feel free to share and modify
 *
 * Optional user configuration read from the XDG config directory
 */

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::audio::{AudioError, Pactl};
use crate::idle::IdleTimer;

const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Program and leading arguments used to reach pactl.
    pub pactl_command: Vec<String>,
    pub initial_timeout_ms: u64,
    pub activity_timeout_ms: u64,
    pub slider_width: i32,
    pub max_volume: u32,
    /// Pango font description for stream labels.
    pub font: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            pactl_command: vec!["pactl".to_string()],
            initial_timeout_ms: 3000,
            activity_timeout_ms: 1500,
            slider_width: 180,
            max_volume: 100,
            font: "Sans Serif 11".to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("io.github", "quesuene", "quesuene")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults when no
    /// config file exists.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No home directory, using default configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pactl_command.first().is_none_or(|program| program.is_empty()) {
            bail!("pactl_command cannot be empty");
        }
        if self.initial_timeout_ms == 0 || self.activity_timeout_ms == 0 {
            bail!("Timeouts must be greater than zero");
        }
        if self.slider_width <= 0 {
            bail!("slider_width must be positive, got {}", self.slider_width);
        }
        if self.max_volume == 0 {
            bail!("max_volume must be greater than zero");
        }
        Ok(())
    }

    pub fn idle_timer(&self) -> IdleTimer {
        IdleTimer::new(
            Duration::from_millis(self.initial_timeout_ms),
            Duration::from_millis(self.activity_timeout_ms),
        )
    }

    pub fn pactl(&self) -> Result<Pactl, AudioError> {
        Pactl::new(self.pactl_command.as_slice())
    }
}
