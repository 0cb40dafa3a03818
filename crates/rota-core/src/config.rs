use crate::geometry::{CanvasSize, MARGIN, MIN_RADIUS_BUDGET};
use crate::layer;
use crate::spin::SpinTuning;
use crate::store::StorageKey;
use crate::wheel::{DEFAULT_LAYERS, DEFAULT_SECTORS, WheelSettings};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WheelConfig {
    pub key: StorageKey,
    #[serde(default = "default_layers")]
    pub default_layers: Vec<usize>,
}

fn default_layers() -> Vec<usize> {
    DEFAULT_LAYERS.to_vec()
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            key: StorageKey::default(),
            default_layers: default_layers(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasSize,
    pub new_layer_sectors: usize,
    pub wheels: Vec<WheelConfig>,
    pub spin: SpinTuning,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            new_layer_sectors: DEFAULT_SECTORS,
            wheels: vec![WheelConfig::default()],
            spin: SpinTuning::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.canvas.fits_rings() {
            return Err(ConfigError::Invalid(format!(
                "canvas {} is too small, the smaller side must be at least {}",
                self.canvas,
                2.0 * (MARGIN + MIN_RADIUS_BUDGET)
            )));
        }
        if self.wheels.is_empty() {
            return Err(ConfigError::Invalid("at least one wheel is required".into()));
        }
        let mut keys = HashSet::new();
        for wheel in &self.wheels {
            if !keys.insert(wheel.key.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate wheel key '{}'", wheel.key)));
            }
            if let Some(bad) = wheel
                .default_layers
                .iter()
                .find(|&&n| !layer::sector_count_in_range(n))
            {
                return Err(ConfigError::Invalid(format!(
                    "wheel '{}' has a default layer with {} sectors",
                    wheel.key, bad
                )));
            }
        }
        if !layer::sector_count_in_range(self.new_layer_sectors) {
            return Err(ConfigError::Invalid(format!(
                "new_layer_sectors must be between 2 and 24, got {}",
                self.new_layer_sectors
            )));
        }
        if self.spin.min_turns > self.spin.max_turns {
            return Err(ConfigError::Invalid(
                "spin.min_turns is larger than spin.max_turns".into(),
            ));
        }
        Ok(())
    }

    pub fn wheel_settings(&self) -> Vec<WheelSettings> {
        self.wheels
            .iter()
            .map(|w| WheelSettings {
                key: w.key.clone(),
                canvas: self.canvas,
                default_layers: w.default_layers.clone(),
                new_layer_sectors: self.new_layer_sectors,
                spin: self.spin.clone(),
            })
            .collect()
    }

    /// Settings of the wheel stored under `key`, or the first wheel.
    pub fn settings_for(&self, key: Option<&StorageKey>) -> WheelSettings {
        let all = self.wheel_settings();
        key.and_then(|k| all.iter().find(|s| &s.key == k).cloned())
            .or_else(|| all.into_iter().next())
            .unwrap_or_default()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "rota", "rota").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Config, ConfigError> {
    let s = builder
        .add_source(
            config::Environment::with_prefix("ROTA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let config: Config = s.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;
    build(config::Config::builder().add_source(config::File::from(config_path).required(false)))
}

/// Parses a TOML document the same way the config file is read.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    build(
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
    )
}

pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Using default configuration: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
