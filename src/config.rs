use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

use crate::{app::Cli, elements::LayoutKind, rating::RatingThresholds};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutKind,
    pub poll_interval_ms: u64,
    pub preferences: Option<PathBuf>,
    pub rating: RatingThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: LayoutKind::default(),
            poll_interval_ms: 500,
            preferences: None,
            rating: RatingThresholds::default(),
        }
    }
}

impl Config {
    pub fn read(file: &mut impl Read) -> anyhow::Result<Self> {
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .context("Failed to read config file")?;

        let config = toml::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn read_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut file = File::open(path).context("Failed to open config file")?;
        Self::read(&mut file)
    }

    pub fn from_cli_args(args: &Cli) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(config_path) => Self::read_path(config_path)?,
            None => {
                let default_config = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_config.exists() {
                    log::info!("Using default config file {DEFAULT_CONFIG_PATH}");
                    Self::read_path(default_config)?
                } else {
                    log::warn!("No config file found; using default config");
                    Config::default()
                }
            }
        };
        if let Some(layout) = args.layout {
            config.layout = layout;
        }
        if let Some(interval_ms) = args.interval_ms {
            config.poll_interval_ms = interval_ms;
        }
        if let Some(preferences) = &args.preferences {
            config.preferences = Some(preferences.clone());
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
