use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context;
use log::{debug, error, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub const THUMB_NEVER_TOGGLES: &str = "app.thumb_never_toggles";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

/// Key-value store holding the user's preferences.
pub trait ConfigStore {
    /// The stored value, falling back to the registered default.
    fn get_value(
        &self,
        key: &str,
    ) -> impl Future<Output = anyhow::Result<Option<ConfigValue>>> + Send;

    /// Registers a default without touching a value that is already stored.
    fn set_default(
        &self,
        key: &str,
        value: ConfigValue,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn set_value(
        &self,
        key: &str,
        value: ConfigValue,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Stores values in a TOML file; defaults only live in memory.
#[derive(Debug, Default)]
pub struct TomlStore {
    path: Option<PathBuf>,
    defaults: Mutex<HashMap<String, ConfigValue>>,
    values: Mutex<BTreeMap<String, ConfigValue>>,
}

impl TomlStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => toml::from_str(&contents).with_context(|| {
                format!("Failed to parse preferences file {}", path.display())
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Preferences file {} does not exist yet; starting empty",
                    path.display()
                );
                BTreeMap::new()
            }
            Err(err) => {
                return Err(anyhow::Error::from(err).context(format!(
                    "Failed to read preferences file {}",
                    path.display()
                )))
            }
        };
        Ok(Self {
            path: Some(path),
            defaults: Mutex::default(),
            values: Mutex::new(values),
        })
    }
}

impl ConfigStore for TomlStore {
    async fn get_value(&self, key: &str) -> anyhow::Result<Option<ConfigValue>> {
        if let Some(value) = self.values.lock().get(key) {
            return Ok(Some(value.clone()));
        }
        Ok(self.defaults.lock().get(key).cloned())
    }

    async fn set_default(&self, key: &str, value: ConfigValue) -> anyhow::Result<()> {
        self.defaults.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn set_value(&self, key: &str, value: ConfigValue) -> anyhow::Result<()> {
        let serialized = {
            let mut values = self.values.lock();
            values.insert(key.to_string(), value);
            toml::to_string(&*values).context("Failed to serialize preferences")?
        };
        if let Some(path) = &self.path {
            tokio::fs::write(path, serialized)
                .await
                .with_context(|| format!("Failed to write preferences file {}", path.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum FormEntry {
    #[serde(rename = "header")]
    Header { label: String },

    #[serde(rename = "bool")]
    Bool { key: String, label: String },
}

/// Caches the thumbs policy so it can be read synchronously during poll cycles.
pub struct PreferenceBridge<S> {
    store: Arc<S>,
    thumb_never_toggles: bool,
}

impl<S: ConfigStore> PreferenceBridge<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            thumb_never_toggles: false,
        }
    }

    pub fn thumb_never_toggles(&self) -> bool {
        self.thumb_never_toggles
    }

    pub async fn load(&mut self) {
        if let Err(err) = self
            .store
            .set_default(THUMB_NEVER_TOGGLES, ConfigValue::Bool(false))
            .await
        {
            error!("Failed to register default for {THUMB_NEVER_TOGGLES}: {err:?}");
        }
        self.refresh().await;
    }

    pub async fn on_config_changed(&mut self, key: &str) {
        if key != THUMB_NEVER_TOGGLES {
            return;
        }
        self.refresh().await;
    }

    pub fn append_form(
        &self,
        values: &mut HashMap<String, ConfigValue>,
        entries: &mut Vec<FormEntry>,
    ) {
        values.insert(
            THUMB_NEVER_TOGGLES.to_string(),
            ConfigValue::Bool(self.thumb_never_toggles),
        );
        entries.push(FormEntry::Header {
            label: "Thumbs up/down".to_string(),
        });
        entries.push(FormEntry::Bool {
            key: THUMB_NEVER_TOGGLES.to_string(),
            label: "Never untoggle a thumb that is already pressed".to_string(),
        });
    }

    async fn refresh(&mut self) {
        match self.store.get_value(THUMB_NEVER_TOGGLES).await {
            Ok(Some(value)) => match value.as_bool() {
                Some(value) => {
                    debug!("{THUMB_NEVER_TOGGLES} = {value}");
                    self.thumb_never_toggles = value;
                }
                None => error!("Ignoring non-boolean value {value:?} for {THUMB_NEVER_TOGGLES}"),
            },
            Ok(None) => {}
            Err(err) => error!("Failed to load {THUMB_NEVER_TOGGLES}: {err:?}"),
        }
    }
}
