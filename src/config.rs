use std::{
    fmt::Debug,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use fs_err::File;
use log::info;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{
    fs_json_util::write_json_pretty,
    schema::UserId,
    setting::{SettingError, SettingKey, SettingValue, DEFAULT_AUTOCORRECT_CONFIDENCE},
};

#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    derive_more::From,
    derive_more::Into,
    derive_more::Display,
    Serialize,
    Deserialize,
)]
pub struct ClientId(u64);

#[derive(Clone, PartialEq, Eq, derive_more::From, Serialize, Deserialize)]
pub struct ClientSecret(String);
impl ClientSecret {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientSecret([redacted])")
    }
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct Credentials {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
}

/// Persisted settings. Unset values fall back to their defaults on read.
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<ClientSecret>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocorrect_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<UserId>,
}

impl Config {
    /// The stored value, without falling back to the default.
    pub fn get(&self, key: SettingKey) -> Option<SettingValue> {
        match key {
            SettingKey::ClientId => self.client_id.map(|x| SettingValue::Integer(x.into())),
            SettingKey::ClientSecret => self
                .client_secret
                .as_ref()
                .map(|x| SettingValue::Text(x.as_str().to_owned())),
            SettingKey::AutocorrectConfidence => {
                self.autocorrect_confidence.map(SettingValue::Decimal)
            }
            SettingKey::ProfileId => self.profile_id.map(|x| SettingValue::Integer(x.into())),
        }
    }

    pub fn get_or_default(&self, key: SettingKey) -> Option<SettingValue> {
        self.get(key).or_else(|| key.default_value())
    }

    /// Parses `raw` with the type of `key` and stores it.
    pub fn set(&mut self, key: SettingKey, raw: &str) -> Result<SettingValue, SettingError> {
        let value = key.parse_value(raw)?;
        match (key, &value) {
            (SettingKey::ClientId, &SettingValue::Integer(x)) => self.client_id = Some(x.into()),
            (SettingKey::ProfileId, &SettingValue::Integer(x)) => self.profile_id = Some(x.into()),
            (SettingKey::AutocorrectConfidence, &SettingValue::Decimal(x)) => {
                self.autocorrect_confidence = Some(x)
            }
            (SettingKey::ClientSecret, SettingValue::Text(x)) => {
                self.client_secret = Some(x.clone().into())
            }
            _ => unreachable!("{key} was parsed into {value:?}"),
        }
        Ok(value)
    }

    pub fn clear(&mut self, key: SettingKey) {
        match key {
            SettingKey::ClientId => self.client_id = None,
            SettingKey::ClientSecret => self.client_secret = None,
            SettingKey::AutocorrectConfidence => self.autocorrect_confidence = None,
            SettingKey::ProfileId => self.profile_id = None,
        }
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn autocorrect_confidence(&self) -> f64 {
        self.autocorrect_confidence
            .unwrap_or(DEFAULT_AUTOCORRECT_CONFIDENCE)
    }
}

/// A [`Config`] together with the file it is persisted to.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    pub fn default_path() -> anyhow::Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("snipe-yourself").join("config.json"))
            .ok_or_else(|| anyhow!("Could not determine the config directory"))
    }

    /// Loads the store, starting from an empty config if the file does not exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigLoadError> {
        let path = path.into();
        let config = match File::open(&path) {
            Ok(file) => {
                let config = serde_json::from_reader(BufReader::new(file))?;
                info!("Loaded the config from {path:?}.");
                config
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("The config was not found at {path:?}.  Starting from an empty one.");
                Config::default()
            }
            Err(e) => return Err(ConfigLoadError::IOError(e)),
        };
        Ok(Self { path, config })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }
        write_json_pretty(&self.path, &self.config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("An I/O error occurred when loading the config: {0}")]
    IOError(io::Error),
    #[error("The config file is corrupted and could not be loaded: {0}")]
    JsonError(#[from] serde_json::Error),
}
