use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::countdown::ExpiryRule;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// quiz file used when none is given on the command line
    #[serde(default)]
    pub quiz_path: Option<PathBuf>,
    #[serde(default)]
    pub expiry: ExpiryRule,
}

/// Effective settings after command line flags are layered over [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub quiz_path: Option<PathBuf>,
    pub expiry: ExpiryRule,
}

impl Settings {
    pub fn resolve(cfg: &Config, quiz_path: Option<PathBuf>, expiry: Option<ExpiryRule>) -> Self {
        Self {
            quiz_path: quiz_path.or_else(|| cfg.quiz_path.clone()),
            expiry: expiry.unwrap_or(cfg.expiry),
        }
    }
}

impl From<&Settings> for Config {
    fn from(s: &Settings) -> Self {
        Self {
            quiz_path: s.quiz_path.clone(),
            expiry: s.expiry,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "quizr") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("quizr_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
