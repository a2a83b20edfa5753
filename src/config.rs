use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::cache::ResponseCache;
use crate::error::{Error, Result};
use crate::yt::client::BASE_URL;

pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const API_KEY_FILE: &str = "YT_API_private";
const FALLBACK_CACHE_DIR: &str = "request_json_dump";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    #[default]
    Disabled,
    Memory,
    Directory,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache: CacheMode,
    pub cache_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: BASE_URL.to_owned(),
            timeout_secs: 30,
            cache: CacheMode::default(),
            cache_dir: None,
        }
    }
}

impl Settings {
    /// Reads `settings.json` from the config dir. A missing or unparsable file
    /// yields defaults. The API key is then resolved from the environment or
    /// the key file when the settings carry none.
    pub fn load_or_default() -> Self {
        let mut settings = match settings_path() {
            Some(path) => match fs::read(&path) {
                Ok(bytes) => serde_json::from_slice::<Settings>(&bytes).unwrap_or_else(|err| {
                    tracing::warn!(path = %path.display(), %err, "ignoring unparsable settings");
                    Settings::default()
                }),
                Err(_) => Settings::default(),
            },
            None => Settings::default(),
        };
        settings.resolve_api_key();
        settings
    }

    pub fn save(&self) -> Result<()> {
        let path = settings_path()
            .ok_or_else(|| Error::Config("no home directory to store settings in".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let write_failed =
            |err: std::io::Error| Error::Config(format!("writing {}: {err}", path.display()));
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_failed)?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|err| Error::Config(err.to_string()))?;
        fs::write(path, json).map_err(write_failed)
    }

    /// Fills an empty `api_key` from `YOUTUBE_API_KEY`, then from a
    /// `YT_API_private` file in the working directory.
    pub fn resolve_api_key(&mut self) {
        if !self.api_key.trim().is_empty() {
            return;
        }
        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = key.trim().to_owned();
                return;
            }
        }
        if let Ok(contents) = fs::read_to_string(API_KEY_FILE) {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                self.api_key = trimmed.to_owned();
            }
        }
    }

    pub fn api_key(&self) -> Result<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(Error::Config(format!(
                "no API key: set it in settings, {API_KEY_ENV}, or a {API_KEY_FILE} file"
            )));
        }
        Ok(key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }

    pub fn response_cache(&self) -> ResponseCache {
        match self.cache {
            CacheMode::Disabled => ResponseCache::Disabled,
            CacheMode::Memory => ResponseCache::memory(),
            CacheMode::Directory => ResponseCache::directory(self.cache_dir()),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "video-finder", "video-finder")
}

pub fn settings_path() -> Option<PathBuf> {
    project_dirs().map(|proj| proj.config_dir().join("settings.json"))
}

pub fn default_cache_dir() -> PathBuf {
    project_dirs()
        .map(|proj| proj.cache_dir().join("responses"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}
