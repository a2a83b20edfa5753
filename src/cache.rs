//! Development cache for raw API responses.
//!
//! Every call to the Data API costs quota, so while iterating on a query it is
//! handy to replay earlier responses instead. Entries never expire; clear the
//! cache by hand when fresh data is needed.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha224};

use crate::error::{Error, Result};
use crate::yt::params::Endpoint;
use crate::yt::types::RawResponse;

#[derive(Debug, Clone, Default)]
pub enum ResponseCache {
    #[default]
    Disabled,
    Memory(HashMap<String, RawResponse>),
    /// One JSON file per entry under this directory.
    Directory(PathBuf),
}

/// Canonical key for a request: the endpoint followed by its parameters in
/// sorted order, each name and value percent-encoded. The API key is never
/// part of it.
pub fn cache_key(endpoint: Endpoint, params: &BTreeMap<String, String>) -> String {
    let query: Vec<String> = params
        .iter()
        .filter(|(k, _)| k.as_str() != "key")
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    format!("{}?{}", endpoint.path(), query.join("&"))
}

impl ResponseCache {
    pub fn memory() -> Self {
        ResponseCache::Memory(HashMap::new())
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        ResponseCache::Directory(path.into())
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, ResponseCache::Disabled)
    }

    pub fn get(&self, key: &str) -> Option<RawResponse> {
        match self {
            ResponseCache::Disabled => None,
            ResponseCache::Memory(entries) => entries.get(key).cloned(),
            ResponseCache::Directory(dir) => {
                let path = entry_path(dir, key);
                let bytes = fs::read(&path).ok()?;
                match serde_json::from_slice::<RawResponse>(&bytes) {
                    Ok(resp) => Some(resp),
                    Err(err) => {
                        tracing::warn!(path = %path.display(), %err, "ignoring unreadable cache entry");
                        None
                    }
                }
            }
        }
    }

    pub fn put(&mut self, key: &str, response: &RawResponse) -> Result<()> {
        match self {
            ResponseCache::Disabled => Ok(()),
            ResponseCache::Memory(entries) => {
                entries.insert(key.to_owned(), response.clone());
                Ok(())
            }
            ResponseCache::Directory(dir) => {
                fs::create_dir_all(&*dir).map_err(|source| Error::Cache {
                    path: dir.clone(),
                    source,
                })?;
                let path = entry_path(dir.as_path(), key);
                let json = serde_json::to_vec_pretty(response)
                    .map_err(|err| Error::Mapping(err.to_string()))?;
                fs::write(&path, json).map_err(|source| Error::Cache { path, source })
            }
        }
    }

    /// Drops every entry. For a directory cache only `.json` files are removed.
    pub fn clear(&mut self) -> Result<()> {
        match self {
            ResponseCache::Disabled => Ok(()),
            ResponseCache::Memory(entries) => {
                entries.clear();
                Ok(())
            }
            ResponseCache::Directory(dir) => {
                if !dir.exists() {
                    return Ok(());
                }
                let io_err = |source: std::io::Error| Error::Cache {
                    path: dir.clone(),
                    source,
                };
                for entry in fs::read_dir(&*dir).map_err(&io_err)? {
                    let path = entry.map_err(&io_err)?.path();
                    if path.extension().is_some_and(|ext| ext == "json") {
                        fs::remove_file(&path).map_err(|source| Error::Cache {
                            path: path.clone(),
                            source,
                        })?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn entry_path(dir: &Path, key: &str) -> PathBuf {
    let endpoint = key.split('?').next().unwrap_or("request");
    let digest = Sha224::digest(key.as_bytes());
    dir.join(format!("{endpoint}_{}.json", hex::encode(digest)))
}
