// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::loader::{CatalogSource, FileCatalogSource, HttpCatalogSource};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "scope_config.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Endpoint serving the FIR catalog document.
    #[serde(default)]
    pub catalog_url: Option<String>,
    /// Local catalog document; takes precedence over `catalog_url`.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            catalog_url: None,
            catalog_path: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Per-user configuration directory.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "fir-scope", "fir-scope")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".fir-scope"))
}

pub fn default_config_path() -> PathBuf {
    get_config_root().join(CONFIG_FILE)
}

impl ScopeConfig {
    /// Reads the config at `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize scope config")?;

        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&default_config_path())
    }

    /// The source the catalog loader should use. `None` when nothing is
    /// configured, in which case international mode is unavailable.
    pub fn catalog_source(&self) -> Option<Box<dyn CatalogSource>> {
        if let Some(path) = &self.catalog_path {
            return Some(Box::new(FileCatalogSource::new(path.clone())));
        }
        self.catalog_url
            .as_ref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                Box::new(HttpCatalogSource::new(
                    url.trim(),
                    Duration::from_secs(self.request_timeout_secs),
                )) as Box<dyn CatalogSource>
            })
    }
}
