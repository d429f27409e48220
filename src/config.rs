// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Application configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `EXPENSEWISE_*` environment variables. CLI flags are applied on top by the
//! caller.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::{LedgerError, LedgerResult};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Expensewise", "expensewise"));

pub const DEFAULT_CONFIG_PATH: &str = "expensewise.toml";
pub const DEFAULT_EXCHANGE_RATE_URL: &str = "https://v6.exchangerate-api.com/v6";
pub const DEFAULT_USER: &str = "dev-user";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the database and attachment files
    pub data_dir: Option<PathBuf>,
    pub exchange_rate_url: String,
    /// `tracing` filter directive, e.g. `info` or `expensewise=debug`
    pub log_level: String,
    pub user: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            exchange_rate_url: DEFAULT_EXCHANGE_RATE_URL.to_string(),
            log_level: "warn".to_string(),
            user: DEFAULT_USER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> LedgerResult<Self> {
        let file = path
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&file).required(path.is_some()))
            .add_source(config::Environment::with_prefix("EXPENSEWISE"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Resolved data directory, falling back to the platform data dir.
    pub fn data_dir(&self) -> LedgerResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let proj = ProjectDirs::from(APP.0, APP.1, APP.2).ok_or_else(|| {
            LedgerError::Config("could not determine platform-specific data dir".into())
        })?;
        Ok(proj.data_dir().to_path_buf())
    }

    pub fn db_path(&self) -> LedgerResult<PathBuf> {
        Ok(self.data_dir()?.join("expensewise.sqlite"))
    }

    pub fn attachments_dir(&self) -> LedgerResult<PathBuf> {
        Ok(self.data_dir()?.join("attachments"))
    }
}
