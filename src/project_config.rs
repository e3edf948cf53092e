//! # Project Configuration (firmrules.yml)
//!
//! Optional YAML file that pins store locations for a rule base, so the
//! server can be pointed at a directory without repeating CLI flags.

use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAMES: [&str; 2] = ["firmrules.yml", "firmrules.yaml"];

/// Contents of firmrules.yml. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Directory the store files live in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabular_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_log_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_capacity: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resync_on_start: Option<bool>,
}

impl ProjectConfig {
    /// Load configuration from a firmrules.yml file
    pub fn from_file(path: &Path) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Internal(format!("Failed to read {}: {e}", path.display())))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ServiceError> {
        serde_yaml::from_str(yaml).map_err(ServiceError::from)
    }

    /// Find firmrules.yml by traversing up the directory tree
    pub fn discover(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ServiceError> {
        let mut current = start_dir;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    let mut config = Self::from_file(&config_path)?;
                    config.resolve_paths(current);
                    return Ok(Some((config_path, config)));
                }
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(None)
    }

    /// Resolve a relative data directory against the config file location.
    /// Store file names stay relative to the data directory.
    pub fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(dir) = self.data_dir.take() {
            self.data_dir = Some(if dir.is_relative() {
                config_dir.join(dir)
            } else {
                dir
            });
        }
    }
}
