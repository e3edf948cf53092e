use crate::project_config::ProjectConfig;
use std::path::{Path, PathBuf};

pub const DEFAULT_TABULAR_FILE: &str = "rules.csv";
pub const DEFAULT_DOCUMENT_FILE: &str = "firm.json";
pub const DEFAULT_AUDIT_LOG_FILE: &str = "new_rules.txt";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory that relative store paths are resolved against
    pub data_directory: PathBuf,
    /// CSV rule table
    pub tabular_file: PathBuf,
    /// State-grouped JSON rule document
    pub document_file: PathBuf,
    /// Append-only NDJSON log of accepted submissions
    pub audit_log_file: PathBuf,
    /// Maximum number of open edit sessions (default: 64)
    pub session_capacity: usize,
    /// Regenerate the rule table from the document when the server starts
    pub resync_on_start: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            tabular_file: PathBuf::from(DEFAULT_TABULAR_FILE),
            document_file: PathBuf::from(DEFAULT_DOCUMENT_FILE),
            audit_log_file: PathBuf::from(DEFAULT_AUDIT_LOG_FILE),
            session_capacity: 64,
            resync_on_start: false,
        }
    }
}

impl ServiceConfig {
    /// Config with every store under `data_directory` and default file names.
    pub fn in_directory(data_directory: impl Into<PathBuf>) -> Self {
        Self {
            data_directory: data_directory.into(),
            ..Default::default()
        }
    }

    /// Apply values from a project config file; values already set by the
    /// caller afterwards (CLI flags) take precedence.
    pub fn with_project_config(mut self, project: Option<&ProjectConfig>) -> Self {
        let Some(project) = project else {
            return self;
        };
        if let Some(dir) = &project.data_dir {
            self.data_directory = dir.clone();
        }
        if let Some(file) = &project.tabular_file {
            self.tabular_file = file.clone();
        }
        if let Some(file) = &project.document_file {
            self.document_file = file.clone();
        }
        if let Some(file) = &project.audit_log_file {
            self.audit_log_file = file.clone();
        }
        if let Some(capacity) = project.session_capacity {
            self.session_capacity = capacity;
        }
        if let Some(resync) = project.resync_on_start {
            self.resync_on_start = resync;
        }
        self
    }

    pub fn tabular_path(&self) -> PathBuf {
        self.resolve(&self.tabular_file)
    }

    pub fn document_path(&self) -> PathBuf {
        self.resolve(&self.document_file)
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.resolve(&self.audit_log_file)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_directory.join(path)
        }
    }
}

/// `~/.firm-rules`, or the current directory when there is no home.
pub fn default_data_directory() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".firm-rules"))
        .unwrap_or_else(|| PathBuf::from("."))
}
