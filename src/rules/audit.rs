use super::types::RuleSubmission;
use crate::errors::ServiceError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only NDJSON record of accepted rule submissions. Never read back.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, submission: &RuleSubmission) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut line = serde_json::to_string(submission)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::types::Rule;
    use tempfile::TempDir;

    #[test]
    fn appends_one_json_line_per_submission() {
        let temp_dir = TempDir::new().unwrap();
        let log = AuditLog::new(temp_dir.path().join("audit").join("new_rules.txt"));

        log.append(&Rule::new("1001", "Auto", "1-3", "CA").into())
            .unwrap();
        log.append(&Rule::new("2002", "Home", "2", "NY").into())
            .unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: RuleSubmission = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.case_state, "NY");
    }
}
