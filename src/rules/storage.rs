use super::types::Rule;
use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Column layout used when rewriting the tabular store.
///
/// Rows are always read back by header name, so both layouts load the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrder {
    /// `action,case_rating,case_state,case_type`; used by removal and by regeneration from the document.
    Canonical,
    /// `case_type,action,case_rating,case_state`; used by bulk update.
    TypeFirst,
}

impl ColumnOrder {
    pub fn header(self) -> [&'static str; 4] {
        match self {
            ColumnOrder::Canonical => ["action", "case_rating", "case_state", "case_type"],
            ColumnOrder::TypeFirst => ["case_type", "action", "case_rating", "case_state"],
        }
    }

    fn record(self, rule: &Rule) -> [&str; 4] {
        match self {
            ColumnOrder::Canonical => [
                &rule.action,
                &rule.case_rating,
                &rule.case_state,
                &rule.case_type,
            ],
            ColumnOrder::TypeFirst => [
                &rule.case_type,
                &rule.action,
                &rule.case_rating,
                &rule.case_state,
            ],
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct TabularRow {
    action: String,
    case_rating: String,
    case_state: String,
    case_type: String,
}

impl From<TabularRow> for Rule {
    fn from(row: TabularRow) -> Self {
        Rule {
            action: row.action,
            case_type: row.case_type,
            case_rating: row.case_rating,
            case_state: row.case_state,
        }
    }
}

/// The CSV rule table, one rule per row under a header row.
#[derive(Debug, Clone)]
pub struct TabularStore {
    path: PathBuf,
}

impl TabularStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every decodable row in file order.
    ///
    /// A row that cannot be decoded is logged and skipped; the scan goes on.
    pub fn read_rows(&self) -> Result<Vec<Rule>, ServiceError> {
        if !self.path.exists() {
            return Err(ServiceError::FileNotFound(self.path.clone()));
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let mut rules = Vec::new();
        for (index, row) in reader.deserialize::<TabularRow>().enumerate() {
            match row {
                Ok(row) => rules.push(Rule::from(row)),
                Err(err) => {
                    warn!(path = %self.path.display(), row = index + 1, "skipping malformed rule row: {err}");
                }
            }
        }
        debug!(path = %self.path.display(), rules = rules.len(), "read tabular rules");
        Ok(rules)
    }

    /// Replace the whole table with `rules`, written in `order`.
    pub fn write(&self, rules: &[Rule], order: ColumnOrder) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(order.header())?;
        for rule in rules {
            writer.write_record(order.record(rule))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append one row in canonical column order without touching the header.
    pub fn append(&self, rule: &Rule) -> Result<(), ServiceError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(ColumnOrder::Canonical.record(rule))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<Rule> {
        vec![
            Rule::new("1001", "Auto", "1-3", "CA"),
            Rule::new("Assign handling firm 'Acme, Inc' (east)", "Home", "2", "NY"),
        ]
    }

    #[test]
    fn both_column_orders_read_back_identically() {
        let temp_dir = TempDir::new().unwrap();
        let store = TabularStore::new(temp_dir.path().join("rules.csv"));

        store.write(&sample(), ColumnOrder::Canonical).unwrap();
        let header = fs::read_to_string(store.path()).unwrap();
        assert_eq!(header.lines().next().unwrap(), "action,case_rating,case_state,case_type");
        assert_eq!(store.read_rows().unwrap(), sample());

        store.write(&sample(), ColumnOrder::TypeFirst).unwrap();
        let header = fs::read_to_string(store.path()).unwrap();
        assert_eq!(header.lines().next().unwrap(), "case_type,action,case_rating,case_state");
        assert_eq!(store.read_rows().unwrap(), sample());
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = TabularStore::new(temp_dir.path().join("rules.csv"));
        fs::write(
            store.path(),
            "action,case_rating,case_state,case_type\n1001,1-3,CA,Auto\nbroken,row\n2002,2,NY,Home\n",
        )
        .unwrap();

        let rules = store.read_rows().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].case_state, "NY");
    }

    #[test]
    fn append_adds_row_after_existing_ones() {
        let temp_dir = TempDir::new().unwrap();
        let store = TabularStore::new(temp_dir.path().join("rules.csv"));
        store.write(&sample(), ColumnOrder::Canonical).unwrap();

        store.append(&Rule::new("3003", "Life", "5", "TX")).unwrap();

        let rules = store.read_rows().unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[2], Rule::new("3003", "Life", "5", "TX"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = TabularStore::new(temp_dir.path().join("rules.csv"));
        assert!(store.read_rows().unwrap_err().is_not_found());
    }
}
