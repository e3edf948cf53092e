//! # Document Store
//!
//! The state-grouped JSON form of the rule base:
//!
//! ```json
//! {"rules": {"CA": [{"action": "1001", "condition": {"case_type": "Auto", "case_rating": "1-3", "case_state": "CA"}}]}}
//! ```
//!
//! State keys keep the order in which they appear in the file, so the index is
//! a list of `(state, entries)` pairs with its own serde impls rather than a
//! hash map.

use super::types::{Rule, RuleEntry};
use crate::errors::ServiceError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered mapping from case state to that state's rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleIndex {
    states: Vec<(String, Vec<RuleEntry>)>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` under `state`, creating the state at the end if new.
    pub fn push(&mut self, state: &str, entry: RuleEntry) {
        match self.states.iter_mut().find(|(s, _)| s == state) {
            Some((_, entries)) => entries.push(entry),
            None => self.states.push((state.to_string(), vec![entry])),
        }
    }

    /// Append a rule under its own `case_state`.
    pub fn push_rule(&mut self, rule: &Rule) {
        self.push(&rule.case_state, RuleEntry::from(rule));
    }

    pub fn get(&self, state: &str) -> Option<&[RuleEntry]> {
        self.states
            .iter()
            .find(|(s, _)| s == state)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|(s, _)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleEntry])> {
        self.states
            .iter()
            .map(|(s, entries)| (s.as_str(), entries.as_slice()))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn rule_count(&self) -> usize {
        self.states.iter().map(|(_, entries)| entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Serialize for RuleIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.states.len()))?;
        for (state, entries) in &self.states {
            map.serialize_entry(state, entries)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IndexVisitor;

        impl<'de> Visitor<'de> for IndexVisitor {
            type Value = RuleIndex;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from case state to a list of rules")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RuleIndex, A::Error> {
                let mut index = RuleIndex::new();
                while let Some((state, entries)) =
                    access.next_entry::<String, Vec<RuleEntry>>()?
                {
                    for entry in entries {
                        index.push(&state, entry);
                    }
                }
                Ok(index)
            }
        }

        deserializer.deserialize_map(IndexVisitor)
    }
}

/// On-disk document: the index wrapped in a top-level `rules` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub rules: RuleIndex,
}

impl RuleDocument {
    pub fn new(rules: RuleIndex) -> Self {
        Self { rules }
    }

    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(json).map_err(ServiceError::from)
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json(&self) -> Result<String, ServiceError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

/// File holding the [`RuleDocument`].
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<RuleDocument, ServiceError> {
        if !self.path.exists() {
            return Err(ServiceError::FileNotFound(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path)?;
        let document = RuleDocument::from_json(&content)?;
        debug!(
            path = %self.path.display(),
            states = document.rules.state_count(),
            rules = document.rules.rule_count(),
            "loaded rule document"
        );
        Ok(document)
    }

    /// Replace the whole document.
    pub fn write(&self, document: &RuleDocument) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = File::create(&self.path)?;
        file.write_all(document.to_json()?.as_bytes())?;
        Ok(())
    }

    /// Append one rule under its state: read, mutate, rewind, rewrite, truncate.
    pub fn append_rule(&self, rule: &Rule) -> Result<(), ServiceError> {
        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let mut document: RuleDocument = serde_json::from_reader(&mut file)?;
        document.rules.push_rule(rule);

        let json = document.to_json()?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(json.as_bytes())?;
        let end = file.stream_position()?;
        file.set_len(end)?;
        Ok(())
    }
}
