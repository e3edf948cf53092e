//! # Rule Service
//!
//! Orchestrates the rule-base operations over the two stores. Every mutating
//! operation ends with exactly one [`RuleService::reconcile`] call, which
//! regenerates one store from the other.

use super::action::ActionNormalizer;
use super::audit::AuditLog;
use super::document::DocumentStore;
use super::rating::{validate_case_rating, validate_case_rating_format};
use super::session::EditSessions;
use super::storage::{ColumnOrder, TabularStore};
use super::translator::{document_to_rows, rating_value, rows_to_document};
use super::types::{
    AddRuleParam, AddRuleResult, GetRulesParam, GetRulesResult, ListStatesResult,
    RemoveRuleParam, RemoveRuleResult, ResyncResult, Rule, RuleSubmission, UpdateRulesParam,
    UpdateRulesResult,
};
use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

pub const INVALID_RATING_ON_ADD: &str = "Invalid case rating format. Case rating must be in the format 1-5 or a single number from 1 to 5.";
pub const INVALID_RATING_ON_UPDATE: &str =
    "Invalid case rating format. Please provide a valid format (e.g., 1-4, 5).";

const RULE_ADDED: &str = "New rule added successfully!";
const RULE_REMOVED: &str = "Rule removed successfully!";
const RULES_UPDATED: &str = "Rules updated successfully ";

const LOAD_FAILED: &str = "An error occurred while loading rules. Please try again later.";
const RETRIEVE_FAILED: &str = "An error occurred while retrieving rules. Please try again later.";
const ADD_FAILED: &str = "An error occurred while adding a new rule. Please try again later.";
const REMOVE_FAILED: &str = "An error occurred while removing a rule. Please try again later.";
const UPDATE_FAILED: &str = "An error occurred while updating rules. Please try again later.";
const RESYNC_FAILED: &str = "An error occurred while synchronizing the rule stores. Please try again later.";

/// Which store is regenerated from which.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileDirection {
    /// Rewrite the CSV table from the JSON document.
    DocumentToTabular,
    /// Rewrite the JSON document from the CSV table.
    TabularToDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub rules: usize,
    pub states: usize,
}

#[derive(Clone)]
pub struct RuleService {
    config: ServiceConfig,
    tabular: TabularStore,
    document: DocumentStore,
    audit: AuditLog,
    sessions: EditSessions,
    actions: ActionNormalizer,
}

impl RuleService {
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            tabular: TabularStore::new(config.tabular_path()),
            document: DocumentStore::new(config.document_path()),
            audit: AuditLog::new(config.audit_log_path()),
            sessions: EditSessions::new(config.session_capacity),
            actions: ActionNormalizer::new()?,
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn tabular(&self) -> &TabularStore {
        &self.tabular
    }

    pub fn document(&self) -> &DocumentStore {
        &self.document
    }

    pub fn sessions(&self) -> &EditSessions {
        &self.sessions
    }

    /// Make sure both stores exist, deriving a missing one from the other.
    pub fn ensure_stores(&self) -> Result<(), ServiceError> {
        match (self.document.exists(), self.tabular.exists()) {
            (true, true) => Ok(()),
            (true, false) => self
                .reconcile(ReconcileDirection::DocumentToTabular)
                .map(|_| ()),
            (false, true) => self
                .reconcile(ReconcileDirection::TabularToDocument)
                .map(|_| ()),
            (false, false) => {
                info!(
                    document = %self.document.path().display(),
                    tabular = %self.tabular.path().display(),
                    "creating empty rule stores"
                );
                self.document.write(&rows_to_document(&[]))?;
                self.tabular.write(&[], ColumnOrder::Canonical)
            }
        }
    }

    /// Regenerate one store from the other.
    pub fn reconcile(&self, direction: ReconcileDirection) -> Result<ReconcileReport, ServiceError> {
        let report = match direction {
            ReconcileDirection::DocumentToTabular => {
                let document = self.document.load()?;
                let rows = document_to_rows(&document);
                self.tabular.write(&rows, ColumnOrder::Canonical)?;
                ReconcileReport {
                    rules: rows.len(),
                    states: document.rules.state_count(),
                }
            }
            ReconcileDirection::TabularToDocument => {
                let rows = self.tabular.read_rows()?;
                let document = rows_to_document(&rows);
                self.document.write(&document)?;
                ReconcileReport {
                    rules: document.rules.rule_count(),
                    states: document.rules.state_count(),
                }
            }
        };
        debug!(?direction, rules = report.rules, states = report.states, "reconciled rule stores");
        Ok(report)
    }

    /// Rows as presented to clients: rating reduced to its last token and
    /// firm-assignment actions stripped of their prefix. Rows with a blank
    /// rating are skipped.
    fn normalized_rows(&self) -> Result<Vec<Rule>, ServiceError> {
        let rows = self.tabular.read_rows()?;
        let mut rules = Vec::with_capacity(rows.len());
        for mut row in rows {
            if row.case_rating.trim().is_empty() {
                warn!(?row, "skipping rule row without a case rating");
                continue;
            }
            row.case_rating = rating_value(&row.case_rating).to_string();
            row.action = self.actions.normalize_on_load(&row.action);
            rules.push(row);
        }
        Ok(rules)
    }

    /// Like [`Self::normalized_rows`], but a missing table reads as empty.
    fn load_rules(&self) -> Result<Vec<Rule>, ServiceError> {
        match self.normalized_rows() {
            Err(err) if err.is_not_found() => {
                warn!(path = %self.tabular.path().display(), "rule table not found");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Distinct case states, sorted ascending.
    #[tracing::instrument(skip(self))]
    pub async fn list_states(&self) -> Result<ListStatesResult, ServiceError> {
        let rules = self.load_rules().map_err(|e| {
            error!("An error occurred while loading rules: {e}");
            ServiceError::Load(LOAD_FAILED.to_string())
        })?;
        let states: BTreeSet<String> = rules.into_iter().map(|r| r.case_state).collect();
        Ok(ListStatesResult {
            states: states.into_iter().collect(),
        })
    }

    /// Rules for one state; every other rule is held aside in a new edit session.
    #[tracing::instrument(skip(self, param), fields(state = %param.state))]
    pub async fn get_rules(&self, param: GetRulesParam) -> Result<GetRulesResult, ServiceError> {
        let rules = self.load_rules().map_err(|e| {
            error!("An error occurred while retrieving rules: {e}");
            ServiceError::Retrieval(RETRIEVE_FAILED.to_string())
        })?;
        let (matching, rest): (Vec<Rule>, Vec<Rule>) = rules
            .into_iter()
            .partition(|rule| rule.case_state == param.state);

        let held_aside = rest.len();
        let session_id = self.sessions.open(&param.state, rest)?;
        debug!(matching = matching.len(), held_aside, %session_id, "opened edit session");

        Ok(GetRulesResult {
            rules: matching,
            session_id,
            held_aside,
        })
    }

    /// Validate and store one new rule. An invalid rating is reported in the
    /// result rather than as an error.
    #[tracing::instrument(skip(self, param), fields(state = %param.new_rule.case_state))]
    pub async fn add_rule(&self, param: AddRuleParam) -> Result<AddRuleResult, ServiceError> {
        let submission = param.new_rule;
        let valid = submission
            .case_rating
            .as_ref()
            .is_some_and(validate_case_rating);
        let Some(rule) = submission.to_rule().filter(|_| valid) else {
            return Ok(AddRuleResult {
                accepted: false,
                message: INVALID_RATING_ON_ADD.to_string(),
            });
        };

        if let Err(e) = self.audit.append(&submission) {
            warn!(path = %self.audit.path().display(), "An error occurred while adding a new rule to the audit log: {e}");
        }

        self.store_new_rule(&rule).map_err(|e| {
            error!("An error occurred while adding a new rule: {e}");
            ServiceError::Write(ADD_FAILED.to_string())
        })?;

        info!(action = %rule.action, rating = %rule.case_rating, "rule added");
        Ok(AddRuleResult {
            accepted: true,
            message: RULE_ADDED.to_string(),
        })
    }

    fn store_new_rule(&self, rule: &Rule) -> Result<(), ServiceError> {
        self.document.append_rule(rule)?;
        self.tabular.append(rule)?;
        self.reconcile(ReconcileDirection::DocumentToTabular)?;
        Ok(())
    }

    /// Drop every row structurally equal to the target. Removing a rule that
    /// is not there still succeeds.
    #[tracing::instrument(skip(self, param), fields(state = %param.rule_to_remove.case_state))]
    pub async fn remove_rule(
        &self,
        param: RemoveRuleParam,
    ) -> Result<RemoveRuleResult, ServiceError> {
        let removed = self.remove_matching(&param.rule_to_remove).map_err(|e| {
            error!("An error occurred while removing a rule: {e}");
            ServiceError::Write(REMOVE_FAILED.to_string())
        })?;

        info!(removed, "rule removal finished");
        Ok(RemoveRuleResult {
            removed,
            message: RULE_REMOVED.to_string(),
        })
    }

    fn remove_matching(&self, target: &Rule) -> Result<usize, ServiceError> {
        let rules = self.normalized_rows()?;
        let before = rules.len();
        let kept: Vec<Rule> = rules.into_iter().filter(|rule| rule != target).collect();
        let removed = before - kept.len();

        self.tabular.write(&kept, ColumnOrder::Canonical)?;
        self.reconcile(ReconcileDirection::TabularToDocument)?;
        Ok(removed)
    }

    /// Replace the rule base with the edited rules plus the rules held aside
    /// by the named edit session. Nothing is written if any rating is invalid.
    #[tracing::instrument(skip(self, param), fields(session_id = %param.session_id, edited = param.updated_rules.len()))]
    pub async fn update_rules(
        &self,
        param: UpdateRulesParam,
    ) -> Result<UpdateRulesResult, ServiceError> {
        let pending = self.sessions.get(&param.session_id)?;
        let edited_count = param.updated_rules.len();

        let combined: Vec<RuleSubmission> = param
            .updated_rules
            .into_iter()
            .chain(pending.rules.into_iter().map(RuleSubmission::from))
            .collect();
        let rules = self.prepare_bulk(combined)?;
        let (edited, held_aside) = rules.split_at(edited_count);

        self.write_bulk(&rules).map_err(|e| {
            error!("An error occurred while updating rules: {e}");
            ServiceError::Write(UPDATE_FAILED.to_string())
        })?;

        let states = affected_states(edited, held_aside);
        let mut message = RULES_UPDATED.to_string();
        for state in &states {
            message.push_str(&format!("for case state {state}."));
        }
        info!(%message, rules = rules.len(), "rules updated");

        Ok(UpdateRulesResult {
            message,
            states,
            rules_written: rules.len(),
        })
    }

    /// Bulk-validate every rating and normalize every action.
    fn prepare_bulk(&self, submissions: Vec<RuleSubmission>) -> Result<Vec<Rule>, ServiceError> {
        let mut rules = Vec::with_capacity(submissions.len());
        for submission in submissions {
            if !validate_case_rating_format(submission.case_rating.as_ref()) {
                warn!(rating = ?submission.case_rating, state = %submission.case_state, "rejecting bulk update");
                return Err(ServiceError::Validation(INVALID_RATING_ON_UPDATE.to_string()));
            }
            let mut rule = submission
                .to_rule()
                .ok_or_else(|| ServiceError::Validation(INVALID_RATING_ON_UPDATE.to_string()))?;
            rule.action = self.actions.normalize_on_update(&rule.action);
            rules.push(rule);
        }
        Ok(rules)
    }

    fn write_bulk(&self, rules: &[Rule]) -> Result<(), ServiceError> {
        self.tabular.write(rules, ColumnOrder::TypeFirst)?;
        self.reconcile(ReconcileDirection::TabularToDocument)?;
        Ok(())
    }

    /// Regenerate the rule table from the document.
    #[tracing::instrument(skip(self))]
    pub async fn resync(&self) -> Result<ResyncResult, ServiceError> {
        let report = self
            .reconcile(ReconcileDirection::DocumentToTabular)
            .map_err(|e| {
                error!("An error occurred while synchronizing rule stores: {e}");
                ServiceError::Write(RESYNC_FAILED.to_string())
            })?;
        info!(rules = report.rules, states = report.states, "rule table regenerated");
        Ok(ResyncResult {
            rules_written: report.rules,
            states: report.states,
        })
    }
}

/// States of edited rules that are not also held-aside rules, first-seen order.
fn affected_states(edited: &[Rule], held_aside: &[Rule]) -> Vec<String> {
    let mut states: Vec<String> = Vec::new();
    for rule in edited {
        if held_aside.contains(rule) || states.contains(&rule.case_state) {
            continue;
        }
        states.push(rule.case_state.clone());
    }
    states
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affected_states_skip_held_aside_duplicates() {
        let ca = Rule::new("1001", "Auto", "1-3", "CA");
        let ny = Rule::new("2002", "Home", "2", "NY");
        let ny2 = Rule::new("2003", "Home", "3", "NY");
        let tx = Rule::new("3003", "Life", "5", "TX");

        let states = affected_states(&[ny.clone(), ca.clone(), ny2, tx], &[ca]);
        assert_eq!(states, vec!["NY".to_string(), "TX".to_string()]);
    }
}
