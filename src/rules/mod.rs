pub mod action;
pub mod audit;
pub mod document;
pub mod rating;
pub mod service;
pub mod session;
pub mod storage;
pub mod translator;
pub mod types;

// Re-export commonly used types
pub use types::*;
pub use action::ActionNormalizer;
pub use audit::AuditLog;
pub use document::{DocumentStore, RuleDocument, RuleIndex};
pub use rating::{RatingPolicy, RatingSpec, validate_case_rating, validate_case_rating_format};
pub use service::{ReconcileDirection, ReconcileReport, RuleService};
pub use session::{EditSessions, PendingSet};
pub use storage::{ColumnOrder, TabularStore};
pub use translator::{document_to_rows, rows_to_document};
