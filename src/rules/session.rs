use super::types::Rule;
use crate::errors::ServiceError;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_CAPACITY: usize = 64;

/// Rules of other states held aside while one state is being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSet {
    pub state: String,
    pub rules: Vec<Rule>,
}

/// Open edit sessions keyed by token, least recently used evicted first.
///
/// Reading a session does not consume it, so the same token may back several
/// bulk updates until it is evicted.
#[derive(Clone)]
pub struct EditSessions {
    sessions: Arc<Mutex<LruCache<String, PendingSet>>>,
    sequence: Arc<AtomicU64>,
}

impl EditSessions {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Arc::new(Mutex::new(LruCache::new(capacity))),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Hold `rules` aside under a fresh token and return the token.
    pub fn open(&self, state: &str, rules: Vec<Rule>) -> Result<String, ServiceError> {
        let token = self.next_token(state);
        let mut sessions = self.lock()?;
        sessions.put(
            token.clone(),
            PendingSet {
                state: state.to_string(),
                rules,
            },
        );
        Ok(token)
    }

    pub fn get(&self, token: &str) -> Result<PendingSet, ServiceError> {
        let mut sessions = self.lock()?;
        sessions.get(token).cloned().ok_or_else(|| {
            ServiceError::Session(format!(
                "Edit session '{token}' is unknown or has expired. Fetch the rules for the state again."
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LruCache<String, PendingSet>>, ServiceError> {
        self.sessions
            .lock()
            .map_err(|_| ServiceError::Internal("Failed to acquire edit session lock".to_string()))
    }

    fn next_token(&self, state: &str) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(state.as_bytes());
        hasher.update(sequence.to_le_bytes());
        hasher.update(nanos.to_le_bytes());
        hex::encode(&hasher.finalize()[..16])
    }
}

impl Default for EditSessions {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_are_independent() {
        let sessions = EditSessions::new(8);
        let ca = Rule::new("1001", "Auto", "1-3", "CA");
        let ny = Rule::new("2002", "Home", "2", "NY");

        let first = sessions.open("NY", vec![ca.clone()]).unwrap();
        let second = sessions.open("CA", vec![ny.clone()]).unwrap();
        assert_ne!(first, second);

        assert_eq!(sessions.get(&first).unwrap().rules, vec![ca]);
        assert_eq!(sessions.get(&second).unwrap().rules, vec![ny]);
    }

    #[test]
    fn reading_does_not_consume() {
        let sessions = EditSessions::new(8);
        let token = sessions.open("NY", Vec::new()).unwrap();
        assert!(sessions.get(&token).is_ok());
        assert!(sessions.get(&token).is_ok());
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn least_recently_used_session_is_evicted() {
        let sessions = EditSessions::new(2);
        let a = sessions.open("A", Vec::new()).unwrap();
        let b = sessions.open("B", Vec::new()).unwrap();
        sessions.get(&a).unwrap();
        let c = sessions.open("C", Vec::new()).unwrap();

        assert!(sessions.get(&a).is_ok());
        assert!(sessions.get(&c).is_ok());
        let err = sessions.get(&b).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn zero_capacity_falls_back_to_default() {
        let sessions = EditSessions::new(0);
        let token = sessions.open("A", Vec::new()).unwrap();
        assert!(sessions.get(&token).is_ok());
    }
}
