use crate::errors::ServiceError;
use regex::Regex;

/// Literal prefix of firm-assignment actions.
pub const ASSIGN_PREFIX: &str = "Assign handling firm";

const ASSIGN_PATTERN: &str = r"Assign handling firm '(.*?)'(.*)";

/// Rewrites action text on the load and bulk-update paths.
///
/// The two directions are independent transforms, not inverses:
/// `"Assign handling firm 'Acme' (NY)"` loads as `"'Acme'(NY)"` and is written
/// back as `"Assign handling firm 'Acme'(NY)"`.
#[derive(Debug, Clone)]
pub struct ActionNormalizer {
    assign: Regex,
}

impl ActionNormalizer {
    pub fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            assign: Regex::new(ASSIGN_PATTERN)?,
        })
    }

    /// Strip the assignment prefix, keeping the quoted firm and trimmed detail.
    pub fn normalize_on_load(&self, action: &str) -> String {
        match self.assign.captures(action) {
            Some(caps) => {
                let firm = caps.get(1).map_or("", |m| m.as_str());
                let detail = caps.get(2).map_or("", |m| m.as_str()).trim();
                format!("'{firm}'{detail}")
            }
            None => action.to_string(),
        }
    }

    /// Prefix non-numeric actions that lack the assignment prefix.
    pub fn normalize_on_update(&self, action: &str) -> String {
        let numeric = !action.is_empty() && action.bytes().all(|b| b.is_ascii_digit());
        if numeric || action.starts_with(ASSIGN_PREFIX) {
            action.to_string()
        } else {
            format!("{ASSIGN_PREFIX} {action}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> ActionNormalizer {
        ActionNormalizer::new().unwrap()
    }

    #[test]
    fn load_strips_prefix_and_trims_detail() {
        let n = normalizer();
        assert_eq!(
            n.normalize_on_load("Assign handling firm 'Smith & Co' for rating 3 "),
            "'Smith & Co'for rating 3"
        );
        assert_eq!(n.normalize_on_load("Assign handling firm 'Acme'"), "'Acme'");
    }

    #[test]
    fn load_matches_anywhere_in_the_text() {
        let n = normalizer();
        assert_eq!(
            n.normalize_on_load("Please Assign handling firm 'Acme' now"),
            "'Acme'now"
        );
    }

    #[test]
    fn load_leaves_other_actions_alone() {
        let n = normalizer();
        assert_eq!(n.normalize_on_load("1001"), "1001");
        assert_eq!(n.normalize_on_load("'Acme'"), "'Acme'");
        assert_eq!(n.normalize_on_load("Assign handling firm Acme"), "Assign handling firm Acme");
    }

    #[test]
    fn update_prefixes_only_non_numeric_unprefixed_actions() {
        let n = normalizer();
        assert_eq!(n.normalize_on_update("1001"), "1001");
        assert_eq!(
            n.normalize_on_update("Assign handling firm 'Acme'"),
            "Assign handling firm 'Acme'"
        );
        assert_eq!(n.normalize_on_update("'Acme'"), "Assign handling firm 'Acme'");
        assert_eq!(n.normalize_on_update("-5"), "Assign handling firm -5");
        assert_eq!(n.normalize_on_update(""), "Assign handling firm ");
    }

    #[test]
    fn load_then_update_is_not_an_identity() {
        let n = normalizer();
        let original = "Assign handling firm 'Acme' (NY)";
        let reloaded = n.normalize_on_update(&n.normalize_on_load(original));
        assert_eq!(reloaded, "Assign handling firm 'Acme'(NY)");
        assert_ne!(reloaded, original);
    }
}
