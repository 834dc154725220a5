//! The resolved law record.

use serde::{Deserialize, Serialize};

/// A law name resolved against the registry.
///
/// Looked up once per request by the name resolver; lives only as long as
/// the cache entry that used it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawRecord {
    /// The statute's formal registry name.
    pub canonical_name: String,

    /// Registry identifier for the structured fetch. `None` when the law
    /// was resolved locally (registry unreachable) and only the scrape and
    /// snapshot tiers can serve it.
    pub registry_id: Option<String>,

    /// Whether the registry flagged this version as currently in force.
    pub is_current_version: bool,

    /// Whether the name denotes an implementing regulation
    /// (시행령/시행규칙) rather than the parent act.
    pub is_subordinate_regulation: bool,
}

impl LawRecord {
    /// A record for a name the registry could not be asked about.
    pub fn local(name: impl Into<String>) -> Self {
        let canonical_name = name.into();
        let is_subordinate_regulation = is_subordinate_name(&canonical_name);
        Self {
            canonical_name,
            registry_id: None,
            is_current_version: false,
            is_subordinate_regulation,
        }
    }
}

/// Whether a law name denotes a subordinate regulation.
pub fn is_subordinate_name(name: &str) -> bool {
    name.ends_with("시행령") || name.ends_with("시행규칙")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subordinate_detection() {
        assert!(is_subordinate_name("학교폭력예방 및 대책에 관한 법률 시행령"));
        assert!(is_subordinate_name("초·중등교육법 시행규칙"));
        assert!(!is_subordinate_name("학교폭력예방 및 대책에 관한 법률"));
    }

    #[test]
    fn test_local_record() {
        let record = LawRecord::local("교육기본법");
        assert_eq!(record.registry_id, None);
        assert!(!record.is_current_version);
        assert!(!record.is_subordinate_regulation);
    }
}
