//! Law-name resolution against the registry.
//!
//! The registry may expose a statute under its formal name, a short name,
//! or an alias, and can return several historical versions of the same
//! statute. Selection therefore runs through a fixed precedence: exact
//! normalized match on any candidate name field, then best fuzzy match
//! above a threshold, then any candidate flagged currently in force.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::traits::registry::{LawCandidate, RegistryClient};
use crate::types::law::{is_subordinate_name, LawRecord};

/// Outcome of a name resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(LawRecord),
    /// No candidate satisfied any precedence tier. Carries the raw
    /// candidate names for diagnostics.
    Unresolved { candidates: Vec<String> },
}

/// Resolves raw law names to registry records.
pub struct NameResolver {
    /// Abbreviation → canonical name, keyed by whitespace-stripped form.
    aliases: HashMap<String, String>,
    similarity_threshold: f64,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver {
    pub fn new() -> Self {
        let mut resolver = Self {
            aliases: HashMap::new(),
            similarity_threshold: 0.55,
        };
        for (short, canonical) in BUILTIN_ALIASES {
            resolver = resolver.with_alias(*short, *canonical);
        }
        resolver
    }

    /// Register an abbreviation.
    pub fn with_alias(mut self, short: impl AsRef<str>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(squash(short.as_ref()), canonical.into());
        self
    }

    /// Set the fuzzy-match acceptance threshold (0.0–1.0).
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Resolve a raw law name.
    ///
    /// A registry transport failure is not terminal: the lookup degrades to
    /// a local record so the scrape and snapshot tiers can still run,
    /// mirroring how the registry being down must never take the whole
    /// pipeline with it.
    pub async fn resolve<R: RegistryClient>(&self, registry: &R, raw_name: &str) -> Resolution {
        let query = self.substitute_alias(raw_name);

        let candidates = match registry.search(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(name = %query, error = %e, "registry search failed; resolving locally");
                return Resolution::Resolved(LawRecord::local(query));
            }
        };

        if candidates.is_empty() {
            return Resolution::Unresolved { candidates: Vec::new() };
        }

        match self.select(&query, &candidates) {
            Some(candidate) => {
                debug!(name = %query, canonical = %candidate.name, "law name resolved");
                Resolution::Resolved(to_record(candidate))
            }
            None => Resolution::Unresolved {
                candidates: candidates.iter().map(|c| c.name.clone()).collect(),
            },
        }
    }

    /// Alias substitution on the whitespace-stripped input.
    fn substitute_alias(&self, raw_name: &str) -> String {
        match self.aliases.get(&squash(raw_name)) {
            Some(canonical) => canonical.clone(),
            None => raw_name.trim().to_string(),
        }
    }

    /// Candidate precedence: exact → fuzzy → currently in force.
    fn select<'a>(&self, query: &str, candidates: &'a [LawCandidate]) -> Option<&'a LawCandidate> {
        let wanted = squash(query);

        if let Some(exact) = candidates
            .iter()
            .find(|c| c.name_fields().any(|n| squash(n) == wanted))
        {
            return Some(exact);
        }

        let fuzzy = candidates
            .iter()
            .map(|c| {
                let score = c
                    .name_fields()
                    .map(|n| bigram_similarity(&wanted, &squash(n)))
                    .fold(0.0_f64, f64::max);
                (c, score)
            })
            .filter(|(_, score)| *score >= self.similarity_threshold)
            .max_by(|(_, a), (_, b)| a.total_cmp(b));
        if let Some((candidate, score)) = fuzzy {
            debug!(name = %candidate.name, score, "fuzzy name match");
            return Some(candidate);
        }

        candidates.iter().find(|c| c.is_current)
    }
}

/// Built-in abbreviation table for names the registry search is weak on.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("학교폭력예방법", "학교폭력예방 및 대책에 관한 법률"),
    ("학폭법", "학교폭력예방 및 대책에 관한 법률"),
    ("학교폭력예방법 시행령", "학교폭력예방 및 대책에 관한 법률 시행령"),
    ("정통망법", "정보통신망 이용촉진 및 정보보호 등에 관한 법률"),
    ("개인정보법", "개인정보 보호법"),
];

fn to_record(candidate: &LawCandidate) -> LawRecord {
    LawRecord {
        canonical_name: candidate.name.clone(),
        registry_id: Some(candidate.id.clone()),
        is_current_version: candidate.is_current,
        is_subordinate_regulation: is_subordinate_name(&candidate.name),
    }
}

/// Remove all whitespace; Korean law names compare without it.
fn squash(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Character-bigram Dice similarity in [0, 1].
///
/// Robust enough for near-miss Korean law names without pulling in a
/// string-distance dependency; both inputs are expected pre-squashed.
fn bigram_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a_bigrams = bigrams(a);
    let b_bigrams = bigrams(b);
    if a_bigrams.is_empty() || b_bigrams.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for pair in &a_bigrams {
        *counts.entry(*pair).or_default() += 1;
    }
    let mut shared = 0usize;
    for pair in &b_bigrams {
        if let Some(count) = counts.get_mut(pair) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }
    (2.0 * shared as f64) / (a_bigrams.len() + b_bigrams.len()) as f64
}

fn bigrams(text: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRegistry;

    const CANONICAL: &str = "학교폭력예방 및 대책에 관한 법률";

    fn candidate(name: &str, id: &str, is_current: bool) -> LawCandidate {
        LawCandidate {
            name: name.to_string(),
            abbreviation: None,
            id: id.to_string(),
            is_current,
        }
    }

    #[tokio::test]
    async fn test_alias_substitution_before_search() {
        let registry =
            MockRegistry::new().with_candidates(CANONICAL, vec![candidate(CANONICAL, "1", true)]);
        let resolution = NameResolver::new().resolve(&registry, "학교폭력예방법").await;
        let Resolution::Resolved(record) = resolution else {
            panic!("expected resolution");
        };
        assert_eq!(record.canonical_name, CANONICAL);
        assert_eq!(record.registry_id.as_deref(), Some("1"));
        // The search must have been issued for the substituted name.
        assert_eq!(registry.search_queries(), vec![CANONICAL.to_string()]);
    }

    #[tokio::test]
    async fn test_exact_match_beats_in_force() {
        let registry = MockRegistry::new().with_candidates(
            CANONICAL,
            vec![
                candidate("다른 법률", "9", true),
                candidate(CANONICAL, "1", false),
            ],
        );
        let resolution = NameResolver::new().resolve(&registry, CANONICAL).await;
        let Resolution::Resolved(record) = resolution else {
            panic!("expected resolution");
        };
        assert_eq!(record.registry_id.as_deref(), Some("1"));
        assert!(!record.is_current_version);
    }

    #[tokio::test]
    async fn test_fuzzy_match_above_threshold() {
        let registry = MockRegistry::new().with_candidates(
            "학교폭력예방 및 대책에 관한 법",
            vec![candidate(CANONICAL, "1", false), candidate("민법", "2", true)],
        );
        let resolution = NameResolver::new()
            .resolve(&registry, "학교폭력예방 및 대책에 관한 법")
            .await;
        let Resolution::Resolved(record) = resolution else {
            panic!("expected resolution");
        };
        assert_eq!(record.registry_id.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_in_force_is_last_resort() {
        let registry = MockRegistry::new().with_candidates(
            "연금법",
            vec![
                candidate("국민연금법", "old", false),
                candidate("공무원연금법", "new", true),
            ],
        );
        let resolver = NameResolver::new().with_similarity_threshold(0.99);
        let resolution = resolver.resolve(&registry, "연금법").await;
        let Resolution::Resolved(record) = resolution else {
            panic!("expected resolution");
        };
        assert_eq!(record.registry_id.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_no_candidates_is_unresolved() {
        let registry = MockRegistry::new();
        let resolution = NameResolver::new().resolve(&registry, "존재하지 않는 법").await;
        assert_eq!(
            resolution,
            Resolution::Unresolved { candidates: Vec::new() }
        );
    }

    #[tokio::test]
    async fn test_search_failure_degrades_to_local_record() {
        let registry = MockRegistry::new().failing_search();
        let resolution = NameResolver::new().resolve(&registry, "학교폭력예방법").await;
        let Resolution::Resolved(record) = resolution else {
            panic!("expected local record");
        };
        assert_eq!(record.canonical_name, CANONICAL);
        assert_eq!(record.registry_id, None);
    }

    #[test]
    fn test_bigram_similarity_bounds() {
        assert_eq!(bigram_similarity("법률", "법률"), 1.0);
        assert_eq!(bigram_similarity("법률", "xyzw"), 0.0);
        let near = bigram_similarity("학교폭력예방및대책에관한법률", "학교폭력예방및대책에관한법");
        assert!(near > 0.8, "{near}");
    }
}
