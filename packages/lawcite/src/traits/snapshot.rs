//! Static snapshot store interface.

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::types::citation::Citation;

/// Last-resort lookup against a versioned local snapshot of statute text.
///
/// The store is keyed by canonical law name, then by article key strings
/// ("제14조"), then by clause and subclause. Implementations return the
/// deepest text available for the citation; `None` means the snapshot has
/// nothing for this law or article.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn lookup(&self, canonical_name: &str, citation: &Citation) -> SourceResult<Option<String>>;
}
