//! Collaborator interfaces the resolution pipeline consumes.
//!
//! The core never talks to the registry, the rendered site, or the local
//! snapshot directly; it goes through these narrow traits so applications
//! and tests can substitute implementations.

pub mod fetcher;
pub mod registry;
pub mod snapshot;
pub mod summarizer;
