//! Production implementations of the collaborator traits.

pub mod html;
pub mod registry;
pub mod snapshot;

pub use html::HttpDocumentFetcher;
pub use registry::DrfRegistryClient;
pub use snapshot::JsonSnapshotStore;
