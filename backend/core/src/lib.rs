//! `envforge-core`: environment resolution and document structuring.
//!
//! Provides:
//! - Lookup key expansion for application / profile / label requests
//! - Source aggregation over a [`PropertySourceProvider`], alone or composed by order
//! - Override merging with whole-array-family replacement
//! - Flat key → nested document structuring (and the inverse flattening)

pub mod aggregator;
pub mod composite;
pub mod error;
pub mod flatten;
pub mod keys;
pub mod merge;
pub mod request;
pub mod structure;
pub mod traits;
pub mod types;

pub use aggregator::SourceAggregator;
pub use composite::CompositeResolver;
pub use error::{EngineError, Result};
pub use flatten::flatten;
pub use keys::{KeyExpander, Lookup, LookupKeys, DEFAULT_APPLICATION, DEFAULT_PROFILE};
pub use merge::{array_family_prefix, merge, merge_environment};
pub use request::EnvironmentRequest;
pub use structure::{Node, NodeMap, StructureBuilder, DOCUMENT_KEY, MAX_INDEX};
pub use traits::{PropertySourceProvider, DEFAULT_LABEL};
pub use types::{normalize, Environment, PropertyMap, PropertySource, ACTIVE_PROFILES_KEY};
