//! Digital Ocean Spaces storage client for generated media.
//!
//! The pipeline uploads image bytes here to obtain permanent public
//! URLs; storage lifecycle (deletion, quotas) is out of scope.

pub mod client;
pub mod error;

pub use client::{MediaStore, SpacesClient, SpacesConfig};
pub use error::{StorageError, StorageResult};
