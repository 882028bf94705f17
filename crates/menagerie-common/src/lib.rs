//! # Menagerie Common
//!
//! Common types, utilities, and shared abstractions for the Menagerie
//! simulation core.
//!
//! This crate provides foundational types used across all Menagerie crates:
//! - ID types (EntityId, LootId) and an explicit ID allocator
//! - Ground-plane math on `glam` vectors
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod spatial;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::spatial::*;
}

pub use prelude::*;
