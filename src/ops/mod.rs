//! High-level operations.
//!
//! This module contains the implementation of scriptbind commands.

pub mod check;
pub mod generate;

pub use check::{check_feed, check_feeds, ensure_clean, FeedReport};
pub use generate::{
    generate_bindings, render_bindings, Artifact, ArtifactKind, ArtifactStatus, GenerateOptions,
    GenerateResult,
};
