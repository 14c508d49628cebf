//! scriptbind - script binding generator for embedded interpreters
//!
//! This crate reads header-like declaration feeds and generates the C glue
//! that lets an embedded script runtime call native functions (exports) and
//! native code call script functions (imports), together with the tables
//! that register them.

pub mod bindings;
pub mod ops;
pub mod util;

/// Test utilities for scriptbind unit tests.
///
/// Only compiled for tests. Holds shared feed fixtures.
#[cfg(test)]
pub mod test_support;

pub use bindings::{DeclParser, DeclarationSink, GlueOutput, RuntimeApi};
pub use ops::{generate_bindings, render_bindings, GenerateOptions, GenerateResult};
pub use util::config::Config;
