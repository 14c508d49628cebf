//! Script binding generation from declaration feeds.
//!
//! A feed is parsed line by line into declarations that stream into a
//! [`DeclarationSink`]. The export generator turns them into wrappers the
//! script runtime calls, the import generator into native stubs that call
//! script functions, and [`GlueAssembler`] lays both out as files.

pub mod export;
pub mod glue;
pub mod grammar;
pub mod import;
pub mod parser;
pub mod registry;
pub mod runtime;
pub mod types;

pub use export::{ExportGenerator, ExportOutput};
pub use glue::{GlueAssembler, GlueOutput};
pub use import::{ImportGenerator, ImportOutput};
pub use parser::{DeclParser, DeclarationSink, FeedSummary, ParsedFeed, SkipReason, SkippedLine};
pub use registry::{ConstantTable, RegistrationEmitter, RoutineTable};
pub use runtime::RuntimeApi;
pub use types::{ConstantDecl, Declaration, FunctionDecl, Param, ScriptCategory, TypeSpec};
