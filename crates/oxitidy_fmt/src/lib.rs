//! Import-block formatting for JavaScript/TypeScript source.
//!
//! This crate ties the pipeline together: it locates the leading import
//! block, classifies the declarations under the effective policy, builds the
//! layout document and prints it with aligned `from` clauses, then splices
//! the result back, leaving every other byte of the file untouched.
//!
//! Each call is synchronous and independent; batch collaborators run many
//! calls in parallel and share only a read-only policy cache. A failure never
//! corrupts a file - either an error comes back or the original text does.

mod block;
mod builder;
mod error;
mod formatter;

// Re-export public API
pub use block::SKIP_PRAGMA;
pub use builder::build_doc;
pub use error::FormatError;
pub use formatter::{FormatResult, OracleInput, format_source, format_source_with};
