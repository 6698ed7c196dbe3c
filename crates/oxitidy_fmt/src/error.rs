use thiserror::Error;

/// Failure classes callers need to tell apart at the formatting boundary.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Syntax errors are fatal for the file; nothing is written.
    #[error("failed to parse source: {0}")]
    Parse(String),
    /// A dynamic `import(...)` inside the candidate block makes reordering
    /// ambiguous, so the call fails closed and the file is left alone.
    #[error("dynamic imports detected in import block")]
    DynamicImports,
}
