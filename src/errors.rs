use std::path::PathBuf;
use thiserror::Error;

/// Everything that can sink one benchmark's analysis. The driver converts
/// any of these into the `(-1, -1)` sentinel row instead of propagating, so
/// a broken benchmark never takes down the rest of the run.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// A required input file or directory is absent or unreadable.
    #[error("missing input: {}", .0.display())]
    Missing(PathBuf),

    /// The external instrumentation tool failed, timed out, or left no
    /// usable output behind.
    #[error("tool invocation: {0}")]
    Tool(String),

    /// A listing, trace, IR, or evidence file did not have the shape the
    /// external tool promised. Includes evidence referencing instructions
    /// that do not exist in the static listing.
    #[error("parse: {0}")]
    Parse(String),

    /// Zero recorded occurrences in total; the dynamic ratio is undefined.
    #[error("no execution evidence")]
    EmptyEvidence,
}
