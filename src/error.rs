//! Error types for the pattern library and pipeline.
//!
//! Per the error taxonomy: only config errors ever surface to a caller.
//! Pattern compile errors are logged and skipped; stage-level failures are
//! captured in a [`crate::model::PipelineOutput`]'s notes, never as an `Err`.

use thiserror::Error;

/// Fatal errors that can occur while loading a [`crate::pattern_library::PatternLibrary`].
///
/// These are the only errors the core ever propagates to a caller; a single
/// bad pattern record is a compile error (logged, skipped), not a config
/// error.
#[derive(Debug, Error)]
pub enum PatternLibraryError {
    #[error("pattern store unreachable: {0}")]
    StoreUnreachable(String),

    #[error("pattern store contained malformed data: {0}")]
    Malformed(String),

    #[error("no active patterns of required type `{0}`")]
    EmptyRequiredType(&'static str),
}

/// Reserved for pipeline-level fatal failures. The pipeline itself never
/// returns one today: "a parse is always produced" is a hard contract, so
/// this exists for forward compatibility (e.g. a future bounded-timeout
/// wrapper that chooses to hard-fail instead of degrading).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline aborted: {0}")]
    Aborted(String),
}
