//! Parses market-research report titles into a date range, a report-type
//! phrase, a set of geographic regions, and a residual topic, via a fixed
//! five-stage pipeline driven by a read-only pattern library (spec.md §1,
//! §2).
//!
//! ```no_run
//! use report_title_parser::pattern_library::{JsonFilePatternSource, PatternLibrary};
//! use report_title_parser::pipeline::Pipeline;
//!
//! # fn main() -> anyhow::Result<()> {
//! let source = JsonFilePatternSource::new("data/patterns.json");
//! let library = PatternLibrary::load(&source)?;
//! let pipeline = Pipeline::new(&library);
//! let output = pipeline.run("APAC Personal Protective Equipment Market Analysis, 2024-2030");
//! println!("{}", output.topic);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod model;
pub mod normalize;
pub mod pattern_library;
pub mod pipeline;

pub use error::{PatternLibraryError, PipelineError};
pub use model::PipelineOutput;
pub use pattern_library::PatternLibrary;
pub use pipeline::Pipeline;
