//! `PatternSource`: the seam where the out-of-scope document store plugs
//! in. The store itself (MongoDB, per spec.md §6) is an external
//! collaborator; this crate only needs something that can hand back a
//! `Vec<PatternRecord>` of currently-active patterns.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PatternLibraryError;
use crate::model::PatternRecord;

/// Anything that can produce the set of currently-active pattern records.
/// A real deployment backs this with a document-store query
/// (`{active: true}`, per spec.md §6); this crate ships two non-networked
/// implementations for tests, fixtures, and the CLI.
pub trait PatternSource {
    fn load_active(&self) -> Result<Vec<PatternRecord>, PatternLibraryError>;
}

/// Loads pattern records from a JSON file containing an array of
/// `PatternRecord` objects, filtering to `active == true`. Mirrors the
/// teacher's `stocks::load_stocks_from_cache` JSON-cache idiom.
pub struct JsonFilePatternSource {
    path: PathBuf,
}

impl JsonFilePatternSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl PatternSource for JsonFilePatternSource {
    fn load_active(&self) -> Result<Vec<PatternRecord>, PatternLibraryError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            PatternLibraryError::StoreUnreachable(format!(
                "{}: {e}",
                self.path.display()
            ))
        })?;
        let records: Vec<PatternRecord> = serde_json::from_str(&contents)
            .map_err(|e| PatternLibraryError::Malformed(e.to_string()))?;
        Ok(records.into_iter().filter(|r| r.active).collect())
    }
}

/// Wraps an in-memory `Vec<PatternRecord>`, for unit tests that want to
/// construct a tiny library inline without touching the filesystem.
pub struct InMemoryPatternSource {
    records: Vec<PatternRecord>,
}

impl InMemoryPatternSource {
    pub fn new(records: Vec<PatternRecord>) -> Self {
        Self { records }
    }
}

impl PatternSource for InMemoryPatternSource {
    fn load_active(&self) -> Result<Vec<PatternRecord>, PatternLibraryError> {
        Ok(self.records.iter().filter(|r| r.active).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn json_file_source_filters_inactive_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"type": "market_term", "term": "Market for", "priority": 1, "active": true}},
                {{"type": "market_term", "term": "Market near", "priority": 2, "active": false}}
            ]"#
        )
        .unwrap();

        let source = JsonFilePatternSource::new(file.path());
        let records = source.load_active().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].term, "Market for");
    }

    #[test]
    fn json_file_source_reports_unreachable_path() {
        let source = JsonFilePatternSource::new("/nonexistent/path/patterns.json");
        assert!(matches!(
            source.load_active(),
            Err(PatternLibraryError::StoreUnreachable(_))
        ));
    }
}
