use std::path::Path;

use serde::Serialize;
use thiserror::Error;

pub mod backend;
pub mod detect;
pub mod fallback;
pub mod record;
pub mod text;

pub use backend::{PageContent, PdfBackend, TextSpan};
pub use detect::{Table, TableDetector, TableDetectorConfig};
pub use fallback::FallbackFields;
pub use record::Record;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to open PDF: {0}")]
    Parse(String),
    #[error("failed to extract content: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of running the extraction pipeline on one document.
///
/// Serialized untagged: a record list becomes a JSON array, fallback fields
/// become a JSON object. An empty record list is a valid successful result.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Extraction {
    Records(Vec<Record>),
    Fields(FallbackFields),
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        match self {
            Extraction::Records(records) => records.is_empty(),
            Extraction::Fields(fields) => fields.is_empty(),
        }
    }
}

/// The extraction pipeline.
///
/// Steps:
/// 1. Load pages (text + positioned spans) via the [`PdfBackend`]
/// 2. Detect tables on every page, accumulating in document order
/// 3. If any table was found, pair each table's header row with its data
///    rows into records
/// 4. Otherwise run the fixed invoice-field patterns over the full text
///
/// The table-vs-fallback choice is document-wide: a single table anywhere
/// in the document disables fallback matching entirely.
#[derive(Debug, Clone)]
pub struct Extractor {
    detector: TableDetector,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Create an extractor with default table detection settings.
    pub fn new() -> Self {
        Self {
            detector: TableDetector::new(),
        }
    }

    /// Create an extractor with a custom table detector.
    pub fn with_detector(detector: TableDetector) -> Self {
        Self { detector }
    }

    /// Run the full pipeline on a PDF file.
    pub fn extract(
        &self,
        backend: &dyn PdfBackend,
        path: &Path,
    ) -> Result<Extraction, ExtractError> {
        let pages = backend.load_pages(path)?;

        let mut tables: Vec<Table> = Vec::new();
        for page in &pages {
            tables.extend(self.detector.detect(&page.spans));
        }

        if !tables.is_empty() {
            let records = record::records_from_tables(&tables);
            tracing::debug!(
                tables = tables.len(),
                records = records.len(),
                "table extraction"
            );
            return Ok(Extraction::Records(records));
        }

        let full_text: String = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let fields = fallback::match_fields(&full_text);
        tracing::debug!(matched = !fields.is_empty(), "fallback extraction");

        if fields.is_empty() {
            // Nothing matched anywhere: an empty result, not an error.
            return Ok(Extraction::Records(Vec::new()));
        }
        Ok(Extraction::Fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;

    fn span(text: &str, x0: f32, y: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            x0,
            x1: x0 + 40.0,
            y,
            font_size: 10.0,
        }
    }

    /// Spans laid out as a 2-column, 3-row grid.
    fn table_page() -> PageContent {
        PageContent {
            text: "A B\n1 2\n3 4\n".to_string(),
            spans: vec![
                span("A", 50.0, 100.0),
                span("B", 200.0, 100.0),
                span("1", 50.0, 115.0),
                span("2", 200.0, 115.0),
                span("3", 50.0, 130.0),
                span("4", 200.0, 130.0),
            ],
        }
    }

    fn prose_page(text: &str) -> PageContent {
        let spans = text
            .lines()
            .enumerate()
            .map(|(i, line)| span(line, 50.0, 100.0 + 15.0 * i as f32))
            .collect();
        PageContent {
            text: text.to_string(),
            spans,
        }
    }

    #[test]
    fn test_table_produces_records() {
        let backend = MockBackend::with_pages(vec![table_page()]);
        let out = Extractor::new()
            .extract(&backend, Path::new("test.pdf"))
            .unwrap();

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"A": "1", "B": "2"}, {"A": "3", "B": "4"}])
        );
    }

    #[test]
    fn test_no_tables_falls_back_to_field_matching() {
        let backend = MockBackend::with_pages(vec![prose_page(
            "Invoice #1234\nDate: 2024-01-01\nTotal: $99.00\n",
        )]);
        let out = Extractor::new()
            .extract(&backend, Path::new("test.pdf"))
            .unwrap();

        match out {
            Extraction::Fields(fields) => {
                assert_eq!(fields.invoice_number.as_deref(), Some("1234"));
                assert_eq!(fields.invoice_date.as_deref(), Some("2024-01-01"));
                assert_eq!(fields.total_amount.as_deref(), Some("99.00"));
            }
            Extraction::Records(_) => panic!("expected fallback fields"),
        }
    }

    #[test]
    fn test_table_anywhere_disables_fallback() {
        // Page 1 is invoice-like prose, page 2 has a table: the table wins
        // and fallback must not run at all.
        let backend = MockBackend::with_pages(vec![
            prose_page("Invoice #1234\nTotal: $99.00\n"),
            table_page(),
        ]);
        let out = Extractor::new()
            .extract(&backend, Path::new("test.pdf"))
            .unwrap();
        assert!(matches!(out, Extraction::Records(ref r) if r.len() == 2));
    }

    #[test]
    fn test_nothing_found_is_empty_success() {
        let backend = MockBackend::with_pages(vec![prose_page("lorem ipsum\ndolor sit amet\n")]);
        let out = Extractor::new()
            .extract(&backend, Path::new("test.pdf"))
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(serde_json::to_value(&out).unwrap(), serde_json::json!([]));
    }

    #[test]
    fn test_parse_failure_propagates() {
        let backend = MockBackend::failing("not a PDF");
        let err = Extractor::new()
            .extract(&backend, Path::new("bad.pdf"))
            .unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn test_idempotence() {
        let backend = MockBackend::with_pages(vec![table_page()]);
        let extractor = Extractor::new();
        let a = extractor.extract(&backend, Path::new("test.pdf")).unwrap();
        let b = extractor.extract(&backend, Path::new("test.pdf")).unwrap();
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }
}
