use std::path::Path;

use crate::ExtractError;

/// A positioned run of text on a page.
///
/// Backends split each baseline into spans at wide horizontal gaps, so that
/// table cells sharing a baseline arrive as separate spans while ordinary
/// prose stays in one piece.
#[derive(Debug, Clone)]
pub struct TextSpan {
    pub text: String,
    /// Left edge, in PDF points.
    pub x0: f32,
    /// Right edge, in PDF points.
    pub x1: f32,
    /// Baseline Y position, in PDF points (top-down).
    pub y: f32,
    /// Approximate font size of the span's characters.
    pub font_size: f32,
}

/// Extracted content of a single page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Plain text of the page, lines joined with `\n`.
    pub text: String,
    /// Positioned spans, in reading order.
    pub spans: Vec<TextSpan>,
}

/// Trait for PDF parsing backends.
///
/// Implementors provide the low-level parsing step; table detection, record
/// building, and fallback field matching live in [`crate::Extractor`].
pub trait PdfBackend: Send + Sync {
    /// Parse a PDF file into per-page content.
    ///
    /// A malformed or empty file fails with [`ExtractError::Parse`].
    fn load_pages(&self, path: &Path) -> Result<Vec<PageContent>, ExtractError>;
}

pub mod mock {
    //! Mock PDF backend for testing.

    use std::path::Path;

    use super::{PageContent, PdfBackend};
    use crate::ExtractError;

    /// A canned-response backend: returns fixed pages or a fixed parse error,
    /// ignoring the path entirely. Lets pipeline and handler tests run
    /// without a real PDF or the native parsing library.
    pub struct MockBackend {
        pages: Vec<PageContent>,
        fail_with: Option<String>,
    }

    impl MockBackend {
        /// A mock that always returns `pages`.
        pub fn with_pages(pages: Vec<PageContent>) -> Self {
            Self {
                pages,
                fail_with: None,
            }
        }

        /// A mock whose every load fails with a parse error.
        pub fn failing(message: &str) -> Self {
            Self {
                pages: Vec::new(),
                fail_with: Some(message.to_string()),
            }
        }
    }

    impl PdfBackend for MockBackend {
        fn load_pages(&self, _path: &Path) -> Result<Vec<PageContent>, ExtractError> {
            match &self.fail_with {
                Some(message) => Err(ExtractError::Parse(message.clone())),
                None => Ok(self.pages.clone()),
            }
        }
    }
}
