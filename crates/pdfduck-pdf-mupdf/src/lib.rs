use std::path::Path;

use mupdf::{Document, TextPageFlags};

use pdfduck_extract::{ExtractError, PageContent, PdfBackend, TextSpan};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// The mupdf dependency (AGPL-3.0) lives only in this crate; everything
/// else in the workspace sees PDFs through the [`PdfBackend`] seam.
///
/// Each text line is split into spans wherever the horizontal gap between
/// consecutive characters exceeds `column_gap_em` times the font size.
/// Table cells sharing a baseline are separated by gaps far wider than a
/// word space, so they arrive at the detector as individual spans while
/// ordinary prose stays whole.
pub struct MupdfBackend {
    /// Gap width, in em units of the current font size, at which a line is
    /// split into separate spans. Default 2.0.
    column_gap_em: f32,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self { column_gap_em: 2.0 }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the span-splitting gap threshold in em units.
    pub fn with_column_gap(mut self, em: f32) -> Self {
        self.column_gap_em = em;
        self
    }
}

impl PdfBackend for MupdfBackend {
    fn load_pages(&self, path: &Path) -> Result<Vec<PageContent>, ExtractError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ExtractError::Parse("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| ExtractError::Parse(e.to_string()))?;

        let mut pages = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| ExtractError::Parse(e.to_string()))?
        {
            let page = page_result.map_err(|e| ExtractError::Extraction(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| ExtractError::Extraction(e.to_string()))?;

            let mut text = String::new();
            let mut spans = Vec::new();

            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_bounds = line.bounds();
                    let baseline_y = (line_bounds.y0 + line_bounds.y1) / 2.0;

                    let mut builder = SpanBuilder::new(baseline_y);

                    for ch in line.chars() {
                        let c = ch.char().unwrap_or('\u{FFFD}');
                        let quad = ch.quad();
                        let x0 = quad.ul.x;
                        let x1 = quad.lr.x;
                        // Character height stands in for the font size.
                        let size = (quad.ll.y - quad.ul.y).abs();

                        let gap_threshold = (self.column_gap_em * size).max(4.0);
                        if builder.gap_to(x0) > gap_threshold {
                            builder.flush(&mut spans);
                        }
                        builder.push(c, x0, x1, size);
                        text.push(c);
                    }

                    builder.flush(&mut spans);
                    text.push('\n');
                }
            }

            pages.push(PageContent { text, spans });
        }

        Ok(pages)
    }
}

/// Accumulates characters of one line into gap-separated spans.
struct SpanBuilder {
    y: f32,
    text: String,
    x0: f32,
    x1: f32,
    size_sum: f32,
    size_count: usize,
}

impl SpanBuilder {
    fn new(y: f32) -> Self {
        Self {
            y,
            text: String::new(),
            x0: 0.0,
            x1: 0.0,
            size_sum: 0.0,
            size_count: 0,
        }
    }

    /// Horizontal distance from the end of the current span to `x`.
    /// Zero while the span is empty so the first character never splits.
    fn gap_to(&self, x: f32) -> f32 {
        if self.text.trim().is_empty() {
            0.0
        } else {
            x - self.x1
        }
    }

    fn push(&mut self, c: char, x0: f32, x1: f32, size: f32) {
        if self.text.trim().is_empty() && !c.is_whitespace() {
            self.x0 = x0;
        }
        self.text.push(c);
        if x1 > self.x1 {
            self.x1 = x1;
        }
        if !c.is_whitespace() {
            self.size_sum += size;
            self.size_count += 1;
        }
    }

    fn flush(&mut self, spans: &mut Vec<TextSpan>) {
        let trimmed = self.text.trim();
        if !trimmed.is_empty() {
            spans.push(TextSpan {
                text: trimmed.to_string(),
                x0: self.x0,
                x1: self.x1,
                y: self.y,
                font_size: if self.size_count > 0 {
                    self.size_sum / self.size_count as f32
                } else {
                    0.0
                },
            });
        }
        self.text.clear();
        self.x0 = 0.0;
        self.x1 = 0.0;
        self.size_sum = 0.0;
        self.size_count = 0;
    }
}
