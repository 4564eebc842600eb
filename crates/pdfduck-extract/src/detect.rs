//! Table detection from text position analysis (stream mode).
//!
//! Detects tables by looking for runs of baselines whose spans align on
//! shared column X positions, without relying on ruling lines. The backend
//! has already split each baseline into spans at wide horizontal gaps, so a
//! table row arrives as one span per cell.

use crate::backend::TextSpan;
use crate::text;

/// A detected table: ordered rows of ordered cell strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider a region a table.
    pub min_rows: usize,
    /// Minimum number of aligned columns.
    pub min_columns: usize,
    /// Y tolerance for grouping spans into one baseline row (points).
    pub y_tolerance: f32,
    /// X tolerance for clustering span left edges into a column (points).
    pub column_tolerance: f32,
    /// Fraction of a region's rows that must populate a column for the
    /// column to count (filters incidental alignment in prose).
    pub min_alignment_ratio: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            y_tolerance: 3.0,
            column_tolerance: 12.0,
            min_alignment_ratio: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TableDetector {
    pub fn new() -> Self {
        Self {
            config: TableDetectorConfig::default(),
        }
    }

    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables among the spans of one page, top to bottom.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<Table> {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            return Vec::new();
        }

        let rows = self.group_into_rows(spans);

        let mut tables = Vec::new();
        for region in self.candidate_regions(&rows) {
            if let Some(table) = self.build_table(&rows[region.0..region.1]) {
                tables.push(table);
            }
        }

        tracing::debug!(
            spans = spans.len(),
            rows = rows.len(),
            tables = tables.len(),
            "table detection"
        );
        tables
    }

    /// Group spans into baseline rows by Y position, each row sorted by X.
    fn group_into_rows<'a>(&self, spans: &'a [TextSpan]) -> Vec<Vec<&'a TextSpan>> {
        let mut sorted: Vec<&TextSpan> = spans.iter().collect();
        sorted.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.x0.partial_cmp(&b.x0)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        let mut rows: Vec<Vec<&TextSpan>> = Vec::new();
        for span in sorted {
            match rows.last_mut() {
                Some(row) if (span.y - row[0].y).abs() <= self.config.y_tolerance => {
                    row.push(span);
                }
                _ => rows.push(vec![span]),
            }
        }
        for row in &mut rows {
            row.sort_by(|a, b| {
                a.x0.partial_cmp(&b.x0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        rows
    }

    /// Maximal runs of consecutive rows that each carry at least
    /// `min_columns` spans. Returns half-open row index ranges.
    fn candidate_regions(&self, rows: &[Vec<&TextSpan>]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if row.len() >= self.config.min_columns {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len()));
            }
        }
        regions
    }

    /// Derive the column grid for a region and fill in the cells.
    /// Returns `None` when too few columns align across the rows.
    fn build_table(&self, rows: &[Vec<&TextSpan>]) -> Option<Table> {
        let columns = self.detect_columns(rows)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = vec![String::new(); columns.len()];
            for span in row {
                let col = nearest_column(&columns, span.x0);
                let cleaned = text::clean(&span.text).unwrap_or_default();
                if cleaned.is_empty() {
                    continue;
                }
                if cells[col].is_empty() {
                    cells[col] = cleaned;
                } else {
                    // Two spans landed in one cell (wrapped text): join.
                    cells[col].push(' ');
                    cells[col].push_str(&cleaned);
                }
            }
            out.push(cells);
        }
        Some(Table { rows: out })
    }

    /// Cluster span left edges into column X positions, keeping clusters
    /// populated in enough of the region's rows.
    fn detect_columns(&self, rows: &[Vec<&TextSpan>]) -> Option<Vec<f32>> {
        // (x0, row index) for every span in the region
        let mut edges: Vec<(f32, usize)> = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            for span in row {
                edges.push((span.x0, i));
            }
        }
        edges.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        struct Cluster {
            sum: f32,
            count: usize,
            last: f32,
            rows: std::collections::HashSet<usize>,
        }

        let mut clusters: Vec<Cluster> = Vec::new();
        for (x, row) in edges {
            match clusters.last_mut() {
                Some(c) if x - c.last <= self.config.column_tolerance => {
                    c.sum += x;
                    c.count += 1;
                    c.last = x;
                    c.rows.insert(row);
                }
                _ => {
                    let mut rows_set = std::collections::HashSet::new();
                    rows_set.insert(row);
                    clusters.push(Cluster {
                        sum: x,
                        count: 1,
                        last: x,
                        rows: rows_set,
                    });
                }
            }
        }

        let needed = ((rows.len() as f32) * self.config.min_alignment_ratio).ceil() as usize;
        let columns: Vec<f32> = clusters
            .iter()
            .filter(|c| c.rows.len() >= needed.max(1))
            .map(|c| c.sum / c.count as f32)
            .collect();

        if columns.len() < self.config.min_columns {
            return None;
        }
        Some(columns)
    }
}

fn nearest_column(columns: &[f32], x: f32) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, col) in columns.iter().enumerate() {
        let dist = (x - col).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x0: f32, y: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            x0,
            x1: x0 + 30.0,
            y,
            font_size: 10.0,
        }
    }

    #[test]
    fn test_detects_aligned_grid() {
        let spans = vec![
            span("Name", 50.0, 100.0),
            span("Qty", 200.0, 100.0),
            span("Price", 350.0, 100.0),
            span("Widget", 50.0, 114.0),
            span("2", 200.0, 114.0),
            span("9.99", 350.0, 114.0),
            span("Gadget", 50.0, 128.0),
            span("1", 200.0, 128.0),
            span("24.00", 350.0, 128.0),
        ];
        let tables = TableDetector::new().detect(&spans);
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].rows,
            vec![
                vec!["Name", "Qty", "Price"],
                vec!["Widget", "2", "9.99"],
                vec!["Gadget", "1", "24.00"],
            ]
        );
    }

    #[test]
    fn test_prose_lines_are_not_a_table() {
        // One span per baseline: no grid structure.
        let spans = vec![
            span("This is a sentence of ordinary text", 50.0, 100.0),
            span("spread over several lines without", 50.0, 114.0),
            span("any columnar structure at all here", 50.0, 128.0),
            span("and one more line for good measure", 50.0, 142.0),
        ];
        assert!(TableDetector::new().detect(&spans).is_empty());
    }

    #[test]
    fn test_y_tolerance_groups_wobbly_baselines() {
        let spans = vec![
            span("A", 50.0, 100.0),
            span("B", 200.0, 101.5),
            span("1", 50.0, 115.0),
            span("2", 200.0, 116.0),
        ];
        let tables = TableDetector::new().detect(&spans);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows, vec![vec!["A", "B"], vec!["1", "2"]]);
    }

    #[test]
    fn test_missing_cell_becomes_empty_string() {
        // Three-column grid; the middle row has no value in column B.
        let spans = vec![
            span("A", 50.0, 100.0),
            span("B", 200.0, 100.0),
            span("C", 350.0, 100.0),
            span("1", 50.0, 114.0),
            span("3", 350.0, 114.0),
            span("4", 50.0, 128.0),
            span("5", 200.0, 128.0),
            span("6", 350.0, 128.0),
        ];
        let tables = TableDetector::new().detect(&spans);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows[1], vec!["1", "", "3"]);
    }

    #[test]
    fn test_table_below_prose_paragraph() {
        let spans = vec![
            span("Shipment summary for the attached consignment", 50.0, 60.0),
            span("prepared on request of the consignor.", 50.0, 74.0),
            span("Code", 50.0, 120.0),
            span("Amount", 250.0, 120.0),
            span("FOB", 50.0, 134.0),
            span("1200.00", 250.0, 134.0),
        ];
        let tables = TableDetector::new().detect(&spans);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[1], vec!["FOB", "1200.00"]);
    }
}
