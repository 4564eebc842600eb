//! Record building: pair a table's header row with each data row.

use serde_json::{Map, Value};

use crate::detect::Table;
use crate::text;

/// One extracted row as an ordered header → value mapping.
///
/// `serde_json` is built with `preserve_order`, so keys serialize in column
/// order rather than alphabetically.
pub type Record = Map<String, Value>;

/// Convert detected tables into a flat record sequence.
///
/// Row 0 of each table supplies the column headers; every later row becomes
/// one record. Tables with no rows, or whose header row has no cells, are
/// skipped. Ordering is table order, then row order.
pub fn records_from_tables(tables: &[Table]) -> Vec<Record> {
    let mut records = Vec::new();

    for table in tables {
        let Some((header_row, data_rows)) = table.rows.split_first() else {
            continue;
        };
        // A header row of junk placeholders carries no column names at all;
        // treat it like a missing header rather than inventing column_N keys.
        if header_row.iter().all(|cell| text::clean(cell).is_none()) {
            continue;
        }

        let keys = header_keys(header_row);

        for row in data_rows {
            let mut record = Record::new();
            for (i, key) in keys.iter().enumerate() {
                // A row shorter than the header contributes empty cells;
                // surplus cells beyond the header are dropped.
                let value = row
                    .get(i)
                    .and_then(|cell| text::clean(cell))
                    .unwrap_or_default();
                record.insert(key.clone(), Value::String(value));
            }
            records.push(record);
        }
    }

    records
}

/// Turn header cells into unique record keys.
///
/// Blank headers become `column_N` (1-based); a repeated header gets a
/// `_2`, `_3`, … suffix so no column is silently merged or dropped.
fn header_keys(header_row: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(header_row.len());

    for (i, cell) in header_row.iter().enumerate() {
        let base = text::clean(cell).unwrap_or_else(|| format!("column_{}", i + 1));
        let mut key = base.clone();
        let mut n = 2;
        while keys.contains(&key) {
            key = format!("{base}_{n}");
            n += 1;
        }
        keys.push(key);
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn to_json(records: &[Record]) -> Value {
        serde_json::to_value(records).unwrap()
    }

    #[test]
    fn test_header_and_data_rows() {
        let records = records_from_tables(&[table(&[&["A", "B"], &["1", "2"], &["3", "4"]])]);
        assert_eq!(
            to_json(&records),
            serde_json::json!([{"A": "1", "B": "2"}, {"A": "3", "B": "4"}])
        );
    }

    #[test]
    fn test_header_only_table_yields_no_records() {
        let records = records_from_tables(&[table(&[&["A", "B"]])]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_empty_table_skipped() {
        let records = records_from_tables(&[Table::default(), table(&[&["A"], &["1"]])]);
        assert_eq!(to_json(&records), serde_json::json!([{"A": "1"}]));
    }

    #[test]
    fn test_short_row_padded_with_empty_strings() {
        let records = records_from_tables(&[table(&[&["A", "B", "C"], &["1"]])]);
        assert_eq!(to_json(&records), serde_json::json!([{"A": "1", "B": "", "C": ""}]));
    }

    #[test]
    fn test_long_row_surplus_cells_dropped() {
        let records = records_from_tables(&[table(&[&["A", "B"], &["1", "2", "3"]])]);
        assert_eq!(to_json(&records), serde_json::json!([{"A": "1", "B": "2"}]));
    }

    #[test]
    fn test_all_junk_header_row_skips_table() {
        let records = records_from_tables(&[
            table(&[&["-", "N/A"], &["1", "2"]]),
            table(&[&["A"], &["3"]]),
        ]);
        assert_eq!(to_json(&records), serde_json::json!([{"A": "3"}]));
    }

    #[test]
    fn test_blank_and_duplicate_headers_disambiguated() {
        let records = records_from_tables(&[table(&[&["", "X", "X"], &["1", "2", "3"]])]);
        assert_eq!(
            to_json(&records),
            serde_json::json!([{"column_1": "1", "X": "2", "X_2": "3"}])
        );
    }

    #[test]
    fn test_multiple_tables_concatenate_in_order() {
        let records = records_from_tables(&[
            table(&[&["A"], &["1"]]),
            table(&[&["B"], &["2"], &["3"]]),
        ]);
        assert_eq!(
            to_json(&records),
            serde_json::json!([{"A": "1"}, {"B": "2"}, {"B": "3"}])
        );
    }

    #[test]
    fn test_junk_cell_values_become_empty() {
        let records = records_from_tables(&[table(&[&["A", "B"], &["N/A", "ok"]])]);
        assert_eq!(to_json(&records), serde_json::json!([{"A": "", "B": "ok"}]));
    }
}
