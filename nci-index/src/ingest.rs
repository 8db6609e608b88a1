//! Record ingestion from delimited files.

use nci_common::error::ResultExt;
use nci_common::{Error, Result};
use std::path::Path;

use crate::record::Record;
use crate::table::Table;

/// Header aliases per logical column, tried in order.
pub const DATE_ALIASES: &[&str] = &["date", "日期"];
pub const TEXT_ALIASES: &[&str] = &["text", "內容", "content", "文本"];
pub const SOURCE_ALIASES: &[&str] = &["source", "來源", "source_name"];
pub const LABEL_ALIASES: &[&str] = &["label", "auto_label", "標籤"];
pub const MANUAL_LABEL_ALIASES: &[&str] = &["manual_label", "label_manual", "人工標註"];

/// Resolved column positions. `None` means the column is absent and reads empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: Option<usize>,
    pub text: Option<usize>,
    pub source: Option<usize>,
    pub label: Option<usize>,
    pub manual_label: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(table: &Table) -> Self {
        Self {
            date: table.column(DATE_ALIASES),
            text: table.column(TEXT_ALIASES),
            source: table.column(SOURCE_ALIASES),
            label: table.column(LABEL_ALIASES),
            manual_label: table.column(MANUAL_LABEL_ALIASES),
        }
    }
}

/// Build records from a parsed table.
pub fn records_from_table(table: &Table) -> Vec<Record> {
    let columns = ColumnMap::resolve(table);

    if columns.date.is_none() || columns.text.is_none() {
        tracing::warn!(
            headers = ?table.headers,
            "Date or text column not found; affected values read as empty"
        );
    }

    let cell = |row: usize, column: Option<usize>| {
        column
            .map(|c| table.cell(row, c).to_string())
            .unwrap_or_default()
    };
    let optional =
        |row: usize, column: Option<usize>| column.map(|c| table.cell(row, c).to_string());

    (0..table.len())
        .map(|row| Record {
            date: cell(row, columns.date),
            source: cell(row, columns.source),
            text: cell(row, columns.text),
            label: optional(row, columns.label),
            manual_label: optional(row, columns.manual_label),
        })
        .collect()
}

/// Parse records from delimited text.
pub fn parse_records(text: &str) -> Vec<Record> {
    records_from_table(&Table::parse(text))
}

/// Read and parse a whole file.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    if !path.exists() {
        return Err(Error::NotFound(format!("input table {}", path.display())));
    }
    let content =
        std::fs::read_to_string(path).context(format!("reading {}", path.display()))?;

    let records = parse_records(&content);
    tracing::info!(path = %path.display(), records = records.len(), "Loaded input table");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_alias_resolution() {
        let records = parse_records("日期,內容,來源,標籤\n2022-08-01,台灣是紅線,外交部,2\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2022-08-01");
        assert_eq!(records[0].text, "台灣是紅線");
        assert_eq!(records[0].source, "外交部");
        assert_eq!(records[0].label.as_deref(), Some("2"));
        assert_eq!(records[0].manual_label, None);
    }

    #[test]
    fn test_missing_columns_read_empty() {
        let records = parse_records("when,body\n2022-08-01,hello\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "");
        assert_eq!(records[0].text, "");
    }

    #[test]
    fn test_bom_header_and_case() {
        let records = parse_records("\u{feff}DATE,Text,Source_Name\n2022/8/1,x,y\n");
        assert_eq!(records[0].date, "2022/8/1");
        assert_eq!(records[0].source, "y");
    }

    #[test]
    fn test_load_records_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "date\ttext\n2022-08-01\t台灣\n2022-08-02\t兩岸\n").unwrap();
        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text, "兩岸");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_records(Path::new("/nonexistent/input.csv")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.exit_code(), 66);
        assert!(err.to_string().contains("/nonexistent/input.csv"));
    }
}
