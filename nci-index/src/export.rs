//! CSV export of the index series.

use nci_common::config::Mode;
use nci_common::error::ResultExt;
use nci_common::Result;
use std::path::Path;

use crate::pipeline::CompositeResult;
use crate::table::{Delimiter, Table};

pub const HEADER: &str = "date,nci,intent_justify,intent_deter,intent_escalate";
pub const LABEL_HEADER: &str = "date,nci";

const BOM: &str = "\u{feff}";
const CRLF: &str = "\r\n";

/// Render the series as CSV: UTF-8 BOM, CRLF line endings, six decimals.
///
/// Label-mode results only carry the composite column.
pub fn render_csv(result: &CompositeResult) -> String {
    let header = match result.mode {
        Mode::HitCount => HEADER,
        Mode::Label => LABEL_HEADER,
    };
    let mut table = Table::new(
        Delimiter::Comma,
        header.split(',').map(str::to_string).collect(),
    );

    let columns: Vec<&[f64]> = match result.mode {
        Mode::HitCount => vec![
            result.nci.as_slice(),
            result.justify_idx.as_slice(),
            result.deter_idx.as_slice(),
            result.escalate_idx.as_slice(),
        ],
        Mode::Label => vec![result.nci.as_slice()],
    };

    for (i, day) in result.dates.iter().enumerate() {
        let mut row = vec![day.format("%Y-%m-%d").to_string()];
        row.extend(
            columns
                .iter()
                .map(|series| format!("{:.6}", series.get(i).copied().unwrap_or_default())),
        );
        table.push_row(row);
    }

    format!("{}{}", BOM, table.render(CRLF))
}

/// Write the CSV to `path`.
pub fn write_csv(result: &CompositeResult, path: &Path) -> Result<()> {
    std::fs::write(path, render_csv(result)).context(format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = result.dates.len(), "CSV written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn result(mode: Mode) -> CompositeResult {
        CompositeResult {
            mode,
            dates: vec![
                NaiveDate::from_ymd_opt(2022, 8, 3).unwrap(),
                NaiveDate::from_ymd_opt(2022, 8, 4).unwrap(),
            ],
            nci: vec![0.5, 1.0 / 3.0],
            justify_idx: vec![0.0, 1.0],
            deter_idx: vec![0.25, 0.0],
            escalate_idx: vec![1.0, 0.125],
            ..Default::default()
        }
    }

    #[test]
    fn test_render_hit_count_csv() {
        let csv = render_csv(&result(Mode::HitCount));
        assert!(csv.starts_with('\u{feff}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').split("\r\n").collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "2022-08-03,0.500000,0.000000,0.250000,1.000000");
        assert_eq!(lines[2], "2022-08-04,0.333333,1.000000,0.000000,0.125000");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_render_label_csv() {
        let csv = render_csv(&result(Mode::Label));
        assert_eq!(
            csv,
            "\u{feff}date,nci\r\n2022-08-03,0.500000\r\n2022-08-04,0.333333\r\n"
        );
    }

    #[test]
    fn test_empty_result_has_header_only() {
        let csv = render_csv(&CompositeResult::default());
        assert_eq!(csv, format!("\u{feff}{}\r\n", HEADER));
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nci.csv");
        write_csv(&result(Mode::HitCount), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_csv(&result(Mode::HitCount)));
    }
}
