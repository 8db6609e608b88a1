//! End-to-end integration tests for the index pipeline.
//!
//! Tests the complete flow:
//! Input table → Records → Relevance filter → Daily series → CSV / report

use std::io::Write;

use nci_common::config::{Mode, PipelineConfig, PrimaryMetric, SeriesView};
use nci_index::lexicon::TermSet;
use nci_index::table::Table;
use nci_index::{export, ingest, pipeline, report, Lexicon, Record};
use tempfile::NamedTempFile;

// ============================================================================
// Test Data
// ============================================================================

fn scenario_lexicon() -> Lexicon {
    let set = |t: &[&str]| TermSet::new(t.iter().copied()).unwrap();
    Lexicon::new(
        set(&["紅線"]),
        set(&["反制"]),
        set(&["行動"]),
        set(&["台灣"]),
        set(&[]),
    )
    .unwrap()
}

fn single_day_config() -> PipelineConfig {
    PipelineConfig {
        ma: 1,
        ..Default::default()
    }
}

const EXERCISE_TABLE: &str = "\u{feff}日期,內容,來源\r\n\
2022-08-02,台灣問題是中國內政，是紅線。,外交部\r\n\
2022-08-04,解放軍在台灣周邊展開聯合軍演，實彈射擊行動。,國防部\r\n\
2022-08-04,記者：請問台灣的反應？,外交部\r\n\
\r\n\
2022/8/6,\"台灣當局挑釁，我們將堅決反制，採取一切必要措施。\",國台辦\r\n\
2022-08-07,今天天氣晴朗。,氣象局\r\n";

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_single_day_record_is_retained_and_scored() {
    let records = vec![Record::new(
        "2022-08-03",
        "",
        "台灣是紅線，大陸必將採取反制行動",
    )];

    let result = pipeline::run(&records, &scenario_lexicon(), &single_day_config()).unwrap();

    assert_eq!(result.count, 1);
    assert_eq!(result.dates.len(), 1);
    assert_eq!(result.nci.len(), 1);
    let config = single_day_config();
    let expected = 0.5 * (config.w1 + config.w2 + config.w3);
    assert!((result.nci[0] - expected).abs() < 1e-12);
    assert!(result.nci[0] > 0.0);
}

#[test]
fn test_reporter_question_yields_empty_result() {
    let records = vec![Record::new("2022-08-03", "", "記者：請問發言人...")];
    let result = pipeline::run(&records, &scenario_lexicon(), &single_day_config()).unwrap();

    assert_eq!(result.count, 0);
    assert_eq!(result.cover, "~");
    assert!(result.dates.is_empty());
}

#[test]
fn test_quoted_csv_field_round_trips() {
    let table = Table::parse("text\n\"a,\"\"b\"\"\"\n");
    assert_eq!(table.cell(0, 0), "a,\"b\"");

    let reparsed = Table::parse(&table.to_text());
    assert_eq!(reparsed.cell(0, 0), "a,\"b\"");
}

// ============================================================================
// File Flow
// ============================================================================

#[test]
fn test_table_to_csv_with_builtin_lexicon() {
    let mut input = NamedTempFile::new().unwrap();
    input.write_all(EXERCISE_TABLE.as_bytes()).unwrap();

    let records = ingest::load_records(input.path()).unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(records[3].date, "2022/8/6");

    let lexicon = Lexicon::builtin().unwrap();
    let config = PipelineConfig {
        ma: 3,
        ..Default::default()
    };
    let result = pipeline::run(&records, &lexicon, &config).unwrap();

    // the reporter question and the weather report are dropped
    assert_eq!(result.count, 3);
    assert_eq!(result.cover, "2022-08-02 ~ 2022-08-06");
    assert_eq!(result.dates.len(), 5);
    for series in [
        &result.nci,
        &result.justify_idx,
        &result.deter_idx,
        &result.escalate_idx,
    ] {
        assert_eq!(series.len(), 5);
        assert!(series.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("nci.csv");
    export::write_csv(&result, &path).unwrap();

    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').split("\r\n").collect();
    assert_eq!(lines[0], export::HEADER);
    assert!(lines[1].starts_with("2022-08-02,"));
    assert_eq!(lines.len(), 7);

    let text = report::format_text_report(&result, SeriesView::Nci);
    assert!(text.contains("2022-08-02 ~ 2022-08-06"));
}

#[test]
fn test_label_mode_csv_has_composite_only() {
    let table = "date,text,label,manual_label\n\
2022-08-01,台灣情勢,1,\n\
2022-08-02,台灣情勢,1,3\n\
2022-08-03,台灣情勢,2,nan\n";

    let records = ingest::parse_records(table);
    let config = PipelineConfig {
        mode: Mode::Label,
        ma: 1,
        ..Default::default()
    };
    let result = pipeline::run(&records, &Lexicon::builtin().unwrap(), &config).unwrap();

    assert_eq!(result.count, 3);
    assert_eq!(result.totals.justify, 1);
    assert_eq!(result.totals.deter, 1);
    assert_eq!(result.totals.escalate, 1);

    let csv = export::render_csv(&result);
    assert!(csv.starts_with("\u{feff}date,nci\r\n"));
    assert_eq!(csv.matches("\r\n").count(), 4);
}

#[test]
fn test_keywords_metric_and_window() {
    let records = vec![
        Record::new("2022-08-01", "", "台灣軍演"),
        Record::new("2022-08-02", "", "台灣軍演，台灣實彈"),
        Record::new("2022-08-03", "", "台灣軍演，台灣實彈，台灣制裁"),
    ];
    let lexicon = Lexicon::builtin().unwrap();
    let config = PipelineConfig {
        ma: 1,
        primary_metric: PrimaryMetric::Keywords,
        w1: 1.0,
        w2: 0.0,
        w3: 0.0,
        win_start: chrono::NaiveDate::from_ymd_opt(2022, 8, 1),
        win_end: chrono::NaiveDate::from_ymd_opt(2022, 8, 2),
        ..Default::default()
    };
    let result = pipeline::run(&records, &lexicon, &config).unwrap();

    assert_eq!(result.nci[0], 0.0);
    assert_eq!(result.nci[1], 1.0);
    // outside the reference window, clamped
    assert_eq!(result.nci[2], 1.0);
}

#[test]
fn test_term_shares_bounded_per_bag() {
    let records = vec![Record::new("2022-08-01", "", "必要。必要。台灣必要！")];
    let lexicon = Lexicon::builtin().unwrap();
    let result = pipeline::run(&records, &lexicon, &single_day_config()).unwrap();

    assert_eq!(result.count, 1);
    let top = &result.top_terms.justify;
    assert_eq!(top[0].term, "必要");
    assert_eq!(top[0].count, 3);
    for bag in [
        &result.top_terms.justify,
        &result.top_terms.deter,
        &result.top_terms.escalate,
    ] {
        let sum: f64 = bag.iter().map(|t| t.share).sum();
        assert!(sum <= 1.0 + 1e-9);
    }
}
