//! Plain-text reports for the terminal.

use nci_common::config::{Mode, SeriesView};

use crate::lexicon::{Category, Lexicon};
use crate::pipeline::CompositeResult;

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────\n";

fn category_title(category: Category) -> &'static str {
    match category {
        Category::Justify => "Justify",
        Category::Deter => "Deter",
        Category::Escalate => "Escalate",
    }
}

/// Summary, proportions, top terms and the series table.
pub fn format_text_report(result: &CompositeResult, view: SeriesView) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("                 Narrative Coercion Index\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("  Records (filtered): {:>10}\n", result.count));
    report.push_str(&format!("  Coverage:           {:>23}\n", result.cover));
    report.push_str(&format!("  Mode:               {:>10}\n\n", result.mode));

    report.push_str("Bag totals\n");
    report.push_str(THIN_RULE);
    for category in Category::ALL {
        report.push_str(&format!(
            "  {:<10} {:>8}  {:>6.1}%\n",
            category_title(category),
            result.totals.get(category),
            result.proportions.get(category) * 100.0
        ));
    }
    report.push('\n');

    report.push_str(&format_terms_report(result));
    report.push_str(&format_series_table(result, view));

    report
}

/// Top terms per bag.
pub fn format_terms_report(result: &CompositeResult) -> String {
    let mut report = String::new();

    for category in Category::ALL {
        report.push_str(&format!("Top terms: {}\n", category_title(category)));
        report.push_str(THIN_RULE);

        let terms = result.top_terms.get(category);
        if terms.is_empty() {
            report.push_str("  (none)\n");
        }
        for (rank, t) in terms.iter().enumerate() {
            report.push_str(&format!(
                "  {:>2}. {:<16} {:>6}  {:>6.1}%\n",
                rank + 1,
                t.term,
                t.count,
                t.share * 100.0
            ));
        }
        report.push('\n');
    }

    report
}

/// Daily series, restricted to the columns selected by `view`.
pub fn format_series_table(result: &CompositeResult, view: SeriesView) -> String {
    let mut report = String::new();

    if result.is_empty() {
        report.push_str("No dated records in scope.\n");
        return report;
    }

    let mut columns: Vec<(&str, &[f64])> = Vec::new();
    let show = |v: SeriesView| view == SeriesView::All || view == v;

    if show(SeriesView::Nci) {
        columns.push(("nci", result.nci.as_slice()));
    }
    if show(SeriesView::Justify) {
        columns.push(("justify", result.justify_idx.as_slice()));
    }
    if show(SeriesView::Deter) {
        columns.push(("deter", result.deter_idx.as_slice()));
    }
    if show(SeriesView::Escalate) {
        columns.push(("escalate", result.escalate_idx.as_slice()));
    }

    report.push_str("Series\n");
    report.push_str(THIN_RULE);
    report.push_str("  date      ");
    for (name, _) in &columns {
        report.push_str(&format!(" {:>10}", name));
    }
    report.push('\n');

    for (i, day) in result.dates.iter().enumerate() {
        report.push_str(&format!("  {}", day.format("%Y-%m-%d")));
        for (_, series) in &columns {
            report.push_str(&format!(" {:>10.4}", series[i]));
        }
        report.push('\n');
    }

    if result.mode == Mode::Label {
        report.push_str("\n  (z-scored; values are not bounded to [0, 1])\n");
    }

    report
}

/// Render a sentence with `[J:term]`, `[D:term]` and `[E:term]` markers.
pub fn highlight_sentence(lexicon: &Lexicon, sentence: &str) -> String {
    lexicon
        .tokenize(sentence)
        .into_iter()
        .map(|span| match span.category {
            Some(category) => format!("[{}:{}]", category.key(), span.text),
            None => span.text.to_string(),
        })
        .collect()
}

/// Retained sentences of every record, highlighted.
pub fn format_highlights(result: &CompositeResult, lexicon: &Lexicon) -> String {
    let mut report = String::new();

    for retained in &result.retained {
        let date = retained
            .day
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| retained.record.date.clone());
        report.push_str(&format!("{} {}\n", date, retained.record.source));
        for sentence in &retained.sentences {
            report.push_str(&format!("  {}\n", highlight_sentence(lexicon, sentence)));
        }
    }

    report
}
