//! Relevance filtering.
//!
//! Splits record text into sentences and keeps only those that mention the
//! anchor topic together with scored vocabulary. Reporter questions can be
//! removed up front so that only the spokesperson's answers are scored.

use nci_common::config::Mode;
use nci_common::{Error, Result};
use regex::Regex;

use crate::lexicon::Lexicon;

/// Sentence terminators; the split happens after the character.
pub const SENTENCE_TERMINATORS: &[char] = &['。', '！', '？', '!', '?', '；', ';'];

/// Fallback delimiters for loosely punctuated text.
pub const CLAUSE_DELIMITERS: &[char] = &['，', ',', '、'];

/// Line-start markers of a question from the press.
const REPORTER_QUESTION_PATTERN: &str = concat!(
    r"(?m)^[ \t\x{3000}]*(?:",
    r"[（(][^）)\n]*(?:記者|记者)[^）)\n]*[）)]",
    r"|(?:記者|记者)[^:：\n]{0,16}[:：]",
    r"|(?:提問|提问|問|问)[ \t]*[:：]",
    r"|(?i:q|reporter|question)[ \t]*[:：]",
    r")"
);

/// Collapse whitespace runs to one space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split after any of `delims`, trimming pieces and dropping empty ones.
fn split_after(text: &str, delims: &[char]) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if delims.contains(&ch) {
            let piece = current.trim();
            if !piece.is_empty() {
                out.push(piece.to_string());
            }
            current.clear();
        }
    }

    let piece = current.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }

    out
}

/// Split text into sentences.
///
/// Breaks after `。！？!?；;` and at line breaks. When that yields at most one
/// sentence, the text is split on commas and enumeration marks instead.
pub fn split_sentences(text: &str) -> Vec<String> {
    let sentences: Vec<String> = text
        .lines()
        .map(collapse_whitespace)
        .flat_map(|line| split_after(&line, SENTENCE_TERMINATORS))
        .collect();

    if sentences.len() <= 1 {
        return sentences
            .iter()
            .flat_map(|s| split_after(s, CLAUSE_DELIMITERS))
            .collect();
    }

    sentences
}

/// Sentence-level topical gate.
pub struct RelevanceFilter<'a> {
    lexicon: &'a Lexicon,
    mode: Mode,
    reporter_question: Option<Regex>,
}

impl<'a> RelevanceFilter<'a> {
    /// Create a filter. With `drop_reporter_questions` off, no record is
    /// discarded for its opening marker.
    pub fn new(lexicon: &'a Lexicon, mode: Mode, drop_reporter_questions: bool) -> Result<Self> {
        let reporter_question = if drop_reporter_questions {
            Some(
                Regex::new(REPORTER_QUESTION_PATTERN)
                    .map_err(|e| Error::Config(format!("reporter question pattern: {}", e)))?,
            )
        } else {
            None
        };

        Ok(Self {
            lexicon,
            mode,
            reporter_question,
        })
    }

    /// Whether `text` opens a line with a reporter-question marker.
    pub fn is_reporter_question(&self, text: &str) -> bool {
        self.reporter_question
            .as_ref()
            .is_some_and(|re| re.is_match(text.trim()))
    }

    /// Whether a single sentence is in scope.
    ///
    /// Hit-count mode also requires a bag term or a general keyword; label
    /// mode only needs the anchor.
    pub fn keep_sentence(&self, sentence: &str) -> bool {
        if !self.lexicon.has_anchor(sentence) {
            return false;
        }
        match self.mode {
            Mode::HitCount => {
                self.lexicon.has_bag_term(sentence) || self.lexicon.keywords().is_match(sentence)
            }
            Mode::Label => true,
        }
    }

    /// Retained sentences of a record, or `None` when the record is dropped.
    pub fn retain(&self, text: &str) -> Option<Vec<String>> {
        if self.is_reporter_question(text) {
            tracing::trace!("Dropping reporter question");
            return None;
        }

        let kept: Vec<String> = split_sentences(text)
            .into_iter()
            .filter(|s| self.keep_sentence(s))
            .collect();

        if kept.is_empty() {
            None
        } else {
            Some(kept)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::TermSet;

    fn lexicon() -> Lexicon {
        let set = |t: &[&str]| TermSet::new(t.iter().copied()).unwrap();
        Lexicon::new(
            set(&["紅線"]),
            set(&["反制"]),
            set(&["行動"]),
            set(&["台灣", "兩岸"]),
            set(&["軍演"]),
        )
        .unwrap()
    }

    #[test]
    fn test_split_on_terminators_and_newlines() {
        let s = split_sentences("第一句。第二句！\n第三  句\r\n\n第四句?");
        assert_eq!(s, vec!["第一句。", "第二句！", "第三 句", "第四句?"]);
    }

    #[test]
    fn test_split_falls_back_to_commas() {
        let s = split_sentences("台灣是紅線，大陸必將採取反制行動");
        assert_eq!(s, vec!["台灣是紅線，", "大陸必將採取反制行動"]);

        let s = split_sentences("甲、乙、丙");
        assert_eq!(s, vec!["甲、", "乙、", "丙"]);
    }

    #[test]
    fn test_split_empty_text() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("  \n \t ").is_empty());
    }

    #[test]
    fn test_keep_requires_anchor_and_term_in_hit_count_mode() {
        let lex = lexicon();
        let filter = RelevanceFilter::new(&lex, Mode::HitCount, true).unwrap();
        assert!(filter.keep_sentence("台灣是紅線"));
        assert!(filter.keep_sentence("台灣附近軍演"));
        assert!(!filter.keep_sentence("台灣天氣晴朗"));
        assert!(!filter.keep_sentence("必將採取反制行動"));
    }

    #[test]
    fn test_label_mode_only_needs_anchor() {
        let lex = lexicon();
        let filter = RelevanceFilter::new(&lex, Mode::Label, true).unwrap();
        assert!(filter.keep_sentence("兩岸天氣晴朗"));
        assert!(!filter.keep_sentence("天氣晴朗"));
    }

    #[test]
    fn test_reporter_question_markers() {
        let lex = lexicon();
        let filter = RelevanceFilter::new(&lex, Mode::HitCount, true).unwrap();
        assert!(filter.is_reporter_question("記者：請問發言人..."));
        assert!(filter.is_reporter_question("  （路透社記者）台灣紅線？"));
        assert!(filter.is_reporter_question("Q: what about 台灣"));
        assert!(filter.is_reporter_question("答：台灣是紅線。\n問：還有嗎？"));
        assert!(filter.is_reporter_question("Reporter： 台灣"));
        assert!(!filter.is_reporter_question("台灣是紅線，記者會上重申。"));
    }

    #[test]
    fn test_reporter_drop_disabled() {
        let lex = lexicon();
        let filter = RelevanceFilter::new(&lex, Mode::HitCount, false).unwrap();
        assert!(!filter.is_reporter_question("記者：台灣是紅線"));
        assert_eq!(
            filter.retain("記者：台灣是紅線"),
            Some(vec!["記者：台灣是紅線".to_string()])
        );
    }

    #[test]
    fn test_retain_drops_records_without_kept_sentences() {
        let lex = lexicon();
        let filter = RelevanceFilter::new(&lex, Mode::HitCount, true).unwrap();
        assert_eq!(filter.retain("今天天氣很好。明天也是。"), None);
        assert_eq!(filter.retain("記者：請問發言人對台灣紅線怎麼看？"), None);
        assert_eq!(
            filter.retain("天氣很好。台灣是紅線！我們會反制。"),
            Some(vec!["台灣是紅線！".to_string()])
        );
    }
}
