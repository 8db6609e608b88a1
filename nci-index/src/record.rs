//! Input records.

use serde::{Deserialize, Serialize};

use crate::lexicon::Category;

/// One dated statement, as ingested. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Record {
    /// Raw date cell; parsed leniently during aggregation
    pub date: String,
    /// Publishing organ or speaker
    pub source: String,
    /// Statement text
    pub text: String,
    /// Automatic category label (label mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Manual annotation, preferred over `label` when usable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_label: Option<String>,
}

impl Record {
    pub fn new(date: impl Into<String>, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            source: source.into(),
            text: text.into(),
            label: None,
            manual_label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_manual_label(mut self, label: impl Into<String>) -> Self {
        self.manual_label = Some(label.into());
        self
    }

    /// Text the matcher sees: the statement followed by its source.
    pub fn scoring_text(&self) -> String {
        if self.source.is_empty() {
            self.text.clone()
        } else {
            format!("{} {}", self.text, self.source)
        }
    }

    /// The label to use: manual when present and meaningful, else automatic.
    pub fn effective_label(&self) -> Option<&str> {
        fn usable(label: &Option<String>) -> Option<&str> {
            label
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.eq_ignore_ascii_case("nan"))
        }

        usable(&self.manual_label).or_else(|| usable(&self.label))
    }

    /// Category from the effective label, if it maps to one.
    pub fn label_category(&self) -> Option<Category> {
        let raw = self.effective_label()?;
        let value: f64 = raw.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Category::from_label(value.trunc() as i64)
    }

    /// Whether the record mentions the focus string in its text or source.
    pub fn matches_focus(&self, focus: &str) -> bool {
        self.text.contains(focus) || self.source.contains(focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_text_appends_source() {
        let r = Record::new("2022-08-03", "外交部", "台灣是紅線");
        assert_eq!(r.scoring_text(), "台灣是紅線 外交部");
        let r = Record::new("2022-08-03", "", "台灣是紅線");
        assert_eq!(r.scoring_text(), "台灣是紅線");
    }

    #[test]
    fn test_manual_label_preferred() {
        let r = Record::new("d", "s", "t").with_label("1").with_manual_label("3");
        assert_eq!(r.label_category(), Some(Category::Escalate));
    }

    #[test]
    fn test_nan_manual_label_falls_back() {
        let r = Record::new("d", "s", "t").with_label("2").with_manual_label("NaN");
        assert_eq!(r.effective_label(), Some("2"));
        assert_eq!(r.label_category(), Some(Category::Deter));

        let r = Record::new("d", "s", "t").with_label("2.0").with_manual_label("  ");
        assert_eq!(r.label_category(), Some(Category::Deter));
    }

    #[test]
    fn test_unusable_labels() {
        assert_eq!(Record::new("d", "s", "t").label_category(), None);
        assert_eq!(Record::new("d", "s", "t").with_label("x").label_category(), None);
        assert_eq!(Record::new("d", "s", "t").with_label("0").label_category(), None);
    }

    #[test]
    fn test_matches_focus() {
        let r = Record::new("d", "國防部", "聯合演訓持續");
        assert!(r.matches_focus("演訓"));
        assert!(r.matches_focus("國防部"));
        assert!(!r.matches_focus("外交部"));
    }
}
