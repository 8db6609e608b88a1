//! Lexicon matching.
//!
//! Three rhetorical bags (justify, deter, escalate) plus an anchor vocabulary
//! and a general keyword list, each compiled once into an immutable
//! leftmost-longest automaton. Matching is literal and case-sensitive, and no
//! match state survives between calls.
//!
//! Counting and display differ:
//! - counting matches every bag on its own, so a term authored into two bags
//!   adds to both totals;
//! - display tokenization scans all bags together and colors a span with the
//!   single highest-priority bag (escalate > deter > justify).

use aho_corasick::{AhoCorasick, MatchKind};
use nci_common::config::LexiconConfig;
use nci_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

// ============================================================================
// Built-in Vocabulary
// ============================================================================

/// General keywords used by the relevance gate and the `keywords` metric.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "台灣", "台湾", "台海", "軍演", "演訓", "佩洛西", "制裁", "嚴正", "堅決", "強烈", "導彈",
    "东风", "實彈", "实弹", "行动", "行動", "嚴重後果", "严重后果", "維權", "維穩",
];

/// Topical anchors: a sentence must mention one of these to be in scope.
pub const DEFAULT_ANCHORS: &[&str] = &[
    "台灣", "台湾", "臺灣", "台海", "臺海", "兩岸", "两岸", "海峽", "海峡", "環台", "环台",
    "台獨", "台独", "台灣當局", "台湾當局", "民進黨", "民进党", "金門", "金门", "馬祖", "马祖",
    "澎湖", "台北", "臺北", "高雄", "新北", "台中", "臺中", "台澎金馬", "海峽中線", "臺澎金馬",
];

pub const DEFAULT_JUSTIFY: &[&str] = &[
    "正當", "正当", "正當化", "正当化", "合理", "必要", "不得已", "維護主權", "维护主权", "捍衛",
    "捍卫", "維護", "维护", "嚴正", "严正", "堅決", "坚决", "嚴肅", "严肃", "正告", "郑重",
];

pub const DEFAULT_DETER: &[&str] = &[
    "威懾", "威慑", "懲罰", "惩罚", "制裁", "反制", "嚴重後果", "严重后果", "必將付出代价",
    "付出代價", "警告", "譴責", "谴责", "報復", "报复", "強硬措施", "强硬措施", "停約", "中止",
    "斷交", "驅逐", "驅離", "扣押", "災難性後果", "灾难性后果", "發出錯誤信號", "发出错误信号",
    "死路一條", "死路一条", "粉碎", "外部勢力干涉", "外部势力干涉", "嚴重威脅", "严重威胁", "分裂",
    "反對", "反对", "威脅", "威胁",
];

pub const DEFAULT_ESCALATE: &[&str] = &[
    "升級", "升级", "加碼", "加码", "擴大", "扩大", "加強", "加强", "進一步", "进一步", "強化",
    "强化", "加快", "節奏", "节奏", "頻次", "频次", "多點", "多域", "多方向", "聯合演訓",
    "联合演训", "環台", "环台", "封控", "封鎖", "封锁", "實彈", "实弹", "導彈", "导弹", "遠火",
    "远火", "演習範圍", "演习范围", "臨時管制區", "临时管制区",
];

// ============================================================================
// Categories
// ============================================================================

/// A rhetorical posture bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Justify,
    Deter,
    Escalate,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Justify, Category::Deter, Category::Escalate];

    /// Display precedence; higher wins.
    pub fn priority(self) -> u8 {
        match self {
            Self::Justify => 1,
            Self::Deter => 2,
            Self::Escalate => 3,
        }
    }

    /// Single-letter key used in totals and reports.
    pub fn key(self) -> char {
        match self {
            Self::Justify => 'J',
            Self::Deter => 'D',
            Self::Escalate => 'E',
        }
    }

    /// Map a numeric annotation label: 1 → justify, 2 → deter, ≥3 → escalate.
    pub fn from_label(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Justify),
            2 => Some(Self::Deter),
            v if v >= 3 => Some(Self::Escalate),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Justify => "justify",
            Self::Deter => "deter",
            Self::Escalate => "escalate",
        };
        write!(f, "{}", name)
    }
}

/// Per-category hit counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagHits {
    pub justify: u64,
    pub deter: u64,
    pub escalate: u64,
}

impl BagHits {
    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Justify => self.justify,
            Category::Deter => self.deter,
            Category::Escalate => self.escalate,
        }
    }

    pub fn add(&mut self, category: Category, n: u64) {
        match category {
            Category::Justify => self.justify += n,
            Category::Deter => self.deter += n,
            Category::Escalate => self.escalate += n,
        }
    }

    pub fn total(&self) -> u64 {
        self.justify + self.deter + self.escalate
    }
}

impl std::ops::AddAssign for BagHits {
    fn add_assign(&mut self, rhs: Self) {
        self.justify += rhs.justify;
        self.deter += rhs.deter;
        self.escalate += rhs.escalate;
    }
}

// ============================================================================
// Term Sets
// ============================================================================

/// An immutable set of literal terms compiled for leftmost-longest search.
#[derive(Debug, Clone)]
pub struct TermSet {
    terms: Vec<String>,
    matcher: AhoCorasick,
}

impl TermSet {
    /// Compile a term list. Empty strings and duplicates are discarded.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let terms: Vec<String> = terms
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&terms)
            .map_err(|e| Error::Config(format!("failed to compile term set: {}", e)))?;

        Ok(Self { terms, matcher })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }

    /// Whether any term occurs in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        !self.is_empty() && self.matcher.is_match(text)
    }

    /// Number of non-overlapping leftmost-longest occurrences.
    pub fn count(&self, text: &str) -> u64 {
        if self.is_empty() {
            return 0;
        }
        self.matcher.find_iter(text).count() as u64
    }

    /// Distinct terms found in `text`.
    pub fn matched_terms(&self, text: &str) -> BTreeSet<String> {
        if self.is_empty() {
            return BTreeSet::new();
        }
        self.matcher
            .find_iter(text)
            .map(|m| self.terms[m.pattern().as_usize()].clone())
            .collect()
    }
}

// ============================================================================
// Lexicon
// ============================================================================

/// Matched terms and hit counts for one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceMatch {
    pub justify: BTreeSet<String>,
    pub deter: BTreeSet<String>,
    pub escalate: BTreeSet<String>,
    pub hits: BagHits,
}

impl SentenceMatch {
    pub fn terms(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Justify => &self.justify,
            Category::Deter => &self.deter,
            Category::Escalate => &self.escalate,
        }
    }
}

/// A display span: either plain text or a highlighted bag term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub category: Option<Category>,
}

/// The full vocabulary used by the pipeline.
#[derive(Debug, Clone)]
pub struct Lexicon {
    justify: TermSet,
    deter: TermSet,
    escalate: TermSet,
    anchors: TermSet,
    keywords: TermSet,
    /// All bag terms together, for display tokenization
    display: AhoCorasick,
    display_categories: Vec<Category>,
}

impl Lexicon {
    /// Build a lexicon from explicit term lists.
    pub fn new(
        justify: TermSet,
        deter: TermSet,
        escalate: TermSet,
        anchors: TermSet,
        keywords: TermSet,
    ) -> Result<Self> {
        let mut resolved: HashMap<&str, Category> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for (set, category) in [
            (&justify, Category::Justify),
            (&deter, Category::Deter),
            (&escalate, Category::Escalate),
        ] {
            for term in set.terms() {
                match resolved.get_mut(term.as_str()) {
                    Some(existing) if existing.priority() < category.priority() => {
                        *existing = category;
                    }
                    Some(_) => {}
                    None => {
                        resolved.insert(term.as_str(), category);
                        order.push(term.as_str());
                    }
                }
            }
        }

        let display_categories: Vec<Category> = order.iter().map(|t| resolved[t]).collect();
        let display = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&order)
            .map_err(|e| Error::Config(format!("failed to compile display matcher: {}", e)))?;

        tracing::debug!(
            justify = justify.terms().len(),
            deter = deter.terms().len(),
            escalate = escalate.terms().len(),
            anchors = anchors.terms().len(),
            keywords = keywords.terms().len(),
            "Lexicon compiled"
        );

        Ok(Self {
            justify,
            deter,
            escalate,
            anchors,
            keywords,
            display,
            display_categories,
        })
    }

    /// The built-in vocabulary.
    pub fn builtin() -> Result<Self> {
        Self::from_config(&LexiconConfig::default())
    }

    /// Built-in vocabulary with the configured lists swapped in.
    pub fn from_config(config: &LexiconConfig) -> Result<Self> {
        fn pick(list: &Option<Vec<String>>, default: &[&str]) -> Result<TermSet> {
            match list {
                Some(terms) => TermSet::new(terms.iter().cloned()),
                None => TermSet::new(default.iter().copied()),
            }
        }

        Self::new(
            pick(&config.justify, DEFAULT_JUSTIFY)?,
            pick(&config.deter, DEFAULT_DETER)?,
            pick(&config.escalate, DEFAULT_ESCALATE)?,
            pick(&config.anchors, DEFAULT_ANCHORS)?,
            pick(&config.keywords, DEFAULT_KEYWORDS)?,
        )
    }

    pub fn bag(&self, category: Category) -> &TermSet {
        match category {
            Category::Justify => &self.justify,
            Category::Deter => &self.deter,
            Category::Escalate => &self.escalate,
        }
    }

    pub fn anchors(&self) -> &TermSet {
        &self.anchors
    }

    pub fn keywords(&self) -> &TermSet {
        &self.keywords
    }

    pub fn has_anchor(&self, text: &str) -> bool {
        self.anchors.is_match(text)
    }

    pub fn has_bag_term(&self, text: &str) -> bool {
        Category::ALL.iter().any(|c| self.bag(*c).is_match(text))
    }

    pub fn keyword_hits(&self, text: &str) -> u64 {
        self.keywords.count(text)
    }

    /// Hit counts per bag, each bag matched independently.
    pub fn count_hits(&self, text: &str) -> BagHits {
        BagHits {
            justify: self.justify.count(text),
            deter: self.deter.count(text),
            escalate: self.escalate.count(text),
        }
    }

    /// Matched terms and hit counts per bag.
    pub fn match_sentence(&self, sentence: &str) -> SentenceMatch {
        SentenceMatch {
            justify: self.justify.matched_terms(sentence),
            deter: self.deter.matched_terms(sentence),
            escalate: self.escalate.matched_terms(sentence),
            hits: self.count_hits(sentence),
        }
    }

    /// Display category of a term: the highest-priority bag containing it.
    pub fn display_category(&self, term: &str) -> Option<Category> {
        Category::ALL
            .iter()
            .rev()
            .copied()
            .find(|c| self.bag(*c).contains(term))
    }

    /// Split `sentence` into plain and highlighted spans.
    ///
    /// Spans never overlap and concatenate back to `sentence`.
    pub fn tokenize<'a>(&self, sentence: &'a str) -> Vec<Span<'a>> {
        let mut spans = Vec::new();
        let mut cursor = 0;

        if self.display_categories.is_empty() {
            if !sentence.is_empty() {
                spans.push(Span {
                    text: sentence,
                    category: None,
                });
            }
            return spans;
        }

        for m in self.display.find_iter(sentence) {
            if m.start() > cursor {
                spans.push(Span {
                    text: &sentence[cursor..m.start()],
                    category: None,
                });
            }
            spans.push(Span {
                text: &sentence[m.start()..m.end()],
                category: Some(self.display_categories[m.pattern().as_usize()]),
            });
            cursor = m.end();
        }

        if cursor < sentence.len() {
            spans.push(Span {
                text: &sentence[cursor..],
                category: None,
            });
        }

        spans
    }
}
