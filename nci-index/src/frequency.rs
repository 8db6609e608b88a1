//! Term frequency reporting.
//!
//! Counts every lexicon term over the scoring text of in-scope records and
//! ranks the most frequent terms per bag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::lexicon::{Category, Lexicon};

/// A ranked term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermFrequency {
    pub term: String,
    pub count: u64,
    /// `count / max(sum of the bag's term counts, 1)`
    pub share: f64,
}

/// Top terms of each bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopTerms {
    pub justify: Vec<TermFrequency>,
    pub deter: Vec<TermFrequency>,
    pub escalate: Vec<TermFrequency>,
}

impl TopTerms {
    pub fn get(&self, category: Category) -> &[TermFrequency] {
        match category {
            Category::Justify => &self.justify,
            Category::Deter => &self.deter,
            Category::Escalate => &self.escalate,
        }
    }
}

/// Accumulates raw term occurrences per bag.
///
/// Each term is counted on its own, so overlapping terms both count.
pub struct FrequencyReporter<'a> {
    lexicon: &'a Lexicon,
    counts: HashMap<Category, HashMap<&'a str, u64>>,
}

impl<'a> FrequencyReporter<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            counts: HashMap::new(),
        }
    }

    /// Count occurrences of every bag term in `text`.
    pub fn add_text(&mut self, text: &str) {
        let lexicon = self.lexicon;
        for category in Category::ALL {
            let bag = self.counts.entry(category).or_default();
            for term in lexicon.bag(category).terms() {
                let n = text.matches(term.as_str()).count() as u64;
                if n > 0 {
                    *bag.entry(term.as_str()).or_default() += n;
                }
            }
        }
    }

    /// Sum of all term occurrences counted for a bag.
    pub fn total(&self, category: Category) -> u64 {
        self.counts
            .get(&category)
            .map_or(0, |bag| bag.values().sum())
    }

    fn ranked(&self, category: Category, n: usize) -> Vec<TermFrequency> {
        let Some(bag) = self.counts.get(&category) else {
            return Vec::new();
        };

        let mut ranked: Vec<(&str, u64)> = bag.iter().map(|(t, c)| (*t, *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let denominator = self.total(category).max(1) as f64;
        ranked
            .into_iter()
            .take(n)
            .map(|(term, count)| TermFrequency {
                term: term.to_string(),
                count,
                share: count as f64 / denominator,
            })
            .collect()
    }

    /// Top `n` terms per bag. Shares are relative to the bag's counted
    /// occurrences, so they sum to at most one.
    pub fn top(&self, n: usize) -> TopTerms {
        TopTerms {
            justify: self.ranked(Category::Justify, n),
            deter: self.ranked(Category::Deter, n),
            escalate: self.ranked(Category::Escalate, n),
        }
    }
}
