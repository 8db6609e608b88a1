//! The index pipeline.
//!
//! ```text
//! records ──► relevance ──► daily buckets ──► transform ──► normalize ──► shift
//!                │                                                         │
//!                └──────────► term frequency ──────────────────► CompositeResult
//! ```
//!
//! `run` is a pure function of its inputs; nothing is retained between calls.

use chrono::NaiveDate;
use nci_common::config::{Mode, PipelineConfig, PrimaryMetric};
use nci_common::{Error, Result, Validate};
use serde::{Deserialize, Serialize};

use crate::aggregate::{self, bucketize, Contribution, DailyBucket};
use crate::composite::{weighted_sum, CompositeSeries};
use crate::frequency::{FrequencyReporter, TopTerms};
use crate::lexicon::{BagHits, Category, Lexicon};
use crate::normalize::{min_max_by_window, ReferenceWindow};
use crate::record::Record;
use crate::relevance::RelevanceFilter;
use crate::transform::{moving_average, standardize, volatility};

// ============================================================================
// Result Types
// ============================================================================

/// Share of each bag in the total hit count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Proportions {
    pub justify: f64,
    pub deter: f64,
    pub escalate: f64,
}

impl Proportions {
    /// `total_c / max(sum, 1)` per bag.
    pub fn from_totals(totals: &BagHits) -> Self {
        let denominator = totals.total().max(1) as f64;
        Self {
            justify: totals.justify as f64 / denominator,
            deter: totals.deter as f64 / denominator,
            escalate: totals.escalate as f64 / denominator,
        }
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Justify => self.justify,
            Category::Deter => self.deter,
            Category::Escalate => self.escalate,
        }
    }
}

/// A record that passed the relevance filter, with the sentences it kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetainedRecord {
    pub record: Record,
    /// Parsed day, if the date cell was usable
    pub day: Option<NaiveDate>,
    pub sentences: Vec<String>,
}

impl RetainedRecord {
    /// Kept sentences joined with single spaces.
    pub fn retained_text(&self) -> String {
        self.sentences.join(" ")
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    /// Records contributing to the counts
    pub count: usize,
    /// `"YYYY-MM-DD ~ YYYY-MM-DD"`, or `"~"` when no date parsed
    pub cover: String,
    pub mode: Mode,
    pub dates: Vec<NaiveDate>,
    pub nci: Vec<f64>,
    pub justify_idx: Vec<f64>,
    pub deter_idx: Vec<f64>,
    pub escalate_idx: Vec<f64>,
    pub totals: BagHits,
    pub proportions: Proportions,
    pub top_terms: TopTerms,
    pub retained: Vec<RetainedRecord>,
}

impl CompositeResult {
    fn empty(mode: Mode, count: usize, retained: Vec<RetainedRecord>) -> Self {
        Self {
            count,
            cover: "~".to_string(),
            mode,
            retained,
            ..Default::default()
        }
    }

    /// Series of a single bag index.
    pub fn index(&self, category: Category) -> &[f64] {
        match category {
            Category::Justify => &self.justify_idx,
            Category::Deter => &self.deter_idx,
            Category::Escalate => &self.escalate_idx,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

fn primary_metric(
    metric: PrimaryMetric,
    lexicon: &Lexicon,
    retained: &RetainedRecord,
    hits: &BagHits,
) -> f64 {
    match metric {
        PrimaryMetric::Docs => 1.0,
        PrimaryMetric::Chars => retained.retained_text().chars().count() as f64 / 1000.0,
        PrimaryMetric::Keywords => retained
            .sentences
            .iter()
            .map(|s| lexicon.keyword_hits(s))
            .sum::<u64>() as f64,
        PrimaryMetric::Intent => hits.total() as f64,
    }
}

fn contribution(
    retained: &RetainedRecord,
    day: NaiveDate,
    lexicon: &Lexicon,
    config: &PipelineConfig,
) -> Contribution {
    match config.mode {
        Mode::HitCount => {
            let mut hits = BagHits::default();
            for sentence in &retained.sentences {
                hits += lexicon.count_hits(sentence);
            }
            Contribution {
                day,
                counts: hits,
                aux: primary_metric(config.primary_metric, lexicon, retained, &hits),
            }
        }
        Mode::Label => {
            let mut counts = BagHits::default();
            if let Some(category) = retained.record.label_category() {
                counts.add(category, 1);
            }
            Contribution {
                day,
                counts,
                aux: 1.0,
            }
        }
    }
}

fn volatility_series(
    buckets: &[DailyBucket],
    dates: &[NaiveDate],
    config: &PipelineConfig,
) -> CompositeSeries {
    let window = ReferenceWindow::resolve(config.win_start, config.win_end, dates);
    let normalize = |series: &[f64]| min_max_by_window(series, dates, window);
    let category = |c: Category| {
        normalize(&moving_average(
            &aggregate::count_series(buckets, c),
            config.ma,
        ))
    };

    let components = volatility(&aggregate::aux_series(buckets), config.ma);

    CompositeSeries {
        nci: normalize(&components.mix(config.weights())),
        justify: category(Category::Justify),
        deter: category(Category::Deter),
        escalate: category(Category::Escalate),
    }
}

fn standardized_series(buckets: &[DailyBucket], config: &PipelineConfig) -> CompositeSeries {
    let z = |c: Category| {
        standardize(
            &aggregate::count_series(buckets, c),
            config.log_transform,
            config.ma,
        )
    };

    let justify = z(Category::Justify);
    let deter = z(Category::Deter);
    let escalate = z(Category::Escalate);

    CompositeSeries {
        nci: weighted_sum(&justify, &deter, &escalate, config.weights()),
        justify,
        deter,
        escalate,
    }
}

/// Run the pipeline over `records`.
///
/// Fails only on an invalid configuration. Empty or unusable input yields an
/// empty result with cover `"~"`.
pub fn run(
    records: &[Record],
    lexicon: &Lexicon,
    config: &PipelineConfig,
) -> Result<CompositeResult> {
    config
        .validate()
        .map_err(|e| Error::InvalidInput(format!("pipeline configuration: {}", e)))?;

    let span = tracing::info_span!("nci_pipeline", mode = %config.mode, records = records.len());
    let _guard = span.enter();

    // Relevance
    let filter = RelevanceFilter::new(lexicon, config.mode, config.drop_reporter_questions)?;
    let retained: Vec<RetainedRecord> = records
        .iter()
        .filter_map(|record| {
            filter.retain(&record.scoring_text()).map(|sentences| {
                let day = aggregate::parse_day(&record.date);
                if day.is_none() {
                    tracing::trace!(raw = %record.date, "Unparsable date excluded");
                }
                RetainedRecord {
                    record: record.clone(),
                    day,
                    sentences,
                }
            })
        })
        .collect();

    tracing::debug!(retained = retained.len(), "Relevance filter applied");

    let in_focus = |r: &&RetainedRecord| {
        config
            .focus
            .as_deref()
            .map_or(true, |focus| r.record.matches_focus(focus))
    };
    let count = retained.iter().filter(in_focus).count();

    // The calendar spans every retained record, focused or not
    let Some((first, last)) = aggregate::span(retained.iter().filter_map(|r| r.day)) else {
        tracing::info!(count, "No dated records in scope");
        return Ok(CompositeResult::empty(config.mode, count, retained));
    };

    // Aggregation
    let buckets = bucketize(
        first,
        last,
        retained
            .iter()
            .filter(in_focus)
            .filter_map(|r| r.day.map(|day| contribution(r, day, lexicon, config))),
    );
    let dates: Vec<NaiveDate> = buckets.iter().map(|b| b.day).collect();

    let mut totals = BagHits::default();
    for bucket in &buckets {
        totals += bucket.counts;
    }

    tracing::debug!(
        days = dates.len(),
        justify = totals.justify,
        deter = totals.deter,
        escalate = totals.escalate,
        "Daily buckets built"
    );

    // Transform, normalize, shift
    let series = match config.mode {
        Mode::HitCount => volatility_series(&buckets, &dates, config),
        Mode::Label => standardized_series(&buckets, config),
    }
    .shifted(config.lead);

    // Term frequency
    let mut reporter = FrequencyReporter::new(lexicon);
    for r in retained.iter().filter(in_focus) {
        reporter.add_text(&r.record.scoring_text());
    }
    let top_terms = reporter.top(config.top_n);

    let result = CompositeResult {
        count,
        cover: format!("{} ~ {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")),
        mode: config.mode,
        dates,
        nci: series.nci,
        justify_idx: series.justify,
        deter_idx: series.deter,
        escalate_idx: series.escalate,
        totals,
        proportions: Proportions::from_totals(&totals),
        top_terms,
        retained,
    };

    tracing::info!(
        count = result.count,
        cover = %result.cover,
        days = result.dates.len(),
        "Index computed"
    );

    Ok(result)
}
