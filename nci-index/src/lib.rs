//! NCI Index Library
//!
//! Builds the Narrative Coercion Index: a daily signal of escalation rhetoric
//! extracted from dated official statements with a fixed, auditable lexicon.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          nci-index                                  │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────────┐   ┌─────────────┐   ┌───────────┐  │
//! │  │  ingest   │──►│  relevance  │──►│  aggregate  │──►│ transform │  │
//! │  │  (table)  │   │  (lexicon)  │   │ (calendar)  │   │           │  │
//! │  └───────────┘   └─────────────┘   └─────────────┘   └─────┬─────┘  │
//! │                                                            │        │
//! │  ┌───────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────▼─────┐  │
//! │  │  export   │◄──│  composite  │◄──│  normalize  │◄──│    mix    │  │
//! │  │  report   │   │   (shift)   │   │  (window)   │   │           │  │
//! │  └───────────┘   └─────────────┘   └─────────────┘   └───────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Bags
//! - **Justify**: legitimizing language (red lines, sovereignty claims)
//! - **Deter**: warnings and countermeasures
//! - **Escalate**: concrete military action
//!
//! ## Pipelines
//! - **Hit count**: lexicon hits on relevant sentences; level, volatility and
//!   acceleration of a primary metric are smoothed, mixed and min-max scaled
//!   against a reference window
//! - **Label**: one annotated category per record; counts are log-scaled,
//!   z-scored and smoothed
//!
//! ## Lead
//! - All output series are shifted together by a configurable number of days,
//!   with zero fill at the ends

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod aggregate;
pub mod cache;
pub mod composite;
pub mod export;
pub mod frequency;
pub mod ingest;
pub mod lexicon;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod relevance;
pub mod report;
pub mod table;
pub mod transform;

pub use cache::ResultCache;
pub use lexicon::{Category, Lexicon};
pub use pipeline::{run, CompositeResult};
pub use record::Record;
