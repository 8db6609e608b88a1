//! Latest-result cache.
//!
//! Holds the most recent pipeline result together with the parameters that
//! produced it. Any change to the configuration, the lexicon or the input
//! records triggers a full recomputation that replaces the cached entry.

use nci_common::config::PipelineConfig;
use nci_common::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::lexicon::{Category, Lexicon};
use crate::pipeline::{self, CompositeResult};
use crate::record::Record;

/// Identity of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    /// Serialized pipeline configuration
    config: String,
    /// Hash of the records and vocabulary
    input: u64,
}

impl CacheKey {
    pub fn new(records: &[Record], lexicon: &Lexicon, config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            config: serde_json::to_string(config)?,
            input: fingerprint(records, lexicon),
        })
    }
}

/// Hash of the input records and every term list of the lexicon.
pub fn fingerprint(records: &[Record], lexicon: &Lexicon) -> u64 {
    let mut hasher = DefaultHasher::new();
    records.hash(&mut hasher);
    for category in Category::ALL {
        lexicon.bag(category).terms().hash(&mut hasher);
    }
    lexicon.anchors().terms().hash(&mut hasher);
    lexicon.keywords().terms().hash(&mut hasher);
    hasher.finish()
}

/// Single-entry result cache.
#[derive(Default)]
pub struct ResultCache {
    latest: RwLock<Option<(CacheKey, Arc<CompositeResult>)>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `key`, if it is the latest one.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CompositeResult>> {
        let latest = self.latest.read().ok()?;
        latest
            .as_ref()
            .filter(|(k, _)| k == key)
            .map(|(_, result)| Arc::clone(result))
    }

    /// Replace the cached entry.
    pub fn set(&self, key: CacheKey, result: Arc<CompositeResult>) {
        if let Ok(mut latest) = self.latest.write() {
            *latest = Some((key, result));
        }
    }

    /// Return the cached result or run the pipeline and cache its output.
    pub fn get_or_compute(
        &self,
        records: &[Record],
        lexicon: &Lexicon,
        config: &PipelineConfig,
    ) -> Result<Arc<CompositeResult>> {
        let key = CacheKey::new(records, lexicon, config)?;

        if let Some(result) = self.get(&key) {
            tracing::debug!("Reusing cached index result");
            return Ok(result);
        }

        let result = Arc::new(pipeline::run(records, lexicon, config)?);
        self.set(key, Arc::clone(&result));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![Record::new("2022-08-03", "", "台灣是紅線，大陸必將採取反制行動")]
    }

    #[test]
    fn test_same_parameters_hit_cache() {
        let lexicon = Lexicon::builtin().unwrap();
        let cache = ResultCache::new();
        let config = PipelineConfig::default();

        let first = cache.get_or_compute(&records(), &lexicon, &config).unwrap();
        let second = cache.get_or_compute(&records(), &lexicon, &config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_parameter_change_recomputes() {
        let lexicon = Lexicon::builtin().unwrap();
        let cache = ResultCache::new();
        let config = PipelineConfig::default();

        let first = cache.get_or_compute(&records(), &lexicon, &config).unwrap();
        let changed = PipelineConfig {
            lead: 1,
            ..config.clone()
        };
        let second = cache.get_or_compute(&records(), &lexicon, &changed).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        // only the latest entry is kept
        let key = CacheKey::new(&records(), &lexicon, &config).unwrap();
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_input_change_changes_fingerprint() {
        let lexicon = Lexicon::builtin().unwrap();
        let mut other = records();
        other[0].source = "外交部".into();
        assert_ne!(fingerprint(&records(), &lexicon), fingerprint(&other, &lexicon));
    }

    #[test]
    fn test_computed_entry_is_stored() {
        let lexicon = Lexicon::builtin().unwrap();
        let cache = ResultCache::new();
        let config = PipelineConfig::default();
        let key = CacheKey::new(&records(), &lexicon, &config).unwrap();
        assert!(cache.get(&key).is_none());

        let computed = cache.get_or_compute(&records(), &lexicon, &config).unwrap();
        let stored = cache.get(&key).unwrap();
        assert!(Arc::ptr_eq(&computed, &stored));
    }
}
