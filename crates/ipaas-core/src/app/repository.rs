//! ConnectionRepository - the in-memory connector catalog and its index cycle.
//!
//! # Cycle
//! 1. `IndexClient::fetch_candidates(index_url, "connector")`
//! 2. drop identities already in the seen set (the seen set only grows)
//! 3. `MetadataExtractor::extract_descriptor` for each new artifact
//! 4. insert into the catalog unless the identity is already there (first write wins)
//!
//! A fetch error ends the cycle early; entries merged before it stay.
//!
//! # Concurrency
//! One background writer (the scheduler), any number of `search` callers.
//! Entries are fully built before insertion and stored behind `Arc`, and no
//! lock is ever held across an `.await`, so readers only ever wait for a
//! single map insert.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{Instrument, debug, error, info, info_span};

use crate::app::config::{IndexerConfig, SeenPolicy};
use crate::domain::{ArtifactDescriptor, ArtifactKey, CatalogEntry, CycleId, IndexFetchError};
use crate::impls::{ArchiveExtractor, HttpIndexClient};
use crate::ports::{Clock, IdGenerator, IndexClient, MetadataExtractor, SystemClock, UlidGenerator};

/// Summary of one index cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Candidates returned by the index.
    pub discovered: usize,
    /// Candidates not seen in an earlier cycle.
    pub new: usize,
    /// Entries inserted into the catalog.
    pub added: usize,
    /// New artifacts whose descriptor could not be extracted.
    pub failed: usize,
    /// Why the cycle ended early, if it did.
    pub aborted: Option<String>,
}

impl CycleReport {
    fn new(cycle_id: CycleId, started_at: DateTime<Utc>) -> Self {
        Self {
            cycle_id,
            started_at,
            finished_at: started_at,
            discovered: 0,
            new: 0,
            added: 0,
            failed: 0,
            aborted: None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }
}

pub struct ConnectionRepository {
    index_url: Option<String>,
    classifier: String,
    seen_policy: SeenPolicy,
    index: Arc<dyn IndexClient>,
    extractor: Arc<dyn MetadataExtractor>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    catalog: RwLock<IndexMap<ArtifactKey, Arc<CatalogEntry>>>,
    seen: Mutex<IndexSet<ArtifactKey>>,
}

impl ConnectionRepository {
    pub fn new(
        config: &IndexerConfig,
        index: Arc<dyn IndexClient>,
        extractor: Arc<dyn MetadataExtractor>,
    ) -> Self {
        Self {
            index_url: config.index_url.clone(),
            classifier: config.classifier.clone(),
            seen_policy: config.seen_policy,
            index,
            extractor,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UlidGenerator::new(SystemClock)),
            catalog: RwLock::new(IndexMap::new()),
            seen: Mutex::new(IndexSet::new()),
        }
    }

    /// Repository backed by the HTTP index client and the archive extractor.
    pub fn http(config: &IndexerConfig) -> Result<Self, reqwest::Error> {
        let index = HttpIndexClient::new(config.request_timeout)?;
        let extractor = ArchiveExtractor::new(config.request_timeout)?;
        Ok(Self::new(config, Arc::new(index), Arc::new(extractor)))
    }

    /// Use `clock` for report timestamps and cycle ids.
    pub fn with_clock<C: Clock + Clone + 'static>(mut self, clock: C) -> Self {
        self.ids = Arc::new(UlidGenerator::new(clock.clone()));
        self.clock = Arc::new(clock);
        self
    }

    pub fn index_url(&self) -> Option<&str> {
        self.index_url.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.index_url.is_some()
    }

    /// Entries matching `filter`, in catalog (insertion) order.
    ///
    /// `None` or an empty filter returns everything. Otherwise an entry
    /// matches when its name, description, groupId, artifactId, version or
    /// any label contains the filter, ignoring case.
    pub fn search(&self, filter: Option<&str>) -> Vec<Arc<CatalogEntry>> {
        let snapshot: Vec<Arc<CatalogEntry>> = self.catalog.read().values().cloned().collect();

        match filter.filter(|f| !f.is_empty()) {
            None => snapshot,
            Some(filter) => {
                let needle = filter.to_lowercase();
                snapshot
                    .into_iter()
                    .filter(|entry| entry.matches(&needle))
                    .collect()
            }
        }
    }

    /// `search` rendered as a JSON array.
    pub fn search_json(
        &self,
        filter: Option<&str>,
    ) -> Result<serde_json::Value, serde_json::Error> {
        let entries = self.search(filter);
        let entries: Vec<&CatalogEntry> = entries.iter().map(Arc::as_ref).collect();
        serde_json::to_value(entries)
    }

    pub fn get(&self, key: &ArtifactKey) -> Option<Arc<CatalogEntry>> {
        self.catalog.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.catalog.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.read().is_empty()
    }

    pub fn is_seen(&self, key: &ArtifactKey) -> bool {
        self.seen.lock().contains(key)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.lock().len()
    }

    /// Run one fetch -> filter -> download -> parse -> merge pass.
    ///
    /// Never fails: problems are logged and summarized in the report.
    pub async fn run_index_cycle(&self) -> CycleReport {
        let cycle_id = self.ids.generate_cycle_id();
        let mut report = CycleReport::new(cycle_id, self.clock.now());

        let Some(index_url) = self.index_url.as_deref() else {
            report.aborted = Some("no index url configured".to_string());
            return report;
        };

        let span = info_span!("index_cycle", cycle = %cycle_id, index_url);
        async {
            info!(phase = "cycle", "indexing Nexus: start");

            if let Err(err) = self.index_once(index_url, &mut report).await {
                error!(phase = "index_fetch", error = %err, "error indexing Nexus; cycle aborted");
                report.aborted = Some(err.to_string());
            }

            report.finished_at = self.clock.now();
            info!(
                phase = "cycle",
                discovered = report.discovered,
                new = report.new,
                added = report.added,
                failed = report.failed,
                "indexing Nexus: end"
            );
        }
        .instrument(span)
        .await;

        report
    }

    async fn index_once(
        &self,
        index_url: &str,
        report: &mut CycleReport,
    ) -> Result<(), IndexFetchError> {
        let candidates = self
            .index
            .fetch_candidates(index_url, &self.classifier)
            .await?;
        report.discovered = candidates.len();

        let batch = self.take_new(candidates);
        report.new = batch.len();

        for artifact in batch {
            let Some(entry) = self.extractor.extract_descriptor(&artifact).await else {
                report.failed += 1;
                continue;
            };

            if self.seen_policy == SeenPolicy::OnSuccess {
                self.seen.lock().insert(artifact.key().clone());
            }

            if self.insert_if_absent(artifact.key(), entry) {
                report.added += 1;
                info!(phase = "merge", artifact = %artifact, "added connector");
            } else {
                debug!(phase = "merge", artifact = %artifact, "connector already in catalog");
            }
        }

        Ok(())
    }

    /// Candidates not seen before, in index order.
    fn take_new(&self, candidates: Vec<ArtifactDescriptor>) -> Vec<ArtifactDescriptor> {
        let mut seen = self.seen.lock();
        candidates
            .into_iter()
            .filter(|candidate| match self.seen_policy {
                SeenPolicy::OnDiscovery => seen.insert(candidate.key().clone()),
                SeenPolicy::OnSuccess => !seen.contains(candidate.key()),
            })
            .collect()
    }

    fn insert_if_absent(&self, key: &ArtifactKey, entry: CatalogEntry) -> bool {
        let mut catalog = self.catalog.write();
        if catalog.contains_key(key) {
            return false;
        }
        catalog.insert(key.clone(), Arc::new(entry));
        true
    }
}
