use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use gameclub_common::{Entity, Kind, Source};
use scraper::Html;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extractor::{extract_all, KindExtraction};
use crate::fetcher::{FetchError, PageFetcher};
use crate::store::{EntityStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Store failed: {0}")]
    Store(#[from] StoreError),
}

/// Where a source's crawl currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SessionPhase {
    Idle = 0,
    Fetching = 1,
    Extracting = 2,
    Swapping = 3,
    Failed = 4,
}

impl SessionPhase {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => SessionPhase::Fetching,
            2 => SessionPhase::Extracting,
            3 => SessionPhase::Swapping,
            4 => SessionPhase::Failed,
            _ => SessionPhase::Idle,
        }
    }
}

/// Summary of one successful crawl of a source.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub source: Source,
    pub entities_written: usize,
    pub per_kind: BTreeMap<Kind, usize>,
    /// Kinds whose entities came from the fallback catalog.
    pub fallback_kinds: Vec<Kind>,
    pub elapsed: Duration,
}

/// Fetch, extract and swap one source's partition.
///
/// The new partition is fully computed before the store is touched, so a
/// failure at any step leaves the previous data in place.
pub struct CrawlSession {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn EntityStore>,
    phases: HashMap<Source, AtomicU8>,
}

impl CrawlSession {
    pub fn new(fetcher: Arc<dyn PageFetcher>, store: Arc<dyn EntityStore>) -> Self {
        let phases = Source::ALL
            .iter()
            .map(|&s| (s, AtomicU8::new(SessionPhase::Idle as u8)))
            .collect();
        Self {
            fetcher,
            store,
            phases,
        }
    }

    pub fn phase(&self, source: Source) -> SessionPhase {
        self.phases
            .get(&source)
            .map(|p| SessionPhase::from_u8(p.load(Ordering::Acquire)))
            .unwrap_or(SessionPhase::Idle)
    }

    fn enter(&self, source: Source, phase: SessionPhase) {
        if let Some(slot) = self.phases.get(&source) {
            slot.store(phase as u8, Ordering::Release);
        }
        debug!(%source, ?phase, "Session phase");
    }

    pub async fn run(&self, source: Source) -> Result<SessionReport, SessionError> {
        let result = self.run_inner(source).await;
        if let Err(e) = &result {
            self.enter(source, SessionPhase::Failed);
            warn!(%source, error = %e, "Crawl session failed, keeping previous data");
        }
        self.enter(source, SessionPhase::Idle);
        result
    }

    async fn run_inner(&self, source: Source) -> Result<SessionReport, SessionError> {
        let started = Instant::now();

        self.enter(source, SessionPhase::Fetching);
        let html = self.fetcher.fetch(source.page_url()).await?;

        self.enter(source, SessionPhase::Extracting);
        let extractions = extract_page(&html, source);

        let mut per_kind = BTreeMap::new();
        let mut fallback_kinds = Vec::new();
        let mut entities: Vec<Entity> = Vec::new();
        for ex in extractions {
            per_kind.insert(ex.kind, ex.entities.len());
            if ex.used_fallback() {
                fallback_kinds.push(ex.kind);
            }
            entities.extend(ex.entities);
        }

        self.enter(source, SessionPhase::Swapping);
        let entities_written = self.store.replace_partition(source, entities).await?;

        let elapsed = started.elapsed();
        info!(
            %source,
            entities_written,
            fallback_kinds = fallback_kinds.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Crawl session complete"
        );

        Ok(SessionReport {
            source,
            entities_written,
            per_kind,
            fallback_kinds,
            elapsed,
        })
    }
}

// `Html` is not `Send`; keep it inside a sync scope so it never spans an await.
fn extract_page(html: &str, source: Source) -> Vec<KindExtraction> {
    let doc = Html::parse_document(html);
    extract_all(&doc, source, Utc::now())
}
