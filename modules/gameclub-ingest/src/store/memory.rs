use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use gameclub_common::{Entity, Kind, Source};
use tracing::info;

use super::{check_partition, EntityStore, StoreError};

/// Immutable snapshot of one source's entities, grouped by kind.
#[derive(Debug, Default)]
pub struct Partition {
    pub by_kind: BTreeMap<Kind, Vec<Entity>>,
}

impl Partition {
    fn build(entities: Vec<Entity>) -> Self {
        let mut by_kind: BTreeMap<Kind, Vec<Entity>> = BTreeMap::new();
        for entity in entities {
            by_kind.entry(entity.kind).or_default().push(entity);
        }
        Self { by_kind }
    }

    pub fn entities(&self, kind: Kind) -> &[Entity] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store with one atomically swapped snapshot per source.
/// Readers never block: they clone the current `Arc` and keep a consistent
/// view even if a crawl swaps in new data meanwhile.
pub struct MemoryEntityStore {
    partitions: HashMap<Source, ArcSwap<Partition>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        let partitions = Source::ALL
            .iter()
            .map(|&s| (s, ArcSwap::from_pointee(Partition::default())))
            .collect();
        Self { partitions }
    }

    /// Current snapshot of a source's partition.
    pub fn snapshot(&self, source: Source) -> Arc<Partition> {
        self.slot(source).load_full()
    }

    fn slot(&self, source: Source) -> &ArcSwap<Partition> {
        // Every variant is inserted in `new()`.
        &self.partitions[&source]
    }
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn replace_partition(
        &self,
        source: Source,
        entities: Vec<Entity>,
    ) -> Result<usize, StoreError> {
        check_partition(source, &entities)?;
        let partition = Partition::build(entities);
        let written = partition.len();
        self.slot(source).store(Arc::new(partition));
        info!(%source, written, "Partition swapped");
        Ok(written)
    }

    async fn list(&self, source: Source, kind: Kind) -> Result<Vec<Entity>, StoreError> {
        Ok(self.snapshot(source).entities(kind).to_vec())
    }

    async fn count(&self, source: Source) -> Result<usize, StoreError> {
        Ok(self.snapshot(source).len())
    }
}
