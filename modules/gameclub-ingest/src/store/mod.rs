//! Persistence boundary for extracted entities.
//!
//! A source's entities form one partition that is only ever replaced as a
//! whole. Implementations must make the replacement atomic for readers: a
//! concurrent query observes either the previous partition or the new one.

mod memory;
mod postgres;

pub use memory::{MemoryEntityStore, Partition};
pub use postgres::PgEntityStore;

use async_trait::async_trait;
use gameclub_common::{Entity, Kind, Source};
use rand::{Rng, RngCore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Entity belongs to {found}, not to partition {expected}")]
    WrongPartition { expected: Source, found: Source },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Swap in `entities` as the complete partition for `source`. Returns the
    /// number of entities written. On error the previous partition is kept.
    async fn replace_partition(&self, source: Source, entities: Vec<Entity>)
        -> Result<usize, StoreError>;

    /// All entities of (source, kind) in the current partition.
    async fn list(&self, source: Source, kind: Kind) -> Result<Vec<Entity>, StoreError>;

    /// Number of entities in the current partition of `source`.
    async fn count(&self, source: Source) -> Result<usize, StoreError>;

    /// One uniformly random entity of (source, kind), drawn with `rng`.
    async fn query_random(
        &self,
        source: Source,
        kind: Kind,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<Option<Entity>, StoreError> {
        let mut entities = self.list(source, kind).await?;
        if entities.is_empty() {
            return Ok(None);
        }
        let idx = rng.random_range(0..entities.len());
        Ok(Some(entities.swap_remove(idx)))
    }
}

/// Reject entities that do not belong to the partition being replaced.
pub(crate) fn check_partition(source: Source, entities: &[Entity]) -> Result<(), StoreError> {
    match entities.iter().find(|e| e.source != source) {
        Some(stray) => Err(StoreError::WrongPartition {
            expected: source,
            found: stray.source,
        }),
        None => Ok(()),
    }
}
