use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gameclub_common::{Entity, Kind, Source};
use rand::{Rng, RngCore};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{check_partition, EntityStore, StoreError};

/// Postgres-backed store over the `game_data` table. Partition replacement
/// runs in one transaction, so readers see the old or the new rows only.
/// `position` records extraction order so `list` matches the in-memory store.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct GameDataRow {
    id: Uuid,
    game_type: String,
    data_type: String,
    name: String,
    image_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<GameDataRow> for Entity {
    type Error = StoreError;

    fn try_from(row: GameDataRow) -> Result<Self, Self::Error> {
        let source = row
            .game_type
            .parse::<Source>()
            .map_err(|e| StoreError::Corrupt(format!("row {}: {e}", row.id)))?;
        let kind = row
            .data_type
            .parse::<Kind>()
            .map_err(|e| StoreError::Corrupt(format!("row {}: {e}", row.id)))?;
        Ok(Entity {
            id: row.id,
            source,
            kind,
            name: row.name,
            media_ref: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, game_type, data_type, name, image_url, created_at, updated_at FROM game_data";

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the `game_data` table and its lookup index if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS game_data (
                id          UUID PRIMARY KEY,
                game_type   TEXT NOT NULL,
                data_type   TEXT NOT NULL,
                name        TEXT NOT NULL,
                image_url   TEXT NOT NULL,
                position    INTEGER NOT NULL DEFAULT 0,
                created_at  TIMESTAMPTZ NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Tables created before extraction order was kept.
        sqlx::query(
            "ALTER TABLE game_data ADD COLUMN IF NOT EXISTS position INTEGER NOT NULL DEFAULT 0",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS game_data_type_idx ON game_data (game_type, data_type)",
        )
        .execute(&self.pool)
        .await?;

        info!("game_data schema ready");
        Ok(())
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn replace_partition(
        &self,
        source: Source,
        entities: Vec<Entity>,
    ) -> Result<usize, StoreError> {
        check_partition(source, &entities)?;

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM game_data WHERE game_type = $1")
            .bind(source.slug())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut written = 0usize;
        if !entities.is_empty() {
            let mut qb = sqlx::QueryBuilder::new(
                "INSERT INTO game_data (id, game_type, data_type, name, image_url, position, created_at, updated_at) ",
            );
            qb.push_values(entities.iter().enumerate(), |mut b, (i, e)| {
                b.push_bind(e.id)
                    .push_bind(e.source.slug())
                    .push_bind(e.kind.slug())
                    .push_bind(e.name.as_str())
                    .push_bind(e.media_ref.as_str())
                    .push_bind(i as i32)
                    .push_bind(e.created_at)
                    .push_bind(e.updated_at);
            });
            written = qb.build().execute(&mut *tx).await?.rows_affected() as usize;
        }

        tx.commit().await?;
        info!(%source, deleted, written, "Partition replaced");
        Ok(written)
    }

    async fn list(&self, source: Source, kind: Kind) -> Result<Vec<Entity>, StoreError> {
        let rows = sqlx::query_as::<_, GameDataRow>(&format!(
            "{SELECT_COLUMNS} WHERE game_type = $1 AND data_type = $2 ORDER BY position, id"
        ))
        .bind(source.slug())
        .bind(kind.slug())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Entity::try_from).collect()
    }

    async fn count(&self, source: Source) -> Result<usize, StoreError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM game_data WHERE game_type = $1")
            .bind(source.slug())
            .fetch_one(&self.pool)
            .await?;
        Ok(n as usize)
    }

    async fn query_random(
        &self,
        source: Source,
        kind: Kind,
        rng: &mut (dyn RngCore + Send),
    ) -> Result<Option<Entity>, StoreError> {
        // Count and fetch must see the same partition.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let (n,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM game_data WHERE game_type = $1 AND data_type = $2",
        )
        .bind(source.slug())
        .bind(kind.slug())
        .fetch_one(&mut *tx)
        .await?;

        if n == 0 {
            tx.commit().await?;
            return Ok(None);
        }

        let offset = rng.random_range(0..n);
        let row = sqlx::query_as::<_, GameDataRow>(&format!(
            "{SELECT_COLUMNS} WHERE game_type = $1 AND data_type = $2 ORDER BY position, id OFFSET $3 LIMIT 1"
        ))
        .bind(source.slug())
        .bind(kind.slug())
        .bind(offset)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        row.map(Entity::try_from).transpose()
    }
}
