//! PgEntityStore against a live database.
//!
//! Requirements:
//!   - DATABASE_URL env var pointing at a disposable Postgres database

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use gameclub_common::{Candidate, Entity, Kind, Source};
use gameclub_ingest::loadout::pick_loadout;
use gameclub_ingest::store::{EntityStore, PgEntityStore, StoreError};

async fn try_store() -> Option<PgEntityStore> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let store = PgEntityStore::connect(&url).await.ok()?;
    store.ensure_schema().await.ok()?;
    Some(store)
}

fn entities(source: Source, kind: Kind, prefix: &str, n: usize) -> Vec<Entity> {
    let now = Utc::now();
    (0..n)
        .map(|i| {
            Entity::stamp(
                source,
                kind,
                Candidate {
                    name: format!("{prefix}-{i}"),
                    media_ref: format!("https://cdn.example/{prefix}/{i}.png"),
                },
                now,
            )
        })
        .collect()
}

// One test so the partitions are not raced by parallel test threads.
#[tokio::test]
async fn pg_partition_lifecycle() {
    let Some(store) = try_store().await else {
        eprintln!("Skipping: DATABASE_URL not set or unreachable");
        return;
    };

    let mut first = entities(Source::Yjwujian, Kind::Hero, "old", 3);
    first.extend(entities(Source::Yjwujian, Kind::Map, "old-map", 2));
    assert_eq!(store.replace_partition(Source::Yjwujian, first).await.unwrap(), 5);
    assert_eq!(store.count(Source::Yjwujian).await.unwrap(), 5);

    let second = entities(Source::Yjwujian, Kind::Hero, "new", 4);
    store.replace_partition(Source::Yjwujian, second).await.unwrap();
    let heroes = store.list(Source::Yjwujian, Kind::Hero).await.unwrap();
    assert_eq!(heroes.len(), 4);
    assert!(heroes.iter().all(|e| e.name.starts_with("new-")));
    assert!(store.list(Source::Yjwujian, Kind::Map).await.unwrap().is_empty());

    let err = store
        .replace_partition(Source::Yjwujian, entities(Source::Delta, Kind::Map, "stray", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::WrongPartition { .. }));
    assert_eq!(store.count(Source::Yjwujian).await.unwrap(), 4);

    let a = pick_loadout(&store, Source::Yjwujian, &mut StdRng::seed_from_u64(11))
        .await
        .unwrap();
    let b = pick_loadout(&store, Source::Yjwujian, &mut StdRng::seed_from_u64(11))
        .await
        .unwrap();
    assert_eq!(a, b);
    assert!(a.get(Kind::Hero).is_some());
    assert!(a.get(Kind::Map).is_none());

    // Rows come back in extraction order, not name order.
    let now = Utc::now();
    let ordered: Vec<Entity> = ["zeta", "alpha", "mid"]
        .iter()
        .map(|name| {
            Entity::stamp(
                Source::Yjwujian,
                Kind::Weapon,
                Candidate {
                    name: name.to_string(),
                    media_ref: format!("https://cdn.example/w/{name}.png"),
                },
                now,
            )
        })
        .collect();
    store.replace_partition(Source::Yjwujian, ordered).await.unwrap();
    let names: Vec<String> = store
        .list(Source::Yjwujian, Kind::Weapon)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);

    store.replace_partition(Source::Yjwujian, Vec::new()).await.unwrap();
    assert_eq!(store.count(Source::Yjwujian).await.unwrap(), 0);
}
