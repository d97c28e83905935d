use std::collections::BTreeMap;

use gameclub_common::{Loadout, Source};
use rand::RngCore;
use tracing::debug;

use crate::store::{EntityStore, StoreError};

/// Draw one random entity per kind of `game`. Kinds with no stored entities
/// are left out of the loadout.
pub async fn pick_loadout(
    store: &dyn EntityStore,
    game: Source,
    rng: &mut (dyn RngCore + Send),
) -> Result<Loadout, StoreError> {
    let mut picks = BTreeMap::new();
    for &kind in game.kinds() {
        match store.query_random(game, kind, &mut *rng).await? {
            Some(entity) => {
                picks.insert(kind, entity);
            }
            None => debug!(%game, %kind, "No entities to pick from"),
        }
    }
    Ok(Loadout { game, picks })
}
