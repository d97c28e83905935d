use chrono::{DateTime, Utc};
use gameclub_common::{Entity, Kind, Source};
use scraper::Html;
use tracing::{info, warn};

use crate::dedup::dedup_candidates;
use crate::fallback::fallback_candidates;
use crate::strategies::{cascade_for, run_cascade};

/// Entities extracted for one (source, kind), plus where they came from.
#[derive(Debug, Clone)]
pub struct KindExtraction {
    pub kind: Kind,
    pub entities: Vec<Entity>,
    /// Name of the strategy that produced the data; `None` means the
    /// fallback catalog was used.
    pub strategy: Option<&'static str>,
}

impl KindExtraction {
    pub fn used_fallback(&self) -> bool {
        self.strategy.is_none()
    }
}

/// Extract entities of one kind from a parsed page.
///
/// Never returns an empty list: when the cascade yields nothing usable the
/// static fallback catalog is substituted.
pub fn extract(doc: &Html, source: Source, kind: Kind, now: DateTime<Utc>) -> KindExtraction {
    let outcome = run_cascade(doc, cascade_for(source, kind), source.base_url());
    let raw_count = outcome.candidates.len();
    let candidates = dedup_candidates(outcome.candidates);

    let (candidates, strategy) = if candidates.is_empty() {
        warn!(%source, %kind, "No usable candidates on page, using fallback catalog");
        (dedup_candidates(fallback_candidates(source, kind)), None)
    } else {
        info!(
            %source,
            %kind,
            strategy = outcome.strategy.unwrap_or_default(),
            count = candidates.len(),
            dropped = raw_count - candidates.len(),
            "Extracted entities"
        );
        (candidates, outcome.strategy)
    };

    let entities = candidates
        .into_iter()
        .map(|c| Entity::stamp(source, kind, c, now))
        .collect();

    KindExtraction {
        kind,
        entities,
        strategy,
    }
}

/// Run [`extract`] for every kind registered to `source`.
pub fn extract_all(doc: &Html, source: Source, now: DateTime<Utc>) -> Vec<KindExtraction> {
    source
        .kinds()
        .iter()
        .map(|&kind| extract(doc, source, kind, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_names;

    fn names(ex: &KindExtraction) -> Vec<&str> {
        ex.entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn empty_document_uses_fallback_for_every_kind() {
        let doc = Html::parse_document("");
        for source in Source::ALL {
            for ex in extract_all(&doc, source, Utc::now()) {
                assert!(ex.used_fallback());
                assert_eq!(names(&ex), fallback_names(source, ex.kind).to_vec());
            }
        }
    }

    #[test]
    fn unresolvable_references_defer_to_next_strategy() {
        let doc = Html::parse_document(
            r#"<div class="p4-thumbs"><div class="swiper-slide"><img src="//"><p>威龙</p></div></div>
               <img alt="干员 蜂医" src="/p4/fengyi.png">"#,
        );
        let ex = extract(&doc, Source::Delta, Kind::Character, Utc::now());
        assert!(!ex.used_fallback());
        assert_eq!(ex.strategy, Some("operator_alt_images"));
        assert_eq!(names(&ex), vec!["干员 蜂医"]);
        assert_eq!(ex.entities[0].media_ref, "https://df.qq.com/p4/fengyi.png");
    }

    #[test]
    fn all_strategies_unresolvable_uses_fallback() {
        let doc = Html::parse_document(
            r#"<div class="p4-thumbs"><div class="swiper-slide"><img src="//"><p>威龙</p></div></div>"#,
        );
        let ex = extract(&doc, Source::Delta, Kind::Character, Utc::now());
        assert!(ex.used_fallback());
    }

    #[test]
    fn stamps_share_the_run_timestamp() {
        let now = Utc::now();
        let doc = Html::parse_document("<p>nothing here</p>");
        let ex = extract(&doc, Source::Yjwujian, Kind::Hero, now);
        assert!(ex
            .entities
            .iter()
            .all(|e| e.created_at == now && e.updated_at == now && e.source == Source::Yjwujian));
    }

    #[test]
    fn unregistered_kind_is_never_empty() {
        let doc = Html::parse_document("");
        let ex = extract(&doc, Source::Delta, Kind::Hero, Utc::now());
        assert_eq!(ex.entities.len(), 1);
    }
}
