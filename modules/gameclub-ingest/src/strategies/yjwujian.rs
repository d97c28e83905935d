//! Layouts seen on the Naraka: Bladepoint landing page (www.yjwujian.cn).

use gameclub_common::Candidate;
use scraper::Html;

use super::{keyword_image_candidates, near_text_candidates, StrategyDef};

const HERO_NAME_MAX: usize = 20;
const MAP_NAME_MAX: usize = 30;

pub(super) const HERO: &[StrategyDef] = &[
    StrategyDef {
        name: "hero_images",
        run: hero_images,
    },
    StrategyDef {
        name: "hero_near_text",
        run: hero_near_text,
    },
];

pub(super) const MAP: &[StrategyDef] = &[
    StrategyDef {
        name: "map_images",
        run: map_images,
    },
    StrategyDef {
        name: "map_near_text",
        run: map_near_text,
    },
];

pub(super) const WEAPON: &[StrategyDef] = &[
    StrategyDef {
        name: "weapon_images",
        run: weapon_images,
    },
    StrategyDef {
        name: "weapon_near_text",
        run: weapon_near_text,
    },
];

fn hero_images(doc: &Html) -> Vec<Candidate> {
    keyword_image_candidates(
        doc,
        "img[alt*='英雄'], img[alt*='角色'], a[href*='hero'] img, .hero img, [class*='hero'] img",
        Some(HERO_NAME_MAX),
    )
}

fn hero_near_text(doc: &Html) -> Vec<Candidate> {
    near_text_candidates(doc, "英雄", Some(HERO_NAME_MAX))
}

fn map_images(doc: &Html) -> Vec<Candidate> {
    keyword_image_candidates(
        doc,
        "img[alt*='地图'], a[href*='map'] img, .map img, [class*='map'] img",
        Some(MAP_NAME_MAX),
    )
}

fn map_near_text(doc: &Html) -> Vec<Candidate> {
    near_text_candidates(doc, "地图", Some(MAP_NAME_MAX))
}

fn weapon_images(doc: &Html) -> Vec<Candidate> {
    keyword_image_candidates(
        doc,
        "img[alt*='武器'], a[href*='weapon'] img, .weapon img, [class*='weapon'] img",
        None,
    )
}

fn weapon_near_text(doc: &Html) -> Vec<Candidate> {
    near_text_candidates(doc, "武器", None)
}
