//! Layouts seen on the Delta Force landing page (df.qq.com).

use gameclub_common::{clean_name, Candidate};
use scraper::Html;

use super::{
    first_attr, keyword_image_candidates, select_doc, select_in, slide_candidates, StrategyDef,
};
use crate::fallback::placeholder_media_ref;

pub(super) const CHARACTER: &[StrategyDef] = &[
    StrategyDef {
        name: "p4_thumbs_gallery",
        run: p4_thumbs_gallery,
    },
    StrategyDef {
        name: "operator_alt_images",
        run: operator_alt_images,
    },
];

pub(super) const MAP: &[StrategyDef] = &[
    StrategyDef {
        name: "p7_tab_gallery",
        run: p7_tab_gallery,
    },
    StrategyDef {
        name: "map_alt_images",
        run: map_alt_images,
    },
];

pub(super) const WEAPON: &[StrategyDef] = &[
    StrategyDef {
        name: "p5_weapon_slides",
        run: p5_weapon_slides,
    },
    StrategyDef {
        name: "p5_image_slides",
        run: p5_image_slides,
    },
];

/// Operator thumbnails: `.p4-thumbs .swiper-slide` with `<img>` + `<p>`.
fn p4_thumbs_gallery(doc: &Html) -> Vec<Candidate> {
    slide_candidates(select_doc(doc, ".p4-thumbs .swiper-slide"))
}

fn operator_alt_images(doc: &Html) -> Vec<Candidate> {
    keyword_image_candidates(doc, "img[alt*='干员']", None)
}

/// Map tab carousel. Names come from slide captions; the artwork is a single
/// background image for the whole tab, so it is paired with the first name
/// and the rest get their own placeholder.
fn p7_tab_gallery(doc: &Html) -> Vec<Candidate> {
    let mut swipers = select_doc(doc, ".p7_tab.p7_tab1");
    if swipers.is_empty() {
        swipers = select_doc(doc, ".swiper[class*='p7_tab']");
    }

    let mut names: Vec<String> = Vec::new();
    for swiper in swipers {
        for caption in select_in(swiper, ".swiper-slide p") {
            let text: String = caption.text().collect();
            if let Some(name) = clean_name(&text) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }
    if names.is_empty() {
        return Vec::new();
    }

    let background = map_background(doc);
    names
        .into_iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let media_ref = match (&background, i) {
                (Some(bg), 0) => bg.clone(),
                _ => placeholder_media_ref(&name),
            };
            Candidate::well_formed(&name, &media_ref)
        })
        .collect()
}

fn map_background(doc: &Html) -> Option<String> {
    if let Some(img) = select_doc(doc, "img.map_bg").into_iter().next() {
        if let Some(src) = first_attr(img, &["data-pc-src", "src", "data-ipad-src"]) {
            return Some(src);
        }
    }
    select_doc(doc, "img[src*='p7-m1'], img[src*='p7'], img[class*='map']")
        .into_iter()
        .next()
        .and_then(|img| first_attr(img, &["data-pc-src", "src"]))
}

fn map_alt_images(doc: &Html) -> Vec<Candidate> {
    keyword_image_candidates(doc, "img[alt*='地图']", None)
}

/// Weapon carousel slides tagged `p5-bq`.
fn p5_weapon_slides(doc: &Html) -> Vec<Candidate> {
    slide_candidates(select_doc(
        doc,
        ".swiper-slide.p5-bq, .swiper-slide[class*='p5-bq'], .swiper .p5-bq, \
         [class*='p5'][class*='swiper-slide']",
    ))
}

/// Any carousel slide whose image lives under a `p5` asset path.
fn p5_image_slides(doc: &Html) -> Vec<Candidate> {
    let slides = select_doc(doc, ".swiper-slide")
        .into_iter()
        .filter(|slide| {
            let has_caption = !select_in(*slide, "p").is_empty();
            let p5_image = select_in(*slide, "img")
                .into_iter()
                .next()
                .and_then(|img| img.value().attr("src"))
                .is_some_and(|src| src.contains("p5"));
            has_caption && p5_image
        })
        .collect();
    slide_candidates(slides)
}
