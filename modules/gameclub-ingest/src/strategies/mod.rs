//! Extraction strategies, one ordered table per (source, kind).
//!
//! Each strategy encodes one guess about how the page is laid out and is a
//! pure function of the parsed document. The cascade stops at the first
//! strategy that returns anything; results are never merged, so names and
//! images from two different markup interpretations cannot get mixed up.

mod delta;
mod yjwujian;

use gameclub_common::{clean_name, Candidate, Kind, Source};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::normalize::normalize_media_ref;

pub type Strategy = fn(&Html) -> Vec<Candidate>;

/// A named extraction strategy.
#[derive(Clone, Copy)]
pub struct StrategyDef {
    pub name: &'static str,
    pub run: Strategy,
}

impl std::fmt::Debug for StrategyDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyDef").field("name", &self.name).finish()
    }
}

/// Result of running a cascade: the candidates of the first productive
/// strategy, or nothing.
#[derive(Debug, Default)]
pub struct CascadeOutcome {
    pub strategy: Option<&'static str>,
    pub candidates: Vec<Candidate>,
}

/// Strategies for a (source, kind) pair in priority order. Unregistered pairs
/// get an empty table, which sends the extractor straight to the fallback.
pub fn cascade_for(source: Source, kind: Kind) -> &'static [StrategyDef] {
    match (source, kind) {
        (Source::Delta, Kind::Character) => delta::CHARACTER,
        (Source::Delta, Kind::Map) => delta::MAP,
        (Source::Delta, Kind::Weapon) => delta::WEAPON,
        (Source::Yjwujian, Kind::Hero) => yjwujian::HERO,
        (Source::Yjwujian, Kind::Map) => yjwujian::MAP,
        (Source::Yjwujian, Kind::Weapon) => yjwujian::WEAPON,
        _ => &[],
    }
}

/// Run `strategies` in order and return the first one that yields at least
/// one candidate whose media reference resolves against `base`. Candidates
/// that do not resolve are dropped; a strategy left with none counts as a
/// miss and the cascade moves on.
pub fn run_cascade(doc: &Html, strategies: &[StrategyDef], base: &str) -> CascadeOutcome {
    for def in strategies {
        let raw = (def.run)(doc);
        let raw_count = raw.len();
        let candidates: Vec<Candidate> = raw
            .into_iter()
            .filter_map(|c| match normalize_media_ref(&c.media_ref, base) {
                Some(media_ref) => Some(Candidate { media_ref, ..c }),
                None => {
                    debug!(
                        strategy = def.name,
                        name = c.name.as_str(),
                        media_ref = c.media_ref.as_str(),
                        "Dropping unresolvable media reference"
                    );
                    None
                }
            })
            .collect();
        if !candidates.is_empty() {
            debug!(strategy = def.name, count = candidates.len(), raw_count, "Strategy matched");
            return CascadeOutcome {
                strategy: Some(def.name),
                candidates,
            };
        }
        debug!(strategy = def.name, raw_count, "Strategy found nothing usable");
    }
    CascadeOutcome::default()
}

// --- Shared selection helpers ---

/// Parse a selector and run it against `scope`. An unparseable selector is
/// logged and treated as matching nothing.
fn select_in<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => scope.select(&sel).collect(),
        Err(e) => {
            warn!(selector = css, error = %e, "Invalid selector");
            Vec::new()
        }
    }
}

fn select_doc<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    select_in(doc.root_element(), css)
}

/// First non-empty attribute among `names`.
fn first_attr(el: ElementRef<'_>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|n| el.value().attr(n))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(String::from)
}

/// Visible text with runs of whitespace collapsed to one space.
fn collapsed_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the element's direct text children only.
fn own_text(el: ElementRef<'_>) -> String {
    let raw: String = el
        .children()
        .filter_map(|n| n.value().as_text().map(|t| String::from(&**t)))
        .collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// Gallery slide layout: a slide holding an `<img>` and a `<p>` caption.
/// Takes the first image's `src` (or lazy-load `data-src`) and the first
/// caption.
fn slide_candidate(slide: ElementRef<'_>) -> Option<Candidate> {
    if has_class(slide, "slide-none") {
        return None;
    }
    let img = select_in(slide, "img").into_iter().next()?;
    let src = first_attr(img, &["src", "data-src"])?;
    let caption = select_in(slide, "p").into_iter().next()?;
    Candidate::well_formed(&collapsed_text(caption), &src)
}

fn slide_candidates(slides: Vec<ElementRef<'_>>) -> Vec<Candidate> {
    slides.into_iter().filter_map(slide_candidate).collect()
}

/// Keyword image layout: images picked by a selector group, named by their
/// `alt` text or, failing that, their parent's text.
fn keyword_image_candidates(doc: &Html, css: &str, max_name_chars: Option<usize>) -> Vec<Candidate> {
    select_doc(doc, css)
        .into_iter()
        .filter_map(|img| {
            let name = first_attr(img, &["alt"])
                .or_else(|| parent_element(img).map(collapsed_text))?;
            let name = clean_name(&name)?;
            if max_name_chars.is_some_and(|max| name.chars().count() >= max) {
                return None;
            }
            let src = first_attr(img, &["src", "data-src"])?;
            Candidate::well_formed(&name, &src)
        })
        .collect()
}

/// Near-text layout: an element whose own text mentions `keyword`, with the
/// artwork in its parent or in its next sibling element.
fn near_text_candidates(doc: &Html, keyword: &str, max_name_chars: Option<usize>) -> Vec<Candidate> {
    select_doc(doc, "body *")
        .into_iter()
        .filter(|el| !matches!(el.value().name(), "script" | "style"))
        .filter_map(|el| {
            let text = own_text(el);
            if !text.contains(keyword) {
                return None;
            }
            let name = clean_name(&text)?;
            if max_name_chars.is_some_and(|max| name.chars().count() >= max) {
                return None;
            }
            let src = image_near(el)?;
            Candidate::well_formed(&name, &src)
        })
        .collect()
}

fn image_near(el: ElementRef<'_>) -> Option<String> {
    let from_parent = parent_element(el)
        .and_then(|p| select_in(p, "img").into_iter().next())
        .and_then(|img| first_attr(img, &["src", "data-src"]));
    if from_parent.is_some() {
        return from_parent;
    }
    el.next_siblings()
        .find_map(ElementRef::wrap)
        .and_then(|sib| select_in(sib, "img").into_iter().next())
        .and_then(|img| first_attr(img, &["src", "data-src"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://df.example";

    fn never(_: &Html) -> Vec<Candidate> {
        Vec::new()
    }

    fn one(_: &Html) -> Vec<Candidate> {
        vec![Candidate {
            name: "first".into(),
            media_ref: "/a.png".into(),
        }]
    }

    fn broken(_: &Html) -> Vec<Candidate> {
        vec![Candidate {
            name: "lost".into(),
            media_ref: "//".into(),
        }]
    }

    fn other(_: &Html) -> Vec<Candidate> {
        vec![Candidate {
            name: "second".into(),
            media_ref: "/b.png".into(),
        }]
    }

    #[test]
    fn cascade_stops_at_first_productive_strategy() {
        let doc = Html::parse_document("<html></html>");
        let table = [
            StrategyDef { name: "never", run: never },
            StrategyDef { name: "one", run: one },
            StrategyDef { name: "other", run: other },
        ];
        let outcome = run_cascade(&doc, &table, BASE);
        assert_eq!(outcome.strategy, Some("one"));
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].name, "first");
        assert_eq!(outcome.candidates[0].media_ref, "https://df.example/a.png");
    }

    #[test]
    fn unresolvable_strategy_output_is_a_miss() {
        let doc = Html::parse_document("<html></html>");
        let table = [
            StrategyDef { name: "broken", run: broken },
            StrategyDef { name: "other", run: other },
        ];
        let outcome = run_cascade(&doc, &table, BASE);
        assert_eq!(outcome.strategy, Some("other"));
        assert_eq!(outcome.candidates[0].media_ref, "https://df.example/b.png");
    }

    #[test]
    fn exhausted_cascade_is_empty() {
        let doc = Html::parse_document("");
        let outcome = run_cascade(&doc, &[StrategyDef { name: "never", run: never }], BASE);
        assert!(outcome.strategy.is_none());
        assert!(outcome.candidates.is_empty());
    }

    #[test]
    fn every_registered_pair_has_a_cascade() {
        for source in Source::ALL {
            for &kind in source.kinds() {
                assert!(!cascade_for(source, kind).is_empty(), "{source}/{kind}");
            }
        }
        assert!(cascade_for(Source::Delta, Kind::Hero).is_empty());
    }

    #[test]
    fn slide_without_caption_is_dropped() {
        let doc = Html::parse_document(
            r#"<div class="swiper-slide"><img src="/a.png"></div>
               <div class="swiper-slide"><img src="/b.png"><p>Named</p></div>"#,
        );
        let out = slide_candidates(select_doc(&doc, ".swiper-slide"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Named");
    }

    #[test]
    fn slide_none_is_skipped() {
        let doc = Html::parse_document(
            r#"<div class="swiper-slide slide-none"><img src="/a.png"><p>Ghost</p></div>"#,
        );
        assert!(slide_candidates(select_doc(&doc, ".swiper-slide")).is_empty());
    }

    #[test]
    fn keyword_images_fall_back_to_parent_text() {
        let doc = Html::parse_document(
            r#"<a href="/hero/1"><img src="/h1.png"> 宁红夜 </a>
               <a href="/hero/2"><img src="/h2.png" alt="迦南"></a>"#,
        );
        let out = keyword_image_candidates(&doc, "a[href*='hero'] img", Some(20));
        let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["宁红夜", "迦南"]);
    }

    #[test]
    fn keyword_images_enforce_name_length() {
        let long = "很".repeat(20);
        let html = format!(r#"<img class="hero" src="/h.png" alt="{long}">"#);
        let doc = Html::parse_document(&html);
        assert!(keyword_image_candidates(&doc, "img.hero", Some(20)).is_empty());
        assert_eq!(keyword_image_candidates(&doc, "img.hero", None).len(), 1);
    }

    #[test]
    fn near_text_finds_image_in_enclosing_block() {
        let doc = Html::parse_document(
            r#"<div><span>英雄 宁红夜</span><img src="/n.png"></div>
               <section><h3>英雄 迦南</h3><div><img src="/j.png"></div></section>"#,
        );
        let out = near_text_candidates(&doc, "英雄", Some(20));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].media_ref, "/n.png");
        assert_eq!(out[1].media_ref, "/j.png");
    }

    #[test]
    fn invalid_selector_matches_nothing() {
        let doc = Html::parse_document("<p>x</p>");
        assert!(select_doc(&doc, "p[[").is_empty());
    }
}
