//! Static catalog used when no strategy finds anything on the live page.

use gameclub_common::{Candidate, Kind, Source};
use tracing::warn;
use url::Url;

pub const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/300x300";

const DELTA_CHARACTERS: &[&str] = &["突击兵", "医疗兵", "工程兵", "支援兵"];
const DELTA_MAPS: &[&str] = &["烽火地带"];
const DELTA_WEAPONS: &[&str] = &["M4A1", "AK47", "狙击步枪", "霰弹枪"];

const YJWUJIAN_HEROES: &[&str] = &[
    "宁红夜", "特木尔", "迦南", "季沧海", "天海", "胡桃", "妖刀姬", "崔三娘", "无尘", "岳山",
];
const YJWUJIAN_MAPS: &[&str] = &["聚窟洲", "火罗国", "混沌神狱", "龙隐洞天"];
const YJWUJIAN_WEAPONS: &[&str] = &[
    "长剑", "太刀", "阔刀", "枪", "双节棍", "匕首", "双刀", "双戟", "扇", "横刀", "斩马刀", "棍",
    "链剑", "拳刃", "弓", "连弩", "鸟铳", "火炮", "喷火筒", "五眼铳", "一窝蜂", "万刃轮",
];

/// Known names for a (source, kind) pair. Pairs that are not registered to
/// the source yield an empty slice; see [`fallback_candidates`].
pub fn fallback_names(source: Source, kind: Kind) -> &'static [&'static str] {
    match (source, kind) {
        (Source::Delta, Kind::Character) => DELTA_CHARACTERS,
        (Source::Delta, Kind::Map) => DELTA_MAPS,
        (Source::Delta, Kind::Weapon) => DELTA_WEAPONS,
        (Source::Yjwujian, Kind::Hero) => YJWUJIAN_HEROES,
        (Source::Yjwujian, Kind::Map) => YJWUJIAN_MAPS,
        (Source::Yjwujian, Kind::Weapon) => YJWUJIAN_WEAPONS,
        _ => &[],
    }
}

/// Fallback candidates with synthesized placeholder references. Never empty:
/// an unregistered pair gets a single entry named after the kind.
pub fn fallback_candidates(source: Source, kind: Kind) -> Vec<Candidate> {
    let names = fallback_names(source, kind);
    if names.is_empty() {
        warn!(%source, %kind, "No fallback catalog registered, using kind name");
        return vec![placeholder_candidate(kind.slug())];
    }
    names.iter().map(|name| placeholder_candidate(name)).collect()
}

fn placeholder_candidate(name: &str) -> Candidate {
    Candidate {
        name: name.to_string(),
        media_ref: placeholder_media_ref(name),
    }
}

/// Deterministic placeholder image URL carrying `text` as a percent-encoded
/// query parameter. Degrades to the bare placeholder when the text is blank
/// or the result is not a valid URL.
pub fn placeholder_media_ref(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return PLACEHOLDER_BASE.to_string();
    }

    let candidate = format!("{PLACEHOLDER_BASE}?text={}", urlencoding::encode(text));
    match Url::parse(&candidate) {
        Ok(_) => candidate,
        Err(e) => {
            warn!(text, error = %e, "Placeholder URL invalid, using bare placeholder");
            PLACEHOLDER_BASE.to_string()
        }
    }
}
