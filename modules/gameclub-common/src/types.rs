use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GameClubError;

// --- Source ---

/// An external game site whose landing page is crawled. Also the "game type"
/// a loadout is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Delta Force (三角洲行动).
    Delta,
    /// Naraka: Bladepoint (永劫无间).
    Yjwujian,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Delta, Source::Yjwujian];

    pub fn slug(&self) -> &'static str {
        match self {
            Source::Delta => "delta",
            Source::Yjwujian => "yjwujian",
        }
    }

    /// Page fetched once per crawl session.
    pub fn page_url(&self) -> &'static str {
        match self {
            Source::Delta => "https://df.qq.com/index.shtml#part3",
            Source::Yjwujian => "https://www.yjwujian.cn/",
        }
    }

    /// Base that relative media references are resolved against.
    pub fn base_url(&self) -> &'static str {
        match self {
            Source::Delta => "https://df.qq.com",
            Source::Yjwujian => "https://www.yjwujian.cn",
        }
    }

    /// Kinds registered to this source, in crawl order.
    pub fn kinds(&self) -> &'static [Kind] {
        match self {
            Source::Delta => &[Kind::Character, Kind::Map, Kind::Weapon],
            Source::Yjwujian => &[Kind::Hero, Kind::Map, Kind::Weapon],
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Source {
    type Err = GameClubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delta" => Ok(Source::Delta),
            "yjwujian" => Ok(Source::Yjwujian),
            other => Err(GameClubError::UnknownSource(other.to_string())),
        }
    }
}

// --- Kind ---

/// Category of entity within a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Character,
    Hero,
    Map,
    Weapon,
}

impl Kind {
    pub fn slug(&self) -> &'static str {
        match self {
            Kind::Character => "character",
            Kind::Hero => "hero",
            Kind::Map => "map",
            Kind::Weapon => "weapon",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Kind {
    type Err = GameClubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "character" => Ok(Kind::Character),
            "hero" => Ok(Kind::Hero),
            "map" => Ok(Kind::Map),
            "weapon" => Ok(Kind::Weapon),
            other => Err(GameClubError::UnknownKind(other.to_string())),
        }
    }
}

// --- Candidate / Entity ---

/// A (name, media reference) pair produced by an extraction strategy, before
/// normalization. The media reference may still be relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub media_ref: String,
}

impl Candidate {
    /// Build a candidate, returning `None` if the trimmed name or the raw
    /// media reference is empty.
    pub fn well_formed(name: &str, media_ref: &str) -> Option<Self> {
        let name = clean_name(name)?;
        let media_ref = media_ref.trim();
        if media_ref.is_empty() {
            return None;
        }
        Some(Self {
            name,
            media_ref: media_ref.to_string(),
        })
    }
}

/// Trim a display name. Rejects names that are empty, whitespace-only
/// (including non-breaking spaces) or a literal `&nbsp;` entity.
pub fn clean_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}');
    if trimmed.is_empty() || trimmed == "&nbsp;" {
        return None;
    }
    Some(trimmed.to_string())
}

/// A persisted game entity: one hero, character, map or weapon of a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub source: Source,
    pub kind: Kind,
    pub name: String,
    /// Absolute URL of representative artwork (possibly a placeholder).
    pub media_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    pub fn stamp(source: Source, kind: Kind, candidate: Candidate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            kind,
            name: candidate.name,
            media_ref: candidate.media_ref,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One random entity per kind for a requested game. Kinds without data are
/// absent from `picks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    pub game: Source,
    pub picks: BTreeMap<Kind, Entity>,
}

impl Loadout {
    pub fn get(&self, kind: Kind) -> Option<&Entity> {
        self.picks.get(&kind)
    }
}
