use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};

// ── Quality ──────────────────────────────────────────────────────────────────

/// Stream quality tier, declared in increasing bitrate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "EQ")]
    Eq,
    #[serde(rename = "SQ")]
    Sq,
    #[serde(rename = "MQ")]
    Mq,
    #[serde(rename = "HQ")]
    Hq,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Eq => "EQ",
            Quality::Sq => "SQ",
            Quality::Mq => "MQ",
            Quality::Hq => "HQ",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Quality {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EQ" => Ok(Quality::Eq),
            "SQ" => Ok(Quality::Sq),
            "MQ" => Ok(Quality::Mq),
            "HQ" => Ok(Quality::Hq),
            other => Err(anyhow::anyhow!("unknown quality code: {other}")),
        }
    }
}

// ── Streams and variants ─────────────────────────────────────────────────────

/// One playable stream as harvested from the upstream document, before the
/// owning record exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSource {
    pub lang: String,
    pub quality: Quality,
    pub url: String,
}

/// A playable URL plus enough context to derive its canonical filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoVariant {
    pub url: String,
    pub lang: String,
    pub quality: Quality,
    pub name: String,
    pub date: String,
}

impl VideoVariant {
    /// Canonical output filename: `{name}_{date}_{lang}_{quality}.mp4`.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}.mp4",
            self.name, self.date, self.lang, self.quality
        )
    }
}

// ── Program record ───────────────────────────────────────────────────────────

/// One resolved catch-up programme: immutable after construction, with a
/// non-empty (language → quality → stream) table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramRecord {
    pub id: String,
    /// Upstream short key (not the display title).
    pub name: String,
    /// Display title, present in later API generations.
    pub title: Option<String>,
    /// Broadcast calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Broadcast instant in epoch seconds. Sort key only, never displayed.
    pub timestamp: i64,
    urls: BTreeMap<String, BTreeMap<Quality, VideoVariant>>,
}

impl ProgramRecord {
    /// Build a record from extracted metadata and filtered streams.
    ///
    /// Fails when `streams` is empty: a document with metadata but zero
    /// usable streams must not yield a record.
    pub fn new(
        id: String,
        name: String,
        title: Option<String>,
        timestamp: i64,
        streams: Vec<StreamSource>,
    ) -> Result<Self> {
        if streams.is_empty() {
            return Err(Error::Resolution("no playable variants".to_string()));
        }

        let date = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| Error::Resolution(format!("invalid broadcast timestamp {timestamp}")))?
            .format("%Y-%m-%d")
            .to_string();

        let mut urls: BTreeMap<String, BTreeMap<Quality, VideoVariant>> = BTreeMap::new();
        for stream in streams {
            urls.entry(stream.lang.clone()).or_default().insert(
                stream.quality,
                VideoVariant {
                    url: stream.url,
                    lang: stream.lang,
                    quality: stream.quality,
                    name: name.clone(),
                    date: date.clone(),
                },
            );
        }

        Ok(Self {
            id,
            name,
            title,
            date,
            timestamp,
            urls,
        })
    }

    /// Look up one (language, quality) stream. No fallback: an absent pair
    /// is an error, not a nearest match.
    pub fn variant(&self, lang: &str, quality: Quality) -> Result<&VideoVariant> {
        self.urls
            .get(lang)
            .and_then(|by_quality| by_quality.get(&quality))
            .ok_or_else(|| Error::VariantNotFound {
                lang: lang.to_string(),
                quality: quality.to_string(),
            })
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(String::as_str)
    }

    /// Serializable projection restricted to the documented key set:
    /// `{id, date, name, urls}` plus `title` when known. Each variant is
    /// flattened to its URL string. Keys come out sorted because the maps
    /// are BTree-backed.
    pub fn infos(&self) -> serde_json::Value {
        let urls: BTreeMap<&str, BTreeMap<&str, &str>> = self
            .urls
            .iter()
            .map(|(lang, by_quality)| {
                let flattened = by_quality
                    .iter()
                    .map(|(quality, variant)| (quality.as_str(), variant.url.as_str()))
                    .collect();
                (lang.as_str(), flattened)
            })
            .collect();

        let mut infos = json!({
            "id": self.id,
            "date": self.date,
            "name": self.name,
            "urls": urls,
        });
        if let Some(title) = &self.title {
            infos["title"] = json!(title);
        }
        infos
    }
}
