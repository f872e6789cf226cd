//! In-memory fixture collaborators and upstream-document builders shared by
//! the module tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Value, json};

use crate::http::{Fetch, FetchError, Save};

// ── Fixture fetcher ──────────────────────────────────────────────────────────

/// Serves canned documents by URL; unknown URLs behave like an upstream 404.
#[derive(Debug, Default)]
pub(crate) struct FixtureFetch {
    pages: HashMap<String, String>,
}

impl FixtureFetch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, body: String) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }
}

impl Fetch for FixtureFetch {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
                status: 404,
            })
    }
}

// ── Recording saver ──────────────────────────────────────────────────────────

/// Records every save call and writes a placeholder body to the destination.
#[derive(Debug, Default)]
pub(crate) struct RecordingSave {
    pub(crate) calls: Mutex<Vec<(String, PathBuf)>>,
}

impl Save for RecordingSave {
    async fn save(&self, url: &str, dest: &Path) -> anyhow::Result<u64> {
        std::fs::write(dest, b"video-bytes")?;
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), dest.to_path_buf()));
        Ok(11)
    }
}

// ── Upstream document builders ───────────────────────────────────────────────

/// Build a `VSR` map from (mediaType, lang, quality, url) tuples.
pub(crate) fn vsr(entries: &[(&str, &str, &str, &str)]) -> Value {
    let mut map = serde_json::Map::new();
    for (index, (media_type, lang, quality, url)) in entries.iter().enumerate() {
        map.insert(
            format!("HTTPS_{quality}_{index}"),
            json!({
                "mediaType": media_type,
                "versionShortLibelle": lang,
                "VQU": quality,
                "url": url,
            }),
        );
    }
    Value::Object(map)
}

/// Oldest shape: nested `VST.VNA` name + millisecond timestamp.
pub(crate) fn doc_v1(name: &str, timestamp_ms: i64, vsr: Value) -> String {
    json!({
        "videoJsonPlayer": {
            "VST": { "VNA": name },
            "VTI": title_for(name),
            "videoBroadcastTimestamp": timestamp_ms,
            "VSR": vsr,
        }
    })
    .to_string()
}

/// Middle shape: flat `VNA` name + millisecond timestamp.
pub(crate) fn doc_v2(name: &str, timestamp_ms: i64, vsr: Value) -> String {
    json!({
        "videoJsonPlayer": {
            "VNA": name,
            "VTI": title_for(name),
            "videoBroadcastTimestamp": timestamp_ms,
            "VSR": vsr,
        }
    })
    .to_string()
}

/// Latest shape: flat `VNA` name + textual `VRA` broadcast date.
pub(crate) fn doc_v3(name: &str, broadcast: &str, vsr: Value) -> String {
    json!({
        "videoJsonPlayer": {
            "VNA": name,
            "VTI": title_for(name),
            "VRA": broadcast,
            "VSR": vsr,
        }
    })
    .to_string()
}

/// Document carrying the upstream error marker.
pub(crate) fn error_doc(msg: &str) -> String {
    json!({
        "videoJsonPlayer": {
            "custom_msg": { "type": "error", "msg": msg },
        }
    })
    .to_string()
}

/// Search-results document from (id, kind) pairs; `None` omits the kind.
pub(crate) fn search_doc(entries: &[(&str, Option<&str>)]) -> String {
    let programs: Vec<Value> = entries
        .iter()
        .map(|(id, kind)| match kind {
            Some(kind) => json!({ "id": id, "kind": kind }),
            None => json!({ "id": id }),
        })
        .collect();
    json!({ "programs": programs }).to_string()
}

fn title_for(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
