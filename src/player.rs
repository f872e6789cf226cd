//! Adapters for the upstream player-metadata document.
//!
//! The document layout has changed across Arte API generations. Three
//! shapes have been observed; each gets its own adapter behind the uniform
//! [`ApiGeneration::extract`] contract so the resolver never branches on
//! raw fields itself:
//!
//! * **V1** — millisecond broadcast timestamp, name nested under `VST.VNA`
//! * **V2** — millisecond broadcast timestamp, flat `VNA` name
//! * **V3** — textual local date-time in `VRA`, flat `VNA` name
//!
//! All generations carry the display title in `VTI` and the stream
//! descriptors in `VSR` (a map, occasionally a list, legitimately absent).

use serde_json::Value;

use crate::error::{Error, Result};

/// The only container format the resolver keeps.
pub const TARGET_MEDIA_TYPE: &str = "mp4";

/// Uniform extraction result: what the resolver needs from any generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDoc {
    pub name: String,
    pub title: Option<String>,
    /// Broadcast instant, epoch seconds.
    pub timestamp: i64,
    pub descriptors: Vec<StreamDescriptor>,
}

/// One raw `VSR` entry, unvalidated. Individual descriptors are allowed to
/// be broken; filtering decides what survives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamDescriptor {
    pub media_type: Option<String>,
    pub lang: Option<String>,
    pub quality: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiGeneration {
    V1,
    V2,
    V3,
}

impl ApiGeneration {
    /// Parse a configured generation override (`v1`/`v2`/`v3`).
    pub fn from_config(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "v1" => Some(ApiGeneration::V1),
            "v2" => Some(ApiGeneration::V2),
            "v3" => Some(ApiGeneration::V3),
            _ => None,
        }
    }

    /// Pick the adapter from the document shape.
    pub fn detect(player: &Value) -> Option<Self> {
        if player.get("VST").and_then(|vst| vst.get("VNA")).is_some() {
            Some(ApiGeneration::V1)
        } else if player.get("videoBroadcastTimestamp").is_some() {
            Some(ApiGeneration::V2)
        } else if player.get("VRA").is_some() {
            Some(ApiGeneration::V3)
        } else {
            None
        }
    }

    /// Extract name, broadcast instant and stream descriptors.
    ///
    /// Every missing required field is the same error class: the document
    /// is incomplete, whichever field it was.
    pub fn extract(&self, player: &Value) -> Result<ExtractedDoc> {
        let name = match self {
            ApiGeneration::V1 => str_at(player, &["VST", "VNA"])?,
            ApiGeneration::V2 | ApiGeneration::V3 => str_at(player, &["VNA"])?,
        };

        let timestamp = match self {
            ApiGeneration::V1 | ApiGeneration::V2 => {
                let millis = player
                    .get("videoBroadcastTimestamp")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| incomplete("videoBroadcastTimestamp"))?;
                millis / 1000
            }
            ApiGeneration::V3 => {
                let raw = str_at(player, &["VRA"])?;
                chrono::DateTime::parse_from_str(&raw, "%d/%m/%Y %H:%M:%S %z")
                    .map_err(|_| incomplete("VRA"))?
                    .timestamp()
            }
        };

        let title = player
            .get("VTI")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(ExtractedDoc {
            name,
            title,
            timestamp,
            descriptors: descriptors(player),
        })
    }
}

/// Locate the nested player object inside the raw document.
pub fn player_object(doc: &Value) -> Result<&Value> {
    doc.get("videoJsonPlayer")
        .filter(|player| player.is_object())
        .ok_or_else(|| incomplete("videoJsonPlayer"))
}

/// Upstream-flagged error marker: `custom_msg {type: "error", msg}`.
/// Present when the program is a preview, removed, or otherwise
/// unavailable; the message is surfaced verbatim.
pub fn upstream_error(player: &Value) -> Option<String> {
    let marker = player.get("custom_msg")?;
    if marker.get("type").and_then(Value::as_str) != Some("error") {
        return None;
    }
    Some(
        marker
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("program unavailable")
            .to_string(),
    )
}

/// Harvest the `VSR` stream descriptors. An absent or null container is
/// empty, not an error.
fn descriptors(player: &Value) -> Vec<StreamDescriptor> {
    let entries: Vec<&Value> = match player.get("VSR") {
        Some(Value::Object(map)) => map.values().collect(),
        Some(Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .map(|entry| StreamDescriptor {
            media_type: entry
                .get("mediaType")
                .and_then(Value::as_str)
                .map(str::to_string),
            lang: entry
                .get("versionShortLibelle")
                .and_then(Value::as_str)
                .map(str::to_string),
            quality: entry.get("VQU").and_then(Value::as_str).map(str::to_string),
            url: entry.get("url").and_then(Value::as_str).map(str::to_string),
        })
        .collect()
}

fn str_at(player: &Value, path: &[&str]) -> Result<String> {
    let mut node = player;
    for key in path {
        node = node.get(key).ok_or_else(|| incomplete(&path.join(".")))?;
    }
    node.as_str()
        .map(str::to_string)
        .ok_or_else(|| incomplete(&path.join(".")))
}

fn incomplete(field: &str) -> Error {
    Error::Resolution(format!("incomplete metadata: missing {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{doc_v1, doc_v2, doc_v3, error_doc, vsr};

    fn player(doc: &str) -> Value {
        let value: Value = serde_json::from_str(doc).unwrap();
        value["videoJsonPlayer"].clone()
    }

    #[test]
    fn detects_each_generation() {
        let streams = vsr(&[("mp4", "FR", "MQ", "http://dl/a.mp4")]);
        let v1 = player(&doc_v1("tracks", 1_465_927_200_000, streams.clone()));
        let v2 = player(&doc_v2("tracks", 1_465_927_200_000, streams.clone()));
        let v3 = player(&doc_v3("tracks", "14/06/2016 20:00:00 +0200", streams));

        assert_eq!(ApiGeneration::detect(&v1), Some(ApiGeneration::V1));
        assert_eq!(ApiGeneration::detect(&v2), Some(ApiGeneration::V2));
        assert_eq!(ApiGeneration::detect(&v3), Some(ApiGeneration::V3));
        assert_eq!(ApiGeneration::detect(&serde_json::json!({})), None);
    }

    #[test]
    fn extracts_equivalent_documents_across_generations() {
        let streams = vsr(&[("mp4", "FR", "MQ", "http://dl/a.mp4")]);
        let v1 = player(&doc_v1("tracks", 1_465_927_200_000, streams.clone()));
        let v2 = player(&doc_v2("tracks", 1_465_927_200_000, streams.clone()));
        // 2016-06-14 18:00:00 UTC expressed as a local Paris time
        let v3 = player(&doc_v3("tracks", "14/06/2016 20:00:00 +0200", streams));

        let from_v1 = ApiGeneration::V1.extract(&v1).unwrap();
        let from_v2 = ApiGeneration::V2.extract(&v2).unwrap();
        let from_v3 = ApiGeneration::V3.extract(&v3).unwrap();

        for extracted in [&from_v1, &from_v2, &from_v3] {
            assert_eq!(extracted.name, "tracks");
            assert_eq!(extracted.timestamp, 1_465_927_200);
            assert_eq!(extracted.descriptors.len(), 1);
        }
    }

    #[test]
    fn millisecond_timestamps_are_divided_down() {
        let doc = player(&doc_v2("tracks", 1_465_927_200_499, vsr(&[])));
        let extracted = ApiGeneration::V2.extract(&doc).unwrap();
        assert_eq!(extracted.timestamp, 1_465_927_200);
    }

    #[test]
    fn missing_name_is_incomplete_metadata() {
        let mut doc = player(&doc_v2("tracks", 1_465_927_200_000, vsr(&[])));
        doc.as_object_mut().unwrap().remove("VNA");
        match ApiGeneration::V2.extract(&doc) {
            Err(Error::Resolution(msg)) => assert!(msg.contains("incomplete metadata")),
            other => panic!("expected Resolution, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_textual_date_is_incomplete_metadata() {
        let doc = player(&doc_v3("tracks", "not a date", vsr(&[])));
        assert!(matches!(
            ApiGeneration::V3.extract(&doc),
            Err(Error::Resolution(_))
        ));
    }

    #[test]
    fn absent_variant_container_is_empty_not_an_error() {
        let mut doc = player(&doc_v2("tracks", 1_465_927_200_000, vsr(&[])));
        doc.as_object_mut().unwrap().remove("VSR");
        let extracted = ApiGeneration::V2.extract(&doc).unwrap();
        assert!(extracted.descriptors.is_empty());
    }

    #[test]
    fn variant_container_may_be_a_list() {
        let mut doc = player(&doc_v2("tracks", 1_465_927_200_000, vsr(&[])));
        doc["VSR"] = serde_json::json!([
            {"mediaType": "mp4", "versionShortLibelle": "FR", "VQU": "HQ", "url": "http://dl/a.mp4"}
        ]);
        let extracted = ApiGeneration::V2.extract(&doc).unwrap();
        assert_eq!(extracted.descriptors.len(), 1);
        assert_eq!(extracted.descriptors[0].quality.as_deref(), Some("HQ"));
    }

    #[test]
    fn upstream_error_marker_is_surfaced_verbatim() {
        let doc = player(&error_doc("Ce programme n'est plus disponible"));
        assert_eq!(
            upstream_error(&doc).as_deref(),
            Some("Ce programme n'est plus disponible")
        );

        let ok_doc = player(&doc_v2("tracks", 1_465_927_200_000, vsr(&[])));
        assert_eq!(upstream_error(&ok_doc), None);
    }

    #[test]
    fn missing_player_object_is_incomplete_metadata() {
        let doc: Value = serde_json::json!({"somethingElse": {}});
        assert!(matches!(
            player_object(&doc),
            Err(Error::Resolution(_))
        ));
    }
}
