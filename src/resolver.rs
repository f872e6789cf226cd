//! Program Record Resolver: one identifier in, one validated immutable
//! [`ProgramRecord`] out.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::http::{Fetch, FetchError, Save};
use crate::ident;
use crate::models::{ProgramRecord, Quality, StreamSource};
use crate::player::{self, ApiGeneration, ExtractedDoc, TARGET_MEDIA_TYPE};

pub struct Resolver<'a, F: Fetch> {
    fetcher: &'a F,
    config: &'a AppConfig,
}

impl<'a, F: Fetch> Resolver<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a AppConfig) -> Self {
        Self { fetcher, config }
    }

    /// Resolve a program identifier to a record.
    ///
    /// An upstream 404 becomes a resolution failure; other transport
    /// errors propagate unmodified so the caller can tell them apart.
    pub async fn resolve(&self, id: &str) -> Result<ProgramRecord> {
        let short = ident::short_id(id);
        let url = self.config.player_url(&short);
        tracing::debug!("Fetching metadata for {id} from {url}");

        let body = match self.fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(FetchError::NotFound { .. }) => {
                return Err(Error::Resolution(format!("no metadata for {id}")));
            }
            Err(err) => return Err(err.into()),
        };

        let doc: Value = serde_json::from_str(&body)
            .map_err(|e| Error::Resolution(format!("unparseable metadata document: {e}")))?;
        let player = player::player_object(&doc)?;

        if let Some(msg) = player::upstream_error(player) {
            return Err(Error::Resolution(msg));
        }

        let generation = self.generation(player)?;
        let extracted = generation.extract(player)?;
        let streams = self.filter_streams(&extracted);
        tracing::debug!(
            "{id}: {} of {} stream descriptors usable",
            streams.len(),
            extracted.descriptors.len()
        );

        ProgramRecord::new(
            id.to_string(),
            extracted.name,
            extracted.title,
            extracted.timestamp,
            streams,
        )
    }

    /// Resolve straight from a page URL.
    pub async fn resolve_by_url(&self, url: &str) -> Result<ProgramRecord> {
        let id = ident::id_from_url(url)?;
        self.resolve(&id).await
    }

    fn generation(&self, player: &Value) -> Result<ApiGeneration> {
        if let Some(forced) = &self.config.api_generation {
            return ApiGeneration::from_config(forced)
                .ok_or_else(|| anyhow::anyhow!("unknown API generation: {forced}").into());
        }
        ApiGeneration::detect(player).ok_or_else(|| {
            Error::Resolution("incomplete metadata: unrecognized document shape".to_string())
        })
    }

    /// Keep descriptors of the target container format whose language and
    /// quality are both present, the quality code is known, and the
    /// language passes the allow-list (unset allow-list keeps everything).
    fn filter_streams(&self, extracted: &ExtractedDoc) -> Vec<StreamSource> {
        let mut streams = Vec::new();
        for descriptor in &extracted.descriptors {
            if descriptor.media_type.as_deref() != Some(TARGET_MEDIA_TYPE) {
                continue;
            }
            let (Some(lang), Some(quality), Some(url)) =
                (&descriptor.lang, &descriptor.quality, &descriptor.url)
            else {
                continue;
            };
            let Ok(quality) = quality.parse::<Quality>() else {
                tracing::debug!("Skipping stream with unknown quality code {quality:?}");
                continue;
            };
            if let Some(allowed) = &self.config.languages {
                if !allowed.iter().any(|candidate| candidate == lang) {
                    continue;
                }
            }
            streams.push(StreamSource {
                lang: lang.clone(),
                quality,
                url: url.clone(),
            });
        }
        streams
    }
}

/// Download one (language, quality) variant of a resolved record into
/// `directory`, under the variant's canonical filename.
///
/// The transfer is delegated to the save collaborator and not retried; an
/// absent pair fails before any transfer is attempted.
pub async fn download<S: Save>(
    saver: &S,
    record: &ProgramRecord,
    lang: &str,
    quality: Quality,
    directory: &Path,
) -> Result<PathBuf> {
    let variant = record.variant(lang, quality)?;
    let dest = directory.join(variant.file_name());
    tracing::info!("Downloading {} to {}", variant.url, dest.display());
    saver.save(&variant.url, &dest).await?;
    Ok(dest)
}
