//! Catalog Search: free-text queries and known-program lookups, both
//! funnelled through the resolver one candidate at a time.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::config::{AppConfig, MatchField};
use crate::error::{Error, Result};
use crate::http::Fetch;
use crate::models::ProgramRecord;
use crate::resolver::Resolver;

/// Known short names and the canonical search string each resolves to.
static PROGRAMS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("karambolage", "Karambolage"),
        ("metropolis", "Metropolis"),
        ("tracks", "Tracks"),
        ("xenius", "X:enius"),
    ])
});

#[derive(Debug, Deserialize)]
struct SearchDocument {
    #[serde(default)]
    programs: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    id: Option<String>,
    kind: Option<String>,
}

impl SearchEntry {
    /// Collections, previews and other non-show result kinds are skipped;
    /// entries that don't state a kind are kept.
    fn is_show(&self) -> bool {
        match self.kind.as_deref() {
            Some(kind) => kind == "SHOW",
            None => true,
        }
    }
}

pub struct CatalogSearch<'a, F: Fetch> {
    fetcher: &'a F,
    config: &'a AppConfig,
}

impl<'a, F: Fetch> CatalogSearch<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a AppConfig) -> Self {
        Self { fetcher, config }
    }

    /// Free-text search, newest broadcast first.
    ///
    /// Candidates that fail to resolve are logged and skipped; a broken
    /// entry in the result list must never abort the whole search. An
    /// empty result is a valid outcome, not an error.
    pub async fn search(&self, query: &str) -> Result<Vec<ProgramRecord>> {
        let url = self.search_url(query)?;
        tracing::debug!("Searching {url}");
        let body = self.fetcher.fetch(&url).await?;
        let doc: SearchDocument = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("unparseable search document: {e}"))?;

        let resolver = Resolver::new(self.fetcher, self.config);
        let mut records = Vec::new();
        for entry in doc.programs {
            if !entry.is_show() {
                tracing::debug!("Skipping non-show result kind {:?}", entry.kind);
                continue;
            }
            let Some(id) = entry.id else {
                tracing::debug!("Skipping search entry without id");
                continue;
            };
            match resolver.resolve(&id).await {
                Ok(record) => records.push(record),
                Err(err) => tracing::warn!("Skipping candidate {id}: {err}"),
            }
        }

        // Stable sort: equal timestamps keep their upstream order.
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// Look up a known program by its short name and keep only records
    /// whose configured match field equals that name exactly.
    pub async fn by_program_name(&self, name: &str) -> Result<Vec<ProgramRecord>> {
        let query = PROGRAMS
            .get(name)
            .ok_or_else(|| Error::UnknownProgram(name.to_string()))?;

        let mut records = self.search(query).await?;
        records.retain(|record| match self.config.match_field {
            MatchField::Name => record.name == name,
            MatchField::Title => record.title.as_deref() == Some(name),
        });
        Ok(records)
    }

    fn search_url(&self, query: &str) -> Result<String> {
        let mut url = url::Url::parse(&self.config.search_api_url)
            .map_err(|e| anyhow::anyhow!("invalid search endpoint: {e}"))?;
        url.query_pairs_mut().append_pair("query", query);
        Ok(url.into())
    }
}

/// Keep the first `keep` records of an already-sorted result set.
/// Negative means all; an over-long request saturates at the full length.
pub fn truncate(mut records: Vec<ProgramRecord>, keep: i64) -> Vec<ProgramRecord> {
    if keep >= 0 {
        records.truncate(keep as usize);
    }
    records
}
