use anyhow::Context;
use serde::Deserialize;

/// Application configuration, loaded from `ARTE7_`-prefixed environment
/// variables / .env file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Player metadata endpoint; `{id}` is replaced by the short id.
    #[serde(default = "default_player_api_url")]
    pub player_api_url: String,

    /// Search endpoint; the query is attached as a `query` parameter.
    #[serde(default = "default_search_api_url")]
    pub search_api_url: String,

    /// Directory where downloaded files are stored.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent upstream. Arte serves a consent wall to obvious bots.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional HTTP proxy for all upstream requests.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Language allow-list (e.g. `VF,VOSTF`). Unset keeps every language
    /// code the upstream document offers, which matches the most recent
    /// upstream behaviour.
    #[serde(default)]
    pub languages: Option<Vec<String>>,

    /// Record field `by_program_name` matches against: `name` (upstream
    /// short key, default) or `title` (display title). The short key has
    /// not been a stable contract across API generations.
    #[serde(default = "default_match_field")]
    pub match_field: MatchField,

    /// Force a player-document generation (`v1`/`v2`/`v3`) instead of
    /// detecting it from the document shape.
    #[serde(default)]
    pub api_generation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Name,
    Title,
}

fn default_player_api_url() -> String {
    "https://api.arte.tv/api/player/v1/config/fr/{id}".to_string()
}
fn default_search_api_url() -> String {
    "https://www.arte.tv/guide/api/api/zones/fr/listing_SEARCH".to_string()
}
fn default_output_dir() -> String {
    ".".to_string()
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36"
        .to_string()
}
fn default_match_field() -> MatchField {
    MatchField::Name
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env if present (ignore errors — it may not exist)
        let _ = dotenvy::dotenv();

        envy::prefixed("ARTE7_")
            .from_env::<AppConfig>()
            .context("Failed to load config from environment")
    }

    /// Metadata-document address for a short id.
    pub fn player_url(&self, short_id: &str) -> String {
        self.player_api_url.replace("{id}", short_id)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            player_api_url: default_player_api_url(),
            search_api_url: default_search_api_url(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            proxy: None,
            languages: None,
            match_field: default_match_field(),
            api_generation: None,
        }
    }
}
