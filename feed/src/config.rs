use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::app::FeedSettings;

const DEFAULT_API_URL: &str = "https://portfolio-backend-ckqx.onrender.com/api";
const DEFAULT_SITE_URL: &str = "https://adelaportfolio.vercel.app";
/// The default backend serves posts under `/api/blog`
const DEFAULT_POSTS_PATH: &str = "blog";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the blog backend, including the `/api` prefix
    pub api_url: String,
    /// Post collection path under `api_url` (`{api_url}/{posts_path}`)
    pub posts_path: String,
    /// Public site URL (used for share links)
    pub site_url: String,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    /// Minimum time the initial-page loading indicator stays visible
    pub min_skeleton_ms: u64,
    /// JSON file backing the preference store; in-memory when unset
    pub prefs_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            posts_path: DEFAULT_POSTS_PATH.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            page_size: 6,
            search_debounce_ms: 500,
            min_skeleton_ms: 200,
            prefs_path: None,
            request_timeout_secs: 15,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            api_url: env::var("FOLIO_API_URL").unwrap_or(defaults.api_url),
            posts_path: env::var("FOLIO_POSTS_PATH")
                .ok()
                .filter(|path| !path.trim_matches('/').is_empty())
                .unwrap_or(defaults.posts_path),
            site_url: env::var("FOLIO_SITE_URL").unwrap_or(defaults.site_url),
            page_size: parse_var("FOLIO_PAGE_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),
            search_debounce_ms: parse_var("FOLIO_SEARCH_DEBOUNCE_MS")
                .unwrap_or(defaults.search_debounce_ms),
            min_skeleton_ms: parse_var("FOLIO_MIN_SKELETON_MS")
                .unwrap_or(defaults.min_skeleton_ms),
            prefs_path: env::var("FOLIO_PREFS_PATH").ok().map(PathBuf::from),
            request_timeout_secs: parse_var("FOLIO_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Controller tuning derived from this configuration
    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            page_size: self.page_size,
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            min_skeleton: Duration::from_millis(self.min_skeleton_ms),
        }
    }

    /// Origin of the backend (API URL without the `/api` suffix), used for uploads
    pub fn asset_origin(&self) -> &str {
        self.api_url
            .trim_end_matches('/')
            .trim_end_matches("/api")
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}
