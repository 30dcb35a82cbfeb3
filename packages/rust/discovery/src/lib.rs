//! Search-provider integration: turn a locality into candidate leads.
//!
//! Providers return partial leads (identity and discovery fields only);
//! contact fields are filled later by enrichment. A provider auth or
//! transport failure is fatal to the discovery step and is not retried.

mod brave;
mod serpapi;

use schoolscout_shared::{AppConfig, Lead, Result, ScoutError, require_api_key};

pub use brave::BraveProvider;
pub use serpapi::SerpApiProvider;

/// Directory/aggregator domains that are never a school's own site.
pub(crate) const BLOCKED_DIRECTORY_DOMAINS: &[&str] = &[
    "niche.com",
    "yelp.com",
    "greatschools.org",
    "privateschoolreview.com",
    "expertise.com",
    "mapquest.com",
    "facebook.com",
    "instagram.com",
];

/// True when a derived domain belongs to a blocked directory site.
pub(crate) fn is_blocked_domain(domain: &str) -> bool {
    BLOCKED_DIRECTORY_DOMAINS
        .iter()
        .any(|blocked| domain == *blocked || domain.ends_with(&format!(".{blocked}")))
}

/// A configured search provider.
pub enum Provider {
    SerpApi(SerpApiProvider),
    Brave(BraveProvider),
}

impl Provider {
    /// Build a provider by name, reading its API key from the env var named
    /// in config. A missing key is a fatal configuration error.
    pub fn from_config(name: &str, config: &AppConfig) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "serpapi" => {
                let key = require_api_key(&config.providers.serpapi_key_env)?;
                Ok(Self::SerpApi(SerpApiProvider::new(key)?))
            }
            "brave" => {
                let key = require_api_key(&config.providers.brave_key_env)?;
                Ok(Self::Brave(BraveProvider::new(key)?))
            }
            other => Err(ScoutError::config(format!("unsupported provider: {other}"))),
        }
    }

    /// Provider name as stored on discovered leads.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SerpApi(_) => "serpapi",
            Self::Brave(_) => "brave",
        }
    }

    /// Search for candidate organizations in a locality, capped at
    /// `max_results`.
    pub async fn search(&self, locality: &str, max_results: usize) -> Result<Vec<Lead>> {
        match self {
            Self::SerpApi(provider) => provider.search(locality, max_results).await,
            Self::Brave(provider) => provider.search(locality, max_results).await,
        }
    }
}
