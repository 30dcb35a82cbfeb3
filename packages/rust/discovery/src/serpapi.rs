//! SerpAPI (Google Maps engine) discovery provider.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};

use schoolscout_shared::{Lead, Result, ScoutError, domain_from_url};

use crate::is_blocked_domain;

/// Default SerpAPI search endpoint.
const ENDPOINT: &str = "https://serpapi.com/search.json";

/// Search queries issued per locality, in order.
const QUERY_TEMPLATES: &[&str] = &[
    "Private school",
    "Catholic school",
    "Christian school",
    "Montessori",
    "College prep",
];

/// Discovery provider backed by SerpAPI's Google Maps engine.
pub struct SerpApiProvider {
    api_key: String,
    endpoint: String,
    client: Client,
}

impl SerpApiProvider {
    /// Create a provider with the given API key.
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScoutError::Provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key,
            endpoint: ENDPOINT.to_string(),
            client,
        })
    }

    /// Point the provider at a different endpoint (mock server in tests).
    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Run the query set for `locality`, deduplicating by domain and name
    /// within the run, until `max_results` leads are accepted.
    #[instrument(skip_all, fields(locality))]
    pub async fn search(&self, locality: &str, max_results: usize) -> Result<Vec<Lead>> {
        let normalized_locality = locality.replace(',', "");
        let normalized_locality = normalized_locality.trim();

        let mut leads: Vec<Lead> = Vec::new();
        let mut seen_domains: HashSet<String> = HashSet::new();
        let mut seen_names: HashSet<String> = HashSet::new();

        for template in QUERY_TEMPLATES {
            let query = format!("{template} {normalized_locality}");
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("engine", "google_maps"),
                    ("q", query.as_str()),
                    ("api_key", self.api_key.as_str()),
                ])
                .send()
                .await
                .map_err(|e| ScoutError::Provider(format!("serpapi request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ScoutError::Provider(format!("serpapi: HTTP {status}")));
            }

            let data: Value = response
                .json()
                .await
                .map_err(|e| ScoutError::Provider(format!("serpapi response: {e}")))?;

            let accepted = collect_local_results(
                &data,
                &query,
                locality,
                &mut seen_domains,
                &mut seen_names,
            );
            for lead in accepted {
                leads.push(lead);
                if leads.len() >= max_results {
                    return Ok(leads);
                }
            }
        }

        Ok(leads)
    }
}

/// Filter one response's `local_results` into accepted leads, updating the
/// run-wide domain/name dedup sets.
fn collect_local_results(
    data: &Value,
    query: &str,
    locality: &str,
    seen_domains: &mut HashSet<String>,
    seen_names: &mut HashSet<String>,
) -> Vec<Lead> {
    let Some(items) = data.get("local_results").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut accepted = Vec::new();
    for item in items {
        let name = item
            .get("title")
            .or_else(|| item.get("name"))
            .and_then(Value::as_str);
        let Some(name) = name else {
            debug!(query, "rejected: missing school name");
            continue;
        };

        let website = item
            .get("website")
            .and_then(Value::as_str)
            .or_else(|| {
                item.get("links")
                    .and_then(|links| links.get("website"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string);
        let address = item.get("address").and_then(Value::as_str).map(str::to_string);
        let phone = item.get("phone").and_then(Value::as_str).map(str::to_string);

        let domain = domain_from_url(website.as_deref());
        if let Some(d) = domain.as_deref()
            && is_blocked_domain(d)
        {
            debug!(query, name, domain = d, "rejected: blocked directory domain");
            continue;
        }

        let normalized_name = name.trim().to_lowercase();
        if let Some(d) = domain.as_deref()
            && seen_domains.contains(d)
        {
            debug!(query, name, domain = d, "rejected: duplicate domain");
            continue;
        }
        if seen_names.contains(&normalized_name) {
            debug!(query, name, "rejected: duplicate school name");
            continue;
        }

        let mut lead = Lead::new(name, locality);
        lead.website = website;
        lead.domain = domain.clone();
        lead.provider = Some("serpapi".into());
        lead.source_query = Some(query.to_string());
        lead.address = address;
        lead.phone = phone;

        if let Some(d) = domain {
            seen_domains.insert(d);
        }
        seen_names.insert(normalized_name);
        info!(
            query,
            name,
            website = lead.website.as_deref().unwrap_or("none"),
            "accepted lead"
        );
        accepted.push(lead);
    }
    accepted
}
