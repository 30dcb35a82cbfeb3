//! Brave Search discovery provider.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::instrument;

use schoolscout_shared::{Lead, Result, ScoutError, domain_from_url};

/// Default Brave web-search endpoint.
const ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave caps `count` at 20 per request.
const MAX_COUNT: usize = 20;

/// Discovery provider backed by Brave web search.
pub struct BraveProvider {
    api_key: String,
    endpoint: String,
    client: Client,
}

impl BraveProvider {
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

    /// Single web-search query for private K-12 schools in `locality`.
    #[instrument(skip_all, fields(locality))]
    pub async fn search(&self, locality: &str, max_results: usize) -> Result<Vec<Lead>> {
        let query = format!("private K-12 schools in {locality}");
        let count = max_results.min(MAX_COUNT);

        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query.as_str()), ("count", &count.to_string())])
            .send()
            .await
            .map_err(|e| ScoutError::Provider(format!("brave request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Provider(format!("brave: HTTP {status}")));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ScoutError::Provider(format!("brave response: {e}")))?;

        Ok(collect_web_results(&data, locality, max_results))
    }
}

/// Turn a Brave response's `web.results` into partial leads.
fn collect_web_results(data: &Value, locality: &str, max_results: usize) -> Vec<Lead> {
    let Some(items) = data
        .get("web")
        .and_then(|web| web.get("results"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    items
        .iter()
        .take(max_results)
        .filter_map(|item| {
            let title = item.get("title").and_then(Value::as_str)?;
            let url = item.get("url").and_then(Value::as_str).map(str::to_string);
            let mut lead = Lead::new(title, locality);
            lead.domain = domain_from_url(url.as_deref());
            lead.website = url;
            lead.provider = Some("brave".into());
            Some(lead)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn collects_titled_results_up_to_max() {
        let data = json!({
            "web": {
                "results": [
                    {"title": "Eastside Prep", "url": "https://www.eastside.edu"},
                    {"url": "https://untitled.example.com"},
                    {"title": "St. Marks School", "url": "https://stmarks.org"},
                    {"title": "Overflow Academy", "url": "https://overflow.edu"}
                ]
            }
        });
        let leads = collect_web_results(&data, "Downey, CA", 3);
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].name, "Eastside Prep");
        assert_eq!(leads[0].domain.as_deref(), Some("eastside.edu"));
        assert_eq!(leads[1].provider.as_deref(), Some("brave"));
    }

    #[test]
    fn missing_results_section_is_empty_not_an_error() {
        let leads = collect_web_results(&json!({}), "Downey, CA", 5);
        assert!(leads.is_empty());
    }

    #[tokio::test]
    async fn search_sends_subscription_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("X-Subscription-Token", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "web": {"results": [{"title": "Eastside Prep", "url": "https://eastside.edu"}]}
            })))
            .mount(&server)
            .await;

        let provider = BraveProvider::new("test-key".into())
            .unwrap()
            .with_endpoint(server.uri());
        let leads = provider.search("Downey, CA", 10).await.unwrap();
        assert_eq!(leads.len(), 1);
    }
}
