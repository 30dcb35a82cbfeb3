//! Outreach draft generation.
//!
//! Every draft kind has a prompt and a deterministic fallback. In dry mode
//! the fallback is returned with no network call; in live mode a failed or
//! empty completion also degrades to the fallback, so drafting never aborts
//! a pipeline.

pub mod delivery;

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use tracing::warn;

use schoolscout_shared::{Lead, LlmConfig, Result, ScoutError, require_api_key};

pub use delivery::{Delivery, ManualDelivery};

/// Completion endpoint (OpenAI responses API).
const ENDPOINT: &str = "https://api.openai.com/v1/responses";

/// Page text beyond this many characters is not sent to the model.
const HOOK_CONTEXT_LIMIT: usize = 2500;

/// Generates outreach prose for leads.
pub struct DraftService {
    dry_run: bool,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    endpoint: String,
    client: Client,
}

impl DraftService {
    /// Create a service from config. In dry mode no API key is required.
    pub fn new(config: &LlmConfig, dry_run: bool) -> Result<Self> {
        let api_key = if dry_run {
            None
        } else {
            Some(require_api_key(&config.api_key_env)?)
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ScoutError::Draft(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            dry_run,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            endpoint: ENDPOINT.to_string(),
            client,
        })
    }

    /// A service that always produces fallback text. Used by tests and by
    /// callers that want deterministic output.
    pub fn dry() -> Self {
        Self::new(&LlmConfig::default(), true).expect("dry service needs no key")
    }

    /// One factual sentence referencing lead-specific page content.
    pub async fn personalization_hook(&self, lead: &Lead, page_text: &str) -> String {
        let context: String = page_text.chars().take(HOOK_CONTEXT_LIMIT).collect();
        let prompt = format!(
            "Write one sentence for a private K-12 school administrator as a personalization hook. \
             Keep it factual and specific based on this content:\n\
             School: {}\nLocality: {}\nContent: {}",
            lead.name, lead.locality, context
        );
        let fallback = format!(
            "I noticed {} highlights a strong mission for students and families in {}.",
            lead.name, lead.locality
        );
        self.complete(&prompt, fallback).await
    }

    /// Initial outreach email in markdown.
    pub async fn email_draft(&self, lead: &Lead) -> String {
        let prompt = format!(
            "Write an outreach email in markdown for a school administrator. \
             Constraints: 60-90 words, no acronyms, no pricing, no timeline promises, \
             one call to action for a 15-minute call, professional school-administrator language.\n\
             School: {}\nPersonalization hook: {}",
            lead.name,
            lead.personalization_hook.as_deref().unwrap_or("")
        );
        let fallback = format!(
            "Hi {} team,\n\n\
             I noticed your school emphasizes student support and family partnership. \
             We help school leaders reduce routine staff workload and improve follow-through in daily operations. \
             If helpful, I can share a simple example tailored to your context. \
             Would you be open to a 15-minute call next week?\n",
            lead.name
        );
        self.complete(&prompt, fallback).await
    }

    /// Polite follow-up email, `days` after initial outreach.
    pub async fn followup_draft(&self, lead: &Lead, days: u32) -> String {
        let prompt = format!(
            "Write a polite follow-up email in markdown for a school administrator. \
             Constraints: 60-90 words, no acronyms, no pricing, no timeline promises, \
             one call to action for a 15-minute call.\n\
             School: {}\nDays since initial outreach: {days}\nPersonalization hook: {}",
            lead.name,
            lead.personalization_hook.as_deref().unwrap_or("")
        );
        let fallback = format!(
            "Hi {} team,\n\n\
             I wanted to briefly follow up in case my earlier note was buried. \
             We support school administrators with practical workflow improvements that help staff stay focused on students and families. \
             If it is useful, I can share one relevant example for your campus. \
             Would you be open to a 15-minute call?\n",
            lead.name
        );
        self.complete(&prompt, fallback).await
    }

    /// Concise social outreach message for a decision maker.
    pub async fn social_message(&self, lead: &Lead) -> String {
        let prompt = format!(
            "Write a concise social outreach message for a private K-12 school decision maker. \
             Constraints: 45-70 words, professional tone, one call to action for a 15-minute call.\n\
             School: {}\nPersonalization hook: {}",
            lead.name,
            lead.personalization_hook.as_deref().unwrap_or("")
        );
        let fallback = format!(
            "Hi, I work with private schools like {} to reduce routine administrative load \
             and improve follow-through for staff and families. \
             If helpful, I can share one practical example relevant to your school. \
             Would you be open to a brief 15-minute conversation?",
            lead.name
        );
        self.complete(&prompt, fallback).await
    }

    /// Plain-text message safe to paste into a contact form.
    pub async fn contact_form_message(&self, lead: &Lead) -> String {
        let prompt = format!(
            "Write a contact-form-safe outreach message for a private K-12 school. \
             Constraints: plain text, 50-80 words, no markdown, one call to action for a 15-minute call.\n\
             School: {}\nPersonalization hook: {}",
            lead.name,
            lead.personalization_hook.as_deref().unwrap_or("")
        );
        let fallback = format!(
            "Hello {} team, I am reaching out because we help school leaders reduce routine \
             administrative workload and improve day-to-day follow-through. \
             If useful, I can share one simple example tailored to your school context. \
             Would a 15-minute call next week be possible?",
            lead.name
        );
        self.complete(&prompt, fallback).await
    }

    /// Call brief in markdown for preparing a first conversation.
    pub async fn call_brief(&self, lead: &Lead) -> String {
        let prompt = format!(
            "Create a concise call brief in markdown for preparing a first conversation \
             with a private K-12 school administrator. Include: context summary, likely \
             priorities, discovery questions, objection handling, and next-step ask.\n\
             School: {}\nLocality: {}\nHook: {}",
            lead.name,
            lead.locality,
            lead.personalization_hook.as_deref().unwrap_or("")
        );
        let fallback = format!(
            "# Call Brief: {}\n\n\
             ## Context Summary\n\
             - Private K-12 school in {}.\n\
             - Emphasis on operational consistency and family communication.\n\n\
             ## Likely Priorities\n- Staff workload balance\n- Student support consistency\n- Family responsiveness\n\n\
             ## Discovery Questions\n- Where does administrative follow-through break down most often?\n\
             - Which routines consume staff time each week?\n\
             - What outcomes matter most this term?\n\n\
             ## Objection Handling\n- Keep approach practical and lightweight.\n\
             - Focus on existing workflows and staff capacity.\n\n\
             ## Next-Step Ask\n- Confirm a 15-minute follow-up with key stakeholders.\n",
            lead.name, lead.locality
        );
        self.complete(&prompt, fallback).await
    }

    /// Run one completion, degrading to `fallback` in dry mode, on transport
    /// failure, or when the model returns nothing usable.
    async fn complete(&self, prompt: &str, fallback: String) -> String {
        if self.dry_run {
            return fallback;
        }
        match self.request_completion(prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback,
            Err(e) => {
                warn!(error = %e, "draft completion failed, using fallback");
                fallback
            }
        }
    }

    async fn request_completion(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ScoutError::Draft("no API key configured".into()))?;

        let body = json!({
            "model": self.model,
            "input": prompt,
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoutError::Draft(format!("completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Draft(format!("completion: HTTP {status}")));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ScoutError::Draft(format!("completion response: {e}")))?;

        extract_output_text(&data)
            .ok_or_else(|| ScoutError::Draft("no output text in completion response".into()))
    }
}

/// Pull the generated text out of a responses-API payload.
fn extract_output_text(data: &Value) -> Option<String> {
    let output = data.get("output")?.as_array()?;
    let mut parts: Vec<&str> = Vec::new();
    for item in output {
        if item.get("type").and_then(Value::as_str) != Some("message") {
            continue;
        }
        let Some(content) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for chunk in content {
            if chunk.get("type").and_then(Value::as_str) == Some("output_text")
                && let Some(text) = chunk.get("text").and_then(Value::as_str)
            {
                parts.push(text);
            }
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}
