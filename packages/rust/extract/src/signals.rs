//! Pure signal extractors over page text and markup. No I/O.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Permissive RFC-5322-ish address pattern.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").expect("email pattern")
});

/// North-American phone pattern: optional +1, flexible separators, 3-3-4 grouping.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("phone pattern")
});

/// Default context window captured around each email match, per side.
pub const DEFAULT_CONTEXT_WINDOW: usize = 120;

/// Host fragments that identify a social-platform link.
const SOCIAL_HOST_FRAGMENTS: &[&str] = &[
    "linkedin.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "youtube.com",
];

/// An email address with the text surrounding it, used for role classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSignal {
    pub address: String,
    pub context: String,
}

/// A social-profile hyperlink with its anchor text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialSignal {
    pub href: String,
    pub anchor: String,
}

/// Scan `text` for email addresses, capturing a context window of `window`
/// bytes each side (snapped to character boundaries, clipped to the text).
/// Duplicate addresses with different contexts are all retained.
pub fn extract_emails_with_context(text: &str, window: usize) -> Vec<EmailSignal> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| {
            let start = floor_char_boundary(text, m.start().saturating_sub(window));
            let end = ceil_char_boundary(text, (m.end() + window).min(text.len()));
            EmailSignal {
                address: m.as_str().to_string(),
                context: text[start..end].to_string(),
            }
        })
        .collect()
}

/// First phone-number match in `text`, if any.
pub fn find_phone(text: &str) -> Option<String> {
    PHONE_RE.find(text).map(|m| m.as_str().to_string())
}

/// Locate a contact-form URL in `html`, resolved against `base`.
///
/// Prefers the `action` of the first form that carries one; falls back to
/// the first hyperlink whose href or visible text mentions "contact".
pub fn find_contact_form_url(html: &str, base: &Url) -> Option<Url> {
    let doc = Html::parse_document(html);

    let form_sel = Selector::parse("form").expect("form selector");
    for form in doc.select(&form_sel) {
        if let Some(action) = form.value().attr("action")
            && !action.is_empty()
            && let Ok(resolved) = base.join(action)
        {
            return Some(resolved);
        }
    }

    let link_sel = Selector::parse("a[href]").expect("link selector");
    for link in doc.select(&link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let text = link.text().collect::<String>().to_lowercase();
        if href.to_lowercase().contains("contact") || text.contains("contact") {
            return base.join(href).ok();
        }
    }

    None
}

/// Collect every hyperlink in `html` pointing at a known social platform,
/// paired with its anchor text, resolved against `base`.
pub fn extract_social_links(html: &str, base: &Url) -> Vec<SocialSignal> {
    let doc = Html::parse_document(html);
    let link_sel = Selector::parse("a[href]").expect("link selector");

    let mut signals = Vec::new();
    for link in doc.select(&link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let lowered = href.to_lowercase();
        if !SOCIAL_HOST_FRAGMENTS.iter().any(|f| lowered.contains(f)) {
            continue;
        }
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let anchor = link
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        signals.push(SocialSignal {
            href: resolved.to_string(),
            anchor,
        });
    }
    signals
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
