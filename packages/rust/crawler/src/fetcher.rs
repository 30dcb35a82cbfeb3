//! Bounded, robots-gated page fetching for one lead's website.
//!
//! The fetcher never follows links. It attempts the homepage plus a fixed
//! list of well-known paths, checks the robots policy before each request,
//! and isolates failures per page: a missing website or a blocked/failed
//! homepage short-circuits the whole pass, while any sub-page failure only
//! drops that page from the bundle.

use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tracing::{debug, info, instrument, warn};
use url::Url;

use schoolscout_shared::{CrawlPolicyConfig, Result, ScoutError};

use crate::robots::{RobotsDecision, RobotsPolicy};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("schoolscout/", env!("CARGO_PKG_VERSION"));

/// Agent token matched against robots.txt groups.
const ROBOTS_AGENT: &str = "schoolscout";

// ---------------------------------------------------------------------------
// Logical pages
// ---------------------------------------------------------------------------

/// The fixed set of logical pages attempted per lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Home,
    Contact,
    About,
    Staff,
    Directory,
    Administration,
    Leadership,
}

impl PageKind {
    /// The sub-pages attempted after a successful homepage fetch, in order.
    pub const SUBPAGES: [PageKind; 6] = [
        PageKind::Contact,
        PageKind::About,
        PageKind::Staff,
        PageKind::Directory,
        PageKind::Administration,
        PageKind::Leadership,
    ];

    /// Logical name used in logs and bundle lookups.
    pub fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Contact => "contact",
            Self::About => "about",
            Self::Staff => "staff",
            Self::Directory => "directory",
            Self::Administration => "administration",
            Self::Leadership => "leadership",
        }
    }

    /// Well-known relative path for this logical page.
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Contact => "/contact",
            Self::About => "/about",
            Self::Staff => "/staff",
            Self::Directory => "/directory",
            Self::Administration => "/administration",
            Self::Leadership => "/leadership",
        }
    }
}

// ---------------------------------------------------------------------------
// PageBundle
// ---------------------------------------------------------------------------

/// One successfully fetched logical page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub kind: PageKind,
    /// Final URL after redirects.
    pub url: Url,
    /// Raw markup.
    pub html: String,
    /// Whitespace-normalized plain text.
    pub text: String,
}

/// Ephemeral per-pass collection of fetched pages. Discarded after
/// enrichment completes; never persisted.
#[derive(Debug, Clone, Default)]
pub struct PageBundle {
    /// Pages in fetch order, homepage first.
    pub pages: Vec<FetchedPage>,
    /// First contact-form URL discovered across fetched pages.
    pub contact_form_url: Option<Url>,
}

impl PageBundle {
    /// True when nothing was fetched.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All page texts joined, in fetch order.
    pub fn aggregate_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// Resolved URL of a logical page, if it was fetched.
    pub fn url_for(&self, kind: PageKind) -> Option<&Url> {
        self.pages.iter().find(|p| p.kind == kind).map(|p| &p.url)
    }

    /// First fetched URL among several logical pages, in the given order.
    pub fn first_url_of(&self, kinds: &[PageKind]) -> Option<&Url> {
        kinds.iter().find_map(|kind| self.url_for(*kind))
    }
}

// ---------------------------------------------------------------------------
// PageFetcher
// ---------------------------------------------------------------------------

/// Fetches the bounded page set for one lead under the politeness gate.
pub struct PageFetcher {
    client: Client,
    respect_robots: bool,
}

impl PageFetcher {
    /// Create a fetcher from the crawl policy config.
    pub fn new(config: &CrawlPolicyConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            respect_robots: config.respect_robots_txt,
        })
    }

    /// Fetch the page bundle for a lead's website.
    ///
    /// Missing website or robots-disallowed homepage → empty bundle with no
    /// requests issued. Homepage fetch failure → empty bundle (hard stop).
    /// Sub-page failures are skipped silently; the rest of the set proceeds.
    #[instrument(skip_all, fields(website = website.unwrap_or("-")))]
    pub async fn fetch_school_pages(&self, website: Option<&str>) -> PageBundle {
        let mut bundle = PageBundle::default();

        let Some(website) = website else {
            debug!("lead has no website, skipping fetch");
            return bundle;
        };
        let Ok(base) = Url::parse(website) else {
            warn!(website, "website is not a valid URL, skipping fetch");
            return bundle;
        };

        let policy = if self.respect_robots {
            self.load_robots(&base).await
        } else {
            None
        };

        if self.respect_robots && !robots_decision(policy.as_ref(), &base).permits() {
            info!(%base, "homepage disallowed by robots policy");
            return bundle;
        }

        match self.fetch_page(PageKind::Home, base.clone()).await {
            Ok(page) => {
                bundle.contact_form_url =
                    schoolscout_extract::find_contact_form_url(&page.html, &page.url);
                bundle.pages.push(page);
            }
            Err(e) => {
                // Homepage failure is a hard stop, not a soft one.
                warn!(%base, error = %e, "homepage fetch failed");
                return bundle;
            }
        }

        for kind in PageKind::SUBPAGES {
            let Ok(url) = base.join(kind.path()) else {
                continue;
            };
            if self.respect_robots && !robots_decision(policy.as_ref(), &url).permits() {
                debug!(%url, page = kind.name(), "disallowed by robots policy, skipping");
                continue;
            }
            match self.fetch_page(kind, url).await {
                Ok(page) => {
                    if bundle.contact_form_url.is_none() {
                        bundle.contact_form_url =
                            schoolscout_extract::find_contact_form_url(&page.html, &page.url);
                    }
                    bundle.pages.push(page);
                }
                Err(e) => {
                    debug!(page = kind.name(), error = %e, "page fetch failed, skipping");
                }
            }
        }

        info!(pages = bundle.pages.len(), "page bundle assembled");
        bundle
    }

    /// Fetch one page and extract its plain text.
    async fn fetch_page(&self, kind: PageKind, url: Url) -> Result<FetchedPage> {
        debug!(%url, page = kind.name(), "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ScoutError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Network(format!("{url}: HTTP {status}")));
        }

        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| ScoutError::Network(format!("{url}: body read failed: {e}")))?;
        let text = html_to_text(&html);

        Ok(FetchedPage {
            kind,
            url: final_url,
            html,
            text,
        })
    }

    /// Fetch and parse robots.txt for the site's origin. Any failure yields
    /// `None`, which downstream treats as an unknown (permissive) policy.
    async fn load_robots(&self, base: &Url) -> Option<RobotsPolicy> {
        let robots_url = base.join("/robots.txt").ok()?;
        let response = self.client.get(robots_url.as_str()).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body = response.text().await.ok()?;
        Some(RobotsPolicy::parse(&body, ROBOTS_AGENT))
    }
}

/// Per-URL decision, collapsing "no policy" to unknown.
fn robots_decision(policy: Option<&RobotsPolicy>, url: &Url) -> RobotsDecision {
    match policy {
        Some(policy) => policy.decision(url.path()),
        None => RobotsDecision::Unknown,
    }
}

/// Flatten markup to whitespace-normalized text.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    doc.root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher() -> PageFetcher {
        PageFetcher::new(&CrawlPolicyConfig {
            timeout_secs: 5,
            respect_robots_txt: true,
        })
        .expect("build fetcher")
    }

    async fn mount_page(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn html_to_text_normalizes_whitespace() {
        let html = "<html><body><h1>Eastside   Prep</h1>\n<p>A school\nin Downey.</p></body></html>";
        assert_eq!(html_to_text(html), "Eastside Prep A school in Downey.");
    }

    #[tokio::test]
    async fn missing_website_yields_empty_bundle() {
        let bundle = test_fetcher().fetch_school_pages(None).await;
        assert!(bundle.is_empty());
        assert!(bundle.contact_form_url.is_none());
    }

    #[tokio::test]
    async fn fetches_homepage_and_known_subpages() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            r#"<html><body><h1>Eastside Prep</h1><a href="/contact">Contact</a></body></html>"#,
        )
        .await;
        mount_page(
            &server,
            "/contact",
            r#"<html><body><form action="/inquire"></form>Email principal@eastside.edu</body></html>"#,
        )
        .await;
        mount_page(&server, "/about", "<html><body>Our mission</body></html>").await;
        // /staff, /directory, /administration, /leadership fall through to 404

        let bundle = test_fetcher()
            .fetch_school_pages(Some(server.uri().as_str()))
            .await;

        assert_eq!(bundle.pages.len(), 3);
        assert_eq!(bundle.pages[0].kind, PageKind::Home);
        assert!(bundle.url_for(PageKind::Contact).is_some());
        assert!(bundle.url_for(PageKind::Staff).is_none());
        assert!(bundle.aggregate_text().contains("Our mission"));
        // Homepage's "contact" link wins by fetch order over the form on /contact.
        let form_url = bundle.contact_form_url.unwrap();
        assert!(form_url.as_str().ends_with("/contact"));
    }

    #[tokio::test]
    async fn homepage_failure_is_a_hard_stop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "/contact", "<html><body>reachable</body></html>").await;

        let bundle = test_fetcher()
            .fetch_school_pages(Some(server.uri().as_str()))
            .await;
        assert!(bundle.is_empty());
    }

    #[tokio::test]
    async fn robots_disallow_on_homepage_stops_everything() {
        let server = MockServer::start().await;
        mount_page(&server, "/robots.txt", "User-agent: *\nDisallow: /\n").await;
        mount_page(&server, "/", "<html><body>should not be read</body></html>").await;

        let bundle = test_fetcher()
            .fetch_school_pages(Some(server.uri().as_str()))
            .await;
        assert!(bundle.is_empty());
    }

    #[tokio::test]
    async fn robots_disallow_skips_individual_subpages() {
        let server = MockServer::start().await;
        mount_page(&server, "/robots.txt", "User-agent: *\nDisallow: /staff\n").await;
        mount_page(&server, "/", "<html><body>home</body></html>").await;
        mount_page(&server, "/staff", "<html><body>directory of staff</body></html>").await;
        mount_page(&server, "/about", "<html><body>about us</body></html>").await;

        let bundle = test_fetcher()
            .fetch_school_pages(Some(server.uri().as_str()))
            .await;
        assert!(bundle.url_for(PageKind::Home).is_some());
        assert!(bundle.url_for(PageKind::About).is_some());
        assert!(bundle.url_for(PageKind::Staff).is_none());
    }

    #[tokio::test]
    async fn missing_robots_fails_open() {
        let server = MockServer::start().await;
        // No /robots.txt mock: the fetch 404s and the gate falls open.
        mount_page(&server, "/", "<html><body>welcome</body></html>").await;

        let bundle = test_fetcher()
            .fetch_school_pages(Some(server.uri().as_str()))
            .await;
        assert_eq!(bundle.pages.len(), 1);
    }

    #[tokio::test]
    async fn subpage_failures_do_not_abort_the_rest() {
        let server = MockServer::start().await;
        mount_page(&server, "/", "<html><body>home</body></html>").await;
        Mock::given(method("GET"))
            .and(path("/contact"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "/leadership", "<html><body>our leadership team</body></html>").await;

        let bundle = test_fetcher()
            .fetch_school_pages(Some(server.uri().as_str()))
            .await;
        assert!(bundle.url_for(PageKind::Contact).is_none());
        assert!(bundle.url_for(PageKind::Leadership).is_some());
    }
}
