//! Enrichment orchestration for one lead: fetch pages, extract and resolve
//! signals, score contactability, and stamp the result.
//!
//! This function never fails out: a missing website, a blocked or broken
//! homepage, or malformed markup all degrade to weaker evidence, and every
//! pass ends with a scored lead carrying a fresh enrichment timestamp.
//! Each stage produces part of an [`EnrichmentPatch`] which is merged into
//! a new lead snapshot at the end, rather than mutating fields mid-flight.

use tracing::{debug, instrument};

use schoolscout_crawler::{PageBundle, PageFetcher, PageKind};
use schoolscout_drafts::DraftService;
use schoolscout_extract::{
    ContactEvidence, DEFAULT_CONTEXT_WINDOW, assess_contactability, classify_social_role,
    extract_emails_with_context, extract_social_links, find_phone, resolve_best_email,
    resolve_best_social,
};
use schoolscout_shared::{ContactAssessment, ContactRole, Lead};

/// Field updates produced by one enrichment pass.
#[derive(Debug, Default)]
pub struct EnrichmentPatch {
    pub phone: Option<String>,
    pub contact_email: Option<String>,
    pub contact_role: Option<ContactRole>,
    pub all_emails: Vec<String>,
    pub social_url: Option<String>,
    pub contact_form_url: Option<String>,
    pub contact_page: Option<String>,
    pub about_page: Option<String>,
    pub staff_page: Option<String>,
    pub personalization_hook: Option<String>,
    pub assessment: Option<ContactAssessment>,
}

impl EnrichmentPatch {
    /// Merge the patch into a new snapshot of `lead`. Patch fields win when
    /// present; existing values survive otherwise. Always stamps
    /// `enriched_at`.
    pub fn apply(self, lead: &Lead) -> Lead {
        let mut updated = lead.clone();

        if self.phone.is_some() {
            updated.phone = self.phone;
        }
        if let Some(email) = self.contact_email {
            updated.primary_contact = Some(email.clone());
            updated.contact_email = Some(email);
        }
        if self.contact_role.is_some() {
            updated.contact_role = self.contact_role;
        }
        if !self.all_emails.is_empty() {
            updated.all_emails = self.all_emails;
        }
        if self.social_url.is_some() {
            updated.social_url = self.social_url;
        }
        if self.contact_form_url.is_some() {
            updated.contact_form_url = self.contact_form_url;
        }
        if self.contact_page.is_some() {
            updated.contact_page = self.contact_page;
        }
        if self.about_page.is_some() {
            updated.about_page = self.about_page;
        }
        if self.staff_page.is_some() {
            updated.staff_page = self.staff_page;
        }
        if self.personalization_hook.is_some() {
            updated.personalization_hook = self.personalization_hook;
        }
        if let Some(assessment) = self.assessment {
            updated.set_assessment(assessment);
        }

        updated.mark_enriched();
        updated
    }
}

/// Run one enrichment pass over a lead, returning the updated snapshot.
#[instrument(skip_all, fields(lead = %lead.name))]
pub async fn enrich_lead(lead: &Lead, fetcher: &PageFetcher, drafts: &DraftService) -> Lead {
    let bundle = fetcher.fetch_school_pages(lead.website.as_deref()).await;
    let aggregate = bundle.aggregate_text();
    debug!(pages = bundle.pages.len(), chars = aggregate.len(), "pages fetched");

    let patch = if aggregate.is_empty() {
        // No fresh evidence: hook from empty context, score from whatever
        // contact fields the lead already carries (covers re-runs on leads
        // whose site is unreachable).
        let evidence = evidence_from_lead(lead, false);
        EnrichmentPatch {
            personalization_hook: Some(drafts.personalization_hook(lead, "").await),
            assessment: Some(assess_contactability(&evidence)),
            ..Default::default()
        }
    } else {
        let email_signals = extract_emails_with_context(&aggregate, DEFAULT_CONTEXT_WINDOW);
        let resolution = resolve_best_email(&email_signals);
        let phone = find_phone(&aggregate);

        let social_signals: Vec<_> = bundle
            .pages
            .iter()
            .flat_map(|page| extract_social_links(&page.html, &page.url))
            .collect();
        let social = resolve_best_social(&social_signals);
        debug!(
            emails = resolution.all.len(),
            socials = social_signals.len(),
            "signals extracted"
        );

        let locality_corroborated = aggregate
            .to_lowercase()
            .contains(&lead.locality.to_lowercase());

        // Fresh signals first, pre-existing fields as fallback evidence.
        let fallback = evidence_from_lead(lead, locality_corroborated);
        let evidence = ContactEvidence {
            email: resolution.best.clone().or(fallback.email),
            social_role: social.as_ref().map(|(_, role)| *role).or(fallback.social_role),
            has_contact_form: bundle.contact_form_url.is_some() || fallback.has_contact_form,
            has_phone: phone.is_some() || fallback.has_phone,
            locality_corroborated,
        };
        let assessment = assess_contactability(&evidence);

        EnrichmentPatch {
            phone,
            contact_email: resolution.best.as_ref().map(|(address, _)| address.clone()),
            contact_role: resolution.best.as_ref().map(|(_, role)| *role),
            all_emails: resolution.all,
            social_url: social.map(|(href, _)| href),
            contact_form_url: bundle.contact_form_url.as_ref().map(|url| url.to_string()),
            contact_page: page_url(&bundle, PageKind::Contact),
            about_page: page_url(&bundle, PageKind::About),
            staff_page: bundle
                .first_url_of(&[
                    PageKind::Staff,
                    PageKind::Directory,
                    PageKind::Administration,
                    PageKind::Leadership,
                ])
                .map(|url| url.to_string()),
            personalization_hook: Some(drafts.personalization_hook(lead, &aggregate).await),
            assessment: Some(assessment),
        }
    };

    let updated = patch.apply(lead);
    debug!(
        method = %updated.contact_method,
        score = updated.contact_score,
        tier = %updated.contact_tier,
        "lead scored"
    );
    updated
}

fn page_url(bundle: &PageBundle, kind: PageKind) -> Option<String> {
    bundle.url_for(kind).map(|url| url.to_string())
}

/// Build scorer evidence from a lead's persisted contact fields.
fn evidence_from_lead(lead: &Lead, locality_corroborated: bool) -> ContactEvidence {
    ContactEvidence {
        email: lead
            .contact_email
            .clone()
            .map(|address| (address, lead.contact_role.unwrap_or(ContactRole::Unknown))),
        social_role: lead
            .social_url
            .as_deref()
            .map(|href| classify_social_role("", href)),
        has_contact_form: lead.contact_form_url.is_some(),
        has_phone: lead.phone.is_some(),
        locality_corroborated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schoolscout_shared::{ContactMethod, CrawlPolicyConfig, PriorityTier};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher() -> PageFetcher {
        PageFetcher::new(&CrawlPolicyConfig {
            timeout_secs: 5,
            respect_robots_txt: true,
        })
        .expect("build fetcher")
    }

    fn lead_with_website(uri: &str) -> Lead {
        let mut lead = Lead::new("Eastside Prep", "Downey, CA");
        lead.website = Some(uri.to_string());
        lead
    }

    async fn mount_page(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn principal_email_scores_tier_one() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            "<html><body><h1>Eastside Prep</h1>\
             <p>Welcome from Principal Jane Doe: principal@eastside.edu</p>\
             </body></html>",
        )
        .await;

        let lead = lead_with_website(&server.uri());
        let enriched = enrich_lead(&lead, &test_fetcher(), &DraftService::dry()).await;

        assert_eq!(enriched.contact_email.as_deref(), Some("principal@eastside.edu"));
        assert_eq!(enriched.contact_role, Some(ContactRole::Principal));
        assert_eq!(enriched.primary_contact.as_deref(), Some("principal@eastside.edu"));
        assert_eq!(enriched.contact_method, ContactMethod::PrincipalEmail);
        assert_eq!(enriched.contact_score, 100);
        assert_eq!(enriched.contact_tier, PriorityTier::Tier1);
        assert!(enriched.enriched_at.is_some());
        assert!(enriched.personalization_hook.is_some());
    }

    #[tokio::test]
    async fn contact_form_only_scores_tier_four() {
        let server = MockServer::start().await;
        mount_page(&server, "/", "<html><body>Welcome to our school</body></html>").await;
        mount_page(
            &server,
            "/contact",
            r#"<html><body><form action="/inquire"></form>Visit us any time</body></html>"#,
        )
        .await;

        let lead = lead_with_website(&server.uri());
        let enriched = enrich_lead(&lead, &test_fetcher(), &DraftService::dry()).await;

        assert_eq!(enriched.contact_method, ContactMethod::ContactForm);
        assert_eq!(enriched.contact_score, 40);
        assert_eq!(enriched.contact_tier, PriorityTier::Tier4);
        assert!(enriched.contact_form_url.is_some());
        assert!(enriched.contact_page.is_some());
    }

    #[tokio::test]
    async fn social_profile_with_locality_match_earns_bonus() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            r#"<html><body>A school serving families in Downey, CA.
               <a href="https://facebook.com/eastsideprep">Follow us</a></body></html>"#,
        )
        .await;

        let lead = lead_with_website(&server.uri());
        let enriched = enrich_lead(&lead, &test_fetcher(), &DraftService::dry()).await;

        assert_eq!(enriched.contact_method, ContactMethod::SocialProfile);
        assert_eq!(enriched.contact_score, 80); // 75 + locality corroboration
        assert_eq!(enriched.contact_tier, PriorityTier::Tier2);
        assert!(enriched.social_url.as_deref().unwrap().contains("facebook.com"));
    }

    #[tokio::test]
    async fn unreachable_site_degrades_and_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let lead = lead_with_website(&server.uri());
        let first = enrich_lead(&lead, &test_fetcher(), &DraftService::dry()).await;

        assert!(first.contact_email.is_none());
        assert_eq!(first.contact_method, ContactMethod::None);
        assert_eq!(first.contact_score, 0);
        assert_eq!(first.contact_tier, PriorityTier::Tier5);
        assert!(first.enriched_at.is_some());
        assert!(first.personalization_hook.is_some());

        let second = enrich_lead(&first, &test_fetcher(), &DraftService::dry()).await;
        assert_eq!(second.contact_method, first.contact_method);
        assert_eq!(second.contact_score, first.contact_score);
        assert_eq!(second.contact_tier, first.contact_tier);
    }

    #[tokio::test]
    async fn unreachable_site_scores_preexisting_contact_fields() {
        let mut lead = Lead::new("St. Marks School", "Downey, CA");
        // No website at all: fetch is skipped entirely.
        lead.contact_email = Some("info@stmarks.org".into());
        lead.contact_role = Some(ContactRole::Office);

        let enriched = enrich_lead(&lead, &test_fetcher(), &DraftService::dry()).await;
        assert_eq!(enriched.contact_method, ContactMethod::GeneralEmail);
        assert_eq!(enriched.contact_score, 65);
        assert_eq!(enriched.contact_tier, PriorityTier::Tier3);
        // The stored email survives the pass untouched.
        assert_eq!(enriched.contact_email.as_deref(), Some("info@stmarks.org"));
    }

    #[tokio::test]
    async fn fresh_signals_override_stale_contact_fields() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/",
            "<html><body>Head of School office: head@eastside.edu</body></html>",
        )
        .await;

        let mut lead = lead_with_website(&server.uri());
        lead.contact_email = Some("old-info@eastside.edu".into());
        lead.contact_role = Some(ContactRole::Office);

        let enriched = enrich_lead(&lead, &test_fetcher(), &DraftService::dry()).await;
        assert_eq!(enriched.contact_email.as_deref(), Some("head@eastside.edu"));
        assert_eq!(enriched.contact_role, Some(ContactRole::Principal));
        assert_eq!(enriched.contact_score, 100);
    }

    #[tokio::test]
    async fn staff_page_resolves_first_available_directory_page() {
        let server = MockServer::start().await;
        mount_page(&server, "/", "<html><body>home</body></html>").await;
        mount_page(&server, "/administration", "<html><body>our administrators</body></html>").await;
        mount_page(&server, "/leadership", "<html><body>leadership team</body></html>").await;

        let lead = lead_with_website(&server.uri());
        let enriched = enrich_lead(&lead, &test_fetcher(), &DraftService::dry()).await;
        assert!(
            enriched
                .staff_page
                .as_deref()
                .unwrap()
                .ends_with("/administration")
        );
    }
}
