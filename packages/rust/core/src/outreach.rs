//! Tier-driven outreach pipelines: discovery, batch enrichment, and draft
//! generation over the lead store.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use schoolscout_crawler::PageFetcher;
use schoolscout_discovery::Provider;
use schoolscout_drafts::{Delivery, DraftService};
use schoolscout_shared::{ContactMethod, LeadId, PriorityTier, Result, ScoutError};
use schoolscout_storage::LeadStore;

use crate::enrich::enrich_lead;

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for long-running batch operations.
pub trait ProgressReporter: Send + Sync {
    /// Called as each lead is picked up.
    fn lead_started(&self, name: &str, current: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn lead_started(&self, _name: &str, _current: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Summary of a discovery run.
#[derive(Debug)]
pub struct DiscoveryStats {
    /// Leads the provider returned.
    pub found: usize,
    /// Rows that were new to the store (not merged into existing leads).
    pub new: usize,
}

/// Search a locality and upsert the results into the store.
#[instrument(skip_all, fields(locality, provider = provider.name()))]
pub async fn run_discovery(
    store: &LeadStore,
    provider: &Provider,
    locality: &str,
    max_results: usize,
) -> Result<DiscoveryStats> {
    let before = store.count_leads().await?;
    let found = provider.search(locality, max_results).await?;

    for lead in &found {
        store.upsert_lead(lead).await?;
    }

    let after = store.count_leads().await?;
    Ok(DiscoveryStats {
        found: found.len(),
        new: after.saturating_sub(before) as usize,
    })
}

// ---------------------------------------------------------------------------
// Batch enrichment
// ---------------------------------------------------------------------------

/// Enrich every stored lead, one at a time, re-upserting each result.
pub async fn run_enrichment(
    store: &LeadStore,
    fetcher: &PageFetcher,
    drafts: &DraftService,
    progress: &dyn ProgressReporter,
) -> Result<usize> {
    let leads = store.list_leads().await?;
    let total = leads.len();

    for (idx, lead) in leads.iter().enumerate() {
        progress.lead_started(&lead.name, idx + 1, total);
        let enriched = enrich_lead(lead, fetcher, drafts).await;
        store.upsert_lead(&enriched).await?;
    }

    info!(count = total, "enrichment pass complete");
    Ok(total)
}

// ---------------------------------------------------------------------------
// Draft generation
// ---------------------------------------------------------------------------

/// Generate initial outreach drafts for the highest-scoring leads.
///
/// Channel selection follows the lead's tier: Tier 1/3 get an email draft,
/// Tier 4 a contact-form message, and phone-only Tier 5 leads are skipped.
/// Tier 1/2 leads additionally get a social message when a profile is known,
/// and an email draft when an address is known and none was drafted yet.
pub async fn draft_outreach(
    store: &LeadStore,
    drafts: &DraftService,
    delivery: &dyn Delivery,
    drafts_dir: &Path,
    limit: usize,
) -> Result<usize> {
    let mut leads = store.list_leads().await?;
    leads.sort_by(|a, b| b.contact_score.cmp(&a.contact_score));

    let mut count = 0;
    for mut lead in leads {
        if count >= limit {
            break;
        }

        match lead.contact_tier {
            PriorityTier::Tier1 | PriorityTier::Tier3 => {
                let content = drafts.email_draft(&lead).await;
                let path = drafts_dir.join(format!("{}_email1.md", lead.lead_id));
                delivery.deliver(&lead, &content, &path)?;
                lead.email_draft_path = Some(path.display().to_string());
            }
            PriorityTier::Tier4 => {
                let content = drafts.contact_form_message(&lead).await;
                let path = drafts_dir.join(format!("{}_contact_form.md", lead.lead_id));
                delivery.deliver(&lead, &content, &path)?;
                lead.email_draft_path = Some(path.display().to_string());
            }
            PriorityTier::Tier5 if lead.contact_method == ContactMethod::PhoneOnly => {
                continue;
            }
            _ => {}
        }

        let reachable_socially = matches!(
            lead.contact_tier,
            PriorityTier::Tier1 | PriorityTier::Tier2
        );

        if reachable_socially && lead.social_url.is_some() {
            let content = drafts.social_message(&lead).await;
            let path = drafts_dir.join(format!("{}_social.md", lead.lead_id));
            delivery.deliver(&lead, &content, &path)?;
        }

        if reachable_socially && lead.contact_email.is_some() && lead.email_draft_path.is_none() {
            let content = drafts.email_draft(&lead).await;
            let path = drafts_dir.join(format!("{}_email1.md", lead.lead_id));
            delivery.deliver(&lead, &content, &path)?;
            lead.email_draft_path = Some(path.display().to_string());
        }

        store.upsert_lead(&lead).await?;
        count += 1;
    }

    info!(count, "outreach drafts created");
    Ok(count)
}

/// Generate a follow-up draft for every stored lead.
pub async fn generate_followups(
    store: &LeadStore,
    drafts: &DraftService,
    delivery: &dyn Delivery,
    drafts_dir: &Path,
    days: u32,
) -> Result<usize> {
    let leads = store.list_leads().await?;
    let mut count = 0;

    for mut lead in leads {
        let content = drafts.followup_draft(&lead, days).await;
        let path = drafts_dir.join(format!("{}_followup_day{days}.md", lead.lead_id));
        delivery.deliver(&lead, &content, &path)?;
        lead.followup_path = Some(path.display().to_string());
        store.upsert_lead(&lead).await?;
        count += 1;
    }

    info!(count, days, "follow-up drafts created");
    Ok(count)
}

/// Generate a call brief for one lead. Unknown ids are a usage error.
pub async fn generate_brief(
    store: &LeadStore,
    drafts: &DraftService,
    delivery: &dyn Delivery,
    briefs_dir: &Path,
    lead_id: &LeadId,
) -> Result<PathBuf> {
    let Some(mut lead) = store.get_lead(lead_id).await? else {
        return Err(ScoutError::NotFound(format!("lead id {lead_id}")));
    };

    if lead.enriched_at.is_none() {
        warn!(lead_id = %lead_id, "briefing a lead that was never enriched");
    }

    let content = drafts.call_brief(&lead).await;
    let path = briefs_dir.join(format!("{}.md", lead.lead_id));
    delivery.deliver(&lead, &content, &path)?;
    lead.brief_path = Some(path.display().to_string());
    store.upsert_lead(&lead).await?;

    Ok(path)
}
