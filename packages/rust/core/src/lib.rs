//! Pipelines composing the schoolscout crates: single-lead enrichment and
//! the store-wide discovery, drafting, follow-up, and briefing flows.

pub mod enrich;
pub mod outreach;

pub use enrich::{EnrichmentPatch, enrich_lead};
pub use outreach::{
    DiscoveryStats, ProgressReporter, SilentProgress, draft_outreach, generate_brief,
    generate_followups, run_discovery, run_enrichment,
};
