//! SQL migration definitions for the schoolscout lead database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed as a batch.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: leads keyed by entity_key",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per discovered organization. entity_key is the dedup identity:
-- domain when known, else normalized name + locality.
CREATE TABLE IF NOT EXISTS leads (
    lead_id              TEXT PRIMARY KEY,
    entity_key           TEXT NOT NULL,
    name                 TEXT NOT NULL,
    locality             TEXT NOT NULL,
    website              TEXT,
    domain               TEXT,
    provider             TEXT,
    source_query         TEXT,
    address              TEXT,
    phone                TEXT,
    contact_email        TEXT,
    contact_role         TEXT,
    all_emails           TEXT,
    primary_contact      TEXT,
    social_url           TEXT,
    contact_form_url     TEXT,
    contact_page         TEXT,
    about_page           TEXT,
    staff_page           TEXT,
    personalization_hook TEXT,
    contact_method       TEXT DEFAULT 'none',
    contact_score        INTEGER DEFAULT 0,
    contact_tier         TEXT DEFAULT 'Tier 5',
    enriched_at          TEXT,
    email_draft_path     TEXT,
    followup_path        TEXT,
    brief_path           TEXT,
    notes                TEXT,
    updated_at           TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_leads_entity_key ON leads(entity_key);
CREATE INDEX IF NOT EXISTS idx_leads_domain ON leads(domain);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
