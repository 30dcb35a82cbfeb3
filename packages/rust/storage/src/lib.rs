//! libSQL lead store.
//!
//! [`LeadStore`] wraps a local libSQL database holding one row per
//! discovered organization. Rows are keyed internally by the lead's
//! identity key (domain, else normalized name + locality), so repeated
//! discovery and enrichment passes merge into one record instead of
//! duplicating it. Field merge is "prefer incoming value when non-empty,
//! else keep existing".

mod migrations;

use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};
use tracing::debug;

use schoolscout_shared::{ContactMethod, ContactRole, Lead, LeadId, PriorityTier, Result, ScoutError};

/// Column list shared by queries and row decoding. Order matters.
const LEAD_COLUMNS: &str = "lead_id, entity_key, name, locality, website, domain, provider, \
     source_query, address, phone, contact_email, contact_role, all_emails, primary_contact, \
     social_url, contact_form_url, contact_page, about_page, staff_page, personalization_hook, \
     contact_method, contact_score, contact_tier, enriched_at, email_draft_path, followup_path, \
     brief_path, notes";

/// Primary storage handle wrapping a libSQL database.
pub struct LeadStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl LeadStore {
    /// Open or create a database at `path`, applying pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ScoutError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| ScoutError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| ScoutError::Storage(e.to_string()))?;

        let store = Self { db, conn };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    ScoutError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Lead operations
    // -----------------------------------------------------------------------

    /// Insert or merge a lead by its identity key.
    ///
    /// On conflict every column except `lead_id` and `entity_key` merges via
    /// `COALESCE(excluded.col, existing.col)` — incoming non-null wins.
    pub async fn upsert_lead(&self, lead: &Lead) -> Result<()> {
        let entity_key = lead.entity_key();
        debug!(lead_id = %lead.lead_id, entity_key, "upserting lead");

        let all_emails = if lead.all_emails.is_empty() {
            None
        } else {
            Some(
                serde_json::to_string(&lead.all_emails)
                    .map_err(|e| ScoutError::Storage(e.to_string()))?,
            )
        };

        // An unenriched lead has never been scored; binding NULL here keeps
        // a later discovery pass from clobbering an earlier scoring pass.
        let (method, score, tier) = if lead.enriched_at.is_some() {
            (
                Some(lead.contact_method.as_str()),
                Some(i64::from(lead.contact_score)),
                Some(lead.contact_tier.label()),
            )
        } else {
            (None, None, None)
        };

        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                &format!(
                    "INSERT INTO leads ({LEAD_COLUMNS}, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
                             ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29)
                     ON CONFLICT(entity_key) DO UPDATE SET
                       name = COALESCE(excluded.name, leads.name),
                       locality = COALESCE(excluded.locality, leads.locality),
                       website = COALESCE(excluded.website, leads.website),
                       domain = COALESCE(excluded.domain, leads.domain),
                       provider = COALESCE(excluded.provider, leads.provider),
                       source_query = COALESCE(excluded.source_query, leads.source_query),
                       address = COALESCE(excluded.address, leads.address),
                       phone = COALESCE(excluded.phone, leads.phone),
                       contact_email = COALESCE(excluded.contact_email, leads.contact_email),
                       contact_role = COALESCE(excluded.contact_role, leads.contact_role),
                       all_emails = COALESCE(excluded.all_emails, leads.all_emails),
                       primary_contact = COALESCE(excluded.primary_contact, leads.primary_contact),
                       social_url = COALESCE(excluded.social_url, leads.social_url),
                       contact_form_url = COALESCE(excluded.contact_form_url, leads.contact_form_url),
                       contact_page = COALESCE(excluded.contact_page, leads.contact_page),
                       about_page = COALESCE(excluded.about_page, leads.about_page),
                       staff_page = COALESCE(excluded.staff_page, leads.staff_page),
                       personalization_hook = COALESCE(excluded.personalization_hook, leads.personalization_hook),
                       contact_method = COALESCE(excluded.contact_method, leads.contact_method),
                       contact_score = COALESCE(excluded.contact_score, leads.contact_score),
                       contact_tier = COALESCE(excluded.contact_tier, leads.contact_tier),
                       enriched_at = COALESCE(excluded.enriched_at, leads.enriched_at),
                       email_draft_path = COALESCE(excluded.email_draft_path, leads.email_draft_path),
                       followup_path = COALESCE(excluded.followup_path, leads.followup_path),
                       brief_path = COALESCE(excluded.brief_path, leads.brief_path),
                       notes = COALESCE(excluded.notes, leads.notes),
                       updated_at = excluded.updated_at"
                ),
                params![
                    lead.lead_id.to_string(),
                    entity_key,
                    lead.name.as_str(),
                    lead.locality.as_str(),
                    lead.website.as_deref(),
                    lead.domain.as_deref(),
                    lead.provider.as_deref(),
                    lead.source_query.as_deref(),
                    lead.address.as_deref(),
                    lead.phone.as_deref(),
                    lead.contact_email.as_deref(),
                    lead.contact_role.map(|r| r.as_str()),
                    all_emails.as_deref(),
                    lead.primary_contact.as_deref(),
                    lead.social_url.as_deref(),
                    lead.contact_form_url.as_deref(),
                    lead.contact_page.as_deref(),
                    lead.about_page.as_deref(),
                    lead.staff_page.as_deref(),
                    lead.personalization_hook.as_deref(),
                    method,
                    score,
                    tier,
                    lead.enriched_at.map(|t| t.to_rfc3339()),
                    lead.email_draft_path.as_deref(),
                    lead.followup_path.as_deref(),
                    lead.brief_path.as_deref(),
                    lead.notes.as_deref(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| ScoutError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get a lead by its identifier.
    pub async fn get_lead(&self, lead_id: &LeadId) -> Result<Option<Lead>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE lead_id = ?1"),
                params![lead_id.to_string()],
            )
            .await
            .map_err(|e| ScoutError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_lead(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(ScoutError::Storage(e.to_string())),
        }
    }

    /// List all leads, most recently updated first, then by name.
    pub async fn list_leads(&self) -> Result<Vec<Lead>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {LEAD_COLUMNS} FROM leads ORDER BY updated_at DESC, name ASC"
                ),
                params![],
            )
            .await
            .map_err(|e| ScoutError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_lead(&row)?);
        }
        Ok(results)
    }

    /// Count stored leads.
    pub async fn count_leads(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM leads", params![])
            .await
            .map_err(|e| ScoutError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0).max(0) as u64),
            _ => Ok(0),
        }
    }
}

/// Convert a database row (in `LEAD_COLUMNS` order) to a [`Lead`].
fn row_to_lead(row: &libsql::Row) -> Result<Lead> {
    let storage_err = |e: libsql::Error| ScoutError::Storage(e.to_string());

    let lead_id: String = row.get(0).map_err(storage_err)?;
    let lead_id: LeadId = lead_id
        .parse()
        .map_err(|e| ScoutError::Storage(format!("invalid lead_id: {e}")))?;

    let all_emails = row
        .get::<String>(12)
        .ok()
        .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
        .unwrap_or_default();

    let contact_role = row
        .get::<String>(11)
        .ok()
        .and_then(|raw| raw.parse::<ContactRole>().ok());

    let contact_method = row
        .get::<String>(20)
        .ok()
        .and_then(|raw| raw.parse::<ContactMethod>().ok())
        .unwrap_or_default();

    let contact_tier = row
        .get::<String>(22)
        .ok()
        .and_then(|raw| raw.parse::<PriorityTier>().ok())
        .unwrap_or_default();

    let enriched_at = row.get::<String>(23).ok().and_then(|raw| {
        chrono::DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .ok()
    });

    Ok(Lead {
        lead_id,
        name: row.get::<String>(2).map_err(storage_err)?,
        locality: row.get::<String>(3).map_err(storage_err)?,
        website: row.get::<String>(4).ok(),
        domain: row.get::<String>(5).ok(),
        provider: row.get::<String>(6).ok(),
        source_query: row.get::<String>(7).ok(),
        address: row.get::<String>(8).ok(),
        phone: row.get::<String>(9).ok(),
        contact_email: row.get::<String>(10).ok(),
        contact_role,
        all_emails,
        primary_contact: row.get::<String>(13).ok(),
        social_url: row.get::<String>(14).ok(),
        contact_form_url: row.get::<String>(15).ok(),
        contact_page: row.get::<String>(16).ok(),
        about_page: row.get::<String>(17).ok(),
        staff_page: row.get::<String>(18).ok(),
        personalization_hook: row.get::<String>(19).ok(),
        contact_method,
        contact_score: row.get::<i64>(21).ok().unwrap_or(0).clamp(0, 100) as u8,
        contact_tier,
        enriched_at,
        email_draft_path: row.get::<String>(24).ok(),
        followup_path: row.get::<String>(25).ok(),
        brief_path: row.get::<String>(26).ok(),
        notes: row.get::<String>(27).ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use schoolscout_shared::ContactAssessment;
    use uuid::Uuid;

    /// Create a temp file store for testing.
    async fn test_store() -> LeadStore {
        let tmp = std::env::temp_dir().join(format!("scout_test_{}.db", Uuid::now_v7()));
        LeadStore::open(&tmp).await.expect("open test db")
    }

    fn discovered_lead(name: &str, domain: Option<&str>) -> Lead {
        let mut lead = Lead::new(name, "Downey, CA");
        lead.domain = domain.map(str::to_string);
        lead.website = domain.map(|d| format!("https://{d}"));
        lead.provider = Some("serpapi".into());
        lead
    }

    #[tokio::test]
    async fn open_and_migrate_idempotently() {
        let tmp = std::env::temp_dir().join(format!("scout_test_{}.db", Uuid::now_v7()));
        let first = LeadStore::open(&tmp).await.expect("first open");
        assert_eq!(first.get_schema_version().await, 1);
        drop(first);
        let second = LeadStore::open(&tmp).await.expect("second open");
        assert_eq!(second.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn same_domain_merges_into_one_row() {
        let store = test_store().await;

        store
            .upsert_lead(&discovered_lead("Eastside Prep", Some("eastside.edu")))
            .await
            .expect("first upsert");
        // Same school rediscovered under a slightly different name.
        store
            .upsert_lead(&discovered_lead("Eastside Preparatory", Some("eastside.edu")))
            .await
            .expect("second upsert");

        assert_eq!(store.count_leads().await.unwrap(), 1);
        let leads = store.list_leads().await.unwrap();
        assert_eq!(leads[0].name, "Eastside Preparatory");
    }

    #[tokio::test]
    async fn same_name_locality_merges_without_domain() {
        let store = test_store().await;
        store
            .upsert_lead(&discovered_lead("St. Marks School", None))
            .await
            .unwrap();
        store
            .upsert_lead(&discovered_lead("St. Marks School", None))
            .await
            .unwrap();
        assert_eq!(store.count_leads().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn merge_prefers_incoming_non_empty_fields() {
        let store = test_store().await;

        let mut original = discovered_lead("Eastside Prep", Some("eastside.edu"));
        original.address = Some("123 Main St".into());
        store.upsert_lead(&original).await.unwrap();

        let mut enriched = discovered_lead("Eastside Prep", Some("eastside.edu"));
        enriched.contact_email = Some("principal@eastside.edu".into());
        enriched.contact_role = Some(schoolscout_shared::ContactRole::Principal);
        enriched.all_emails = vec!["principal@eastside.edu".into()];
        enriched.set_assessment(ContactAssessment {
            method: ContactMethod::PrincipalEmail,
            score: 100,
            tier: PriorityTier::Tier1,
        });
        enriched.enriched_at = Some(Utc::now());
        store.upsert_lead(&enriched).await.unwrap();

        let leads = store.list_leads().await.unwrap();
        assert_eq!(leads.len(), 1);
        let merged = &leads[0];
        // Incoming contact fields won; the existing address survived.
        assert_eq!(merged.contact_email.as_deref(), Some("principal@eastside.edu"));
        assert_eq!(merged.address.as_deref(), Some("123 Main St"));
        assert_eq!(merged.contact_score, 100);
        assert_eq!(merged.contact_tier, PriorityTier::Tier1);
        assert_eq!(merged.all_emails, vec!["principal@eastside.edu".to_string()]);
    }

    #[tokio::test]
    async fn rediscovery_does_not_clobber_scored_fields() {
        let store = test_store().await;

        let mut enriched = discovered_lead("Eastside Prep", Some("eastside.edu"));
        enriched.set_assessment(ContactAssessment {
            method: ContactMethod::ContactForm,
            score: 40,
            tier: PriorityTier::Tier4,
        });
        enriched.enriched_at = Some(Utc::now());
        store.upsert_lead(&enriched).await.unwrap();

        // A fresh discovery pass sees the same school, unscored.
        store
            .upsert_lead(&discovered_lead("Eastside Prep", Some("eastside.edu")))
            .await
            .unwrap();

        let leads = store.list_leads().await.unwrap();
        assert_eq!(leads[0].contact_score, 40);
        assert_eq!(leads[0].contact_method, ContactMethod::ContactForm);
        assert!(leads[0].enriched_at.is_some());
    }

    #[tokio::test]
    async fn get_lead_by_id() {
        let store = test_store().await;
        let lead = discovered_lead("Eastside Prep", Some("eastside.edu"));
        let id = lead.lead_id.clone();
        store.upsert_lead(&lead).await.unwrap();

        let found = store.get_lead(&id).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().name, "Eastside Prep");

        let missing = store.get_lead(&LeadId::new()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_orders_by_recency_then_name() {
        let store = test_store().await;
        store
            .upsert_lead(&discovered_lead("Alpha Academy", Some("alpha.edu")))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .upsert_lead(&discovered_lead("Zenith School", Some("zenith.edu")))
            .await
            .unwrap();

        let leads = store.list_leads().await.unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].name, "Zenith School");
    }
}
