//! Core domain types for schoolscout leads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// LeadId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for lead identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub Uuid);

impl LeadId {
    /// Generate a new time-sortable lead identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for LeadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LeadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LeadId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Contact roles
// ---------------------------------------------------------------------------

/// Semantic role of a resolved contact email.
///
/// Ordered by outreach priority: a principal beats an operations director,
/// which beats admissions, and so on down to an unclassified address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
    /// Principal, head of school, or headmaster.
    Principal,
    /// Director of operations.
    OperationsDirector,
    /// Admissions or enrollment contact.
    Admissions,
    /// Front office / general inbox.
    Office,
    /// No role signal in the surrounding context.
    Unknown,
}

impl ContactRole {
    /// Rank for candidate resolution — lower is better.
    pub fn priority(self) -> u8 {
        match self {
            Self::Principal => 0,
            Self::OperationsDirector => 1,
            Self::Admissions => 2,
            Self::Office => 3,
            Self::Unknown => 4,
        }
    }

    /// Stable string form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Principal => "principal",
            Self::OperationsDirector => "operations_director",
            Self::Admissions => "admissions",
            Self::Office => "office",
            Self::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for ContactRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "principal" => Ok(Self::Principal),
            "operations_director" => Ok(Self::OperationsDirector),
            "admissions" => Ok(Self::Admissions),
            "office" => Ok(Self::Office),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown contact role: {other}")),
        }
    }
}

/// Semantic role of a resolved social profile link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialRole {
    /// Profile of the principal or head of school.
    Principal,
    /// Profile of a director of operations.
    OperationsDirector,
    /// The school's own account or an unattributed profile.
    School,
}

impl SocialRole {
    /// Rank for candidate resolution — lower is better.
    pub fn priority(self) -> u8 {
        match self {
            Self::Principal => 0,
            Self::OperationsDirector => 1,
            Self::School => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Contactability
// ---------------------------------------------------------------------------

/// Coarse label for the best available way to reach a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    PrincipalEmail,
    DirectorEmail,
    SocialProfile,
    AdmissionsEmail,
    GeneralEmail,
    ContactForm,
    PhoneOnly,
    #[default]
    None,
}

impl ContactMethod {
    /// Stable string form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrincipalEmail => "principal_email",
            Self::DirectorEmail => "director_email",
            Self::SocialProfile => "social_profile",
            Self::AdmissionsEmail => "admissions_email",
            Self::GeneralEmail => "general_email",
            Self::ContactForm => "contact_form",
            Self::PhoneOnly => "phone_only",
            Self::None => "none",
        }
    }
}

impl std::str::FromStr for ContactMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "principal_email" => Ok(Self::PrincipalEmail),
            "director_email" => Ok(Self::DirectorEmail),
            "social_profile" => Ok(Self::SocialProfile),
            "admissions_email" => Ok(Self::AdmissionsEmail),
            "general_email" => Ok(Self::GeneralEmail),
            "contact_form" => Ok(Self::ContactForm),
            "phone_only" => Ok(Self::PhoneOnly),
            "none" => Ok(Self::None),
            other => Err(format!("unknown contact method: {other}")),
        }
    }
}

impl std::fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal outreach priority bucket, Tier 1 (best) through Tier 5 (worst).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum PriorityTier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    #[default]
    Tier5,
}

impl PriorityTier {
    /// Numeric rank, 1 = best.
    pub fn rank(self) -> u8 {
        match self {
            Self::Tier1 => 1,
            Self::Tier2 => 2,
            Self::Tier3 => 3,
            Self::Tier4 => 4,
            Self::Tier5 => 5,
        }
    }

    /// Human-readable label used in storage and CLI output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tier1 => "Tier 1",
            Self::Tier2 => "Tier 2",
            Self::Tier3 => "Tier 3",
            Self::Tier4 => "Tier 4",
            Self::Tier5 => "Tier 5",
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PriorityTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Tier 1" => Ok(Self::Tier1),
            "Tier 2" => Ok(Self::Tier2),
            "Tier 3" => Ok(Self::Tier3),
            "Tier 4" => Ok(Self::Tier4),
            "Tier 5" => Ok(Self::Tier5),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// Result of a contactability scoring pass. Immutable once produced;
/// written verbatim onto the lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactAssessment {
    /// Best available contact method.
    pub method: ContactMethod,
    /// Score in [0, 100].
    pub score: u8,
    /// Priority tier derived from the method row, never from bonuses.
    pub tier: PriorityTier,
}

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

/// One discovered school/organization with contact and enrichment state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    /// Stable identifier, assigned once at creation.
    pub lead_id: LeadId,
    /// Organization name.
    pub name: String,
    /// Locality string the lead was discovered in (e.g. "Downey, CA").
    pub locality: String,
    /// Canonical website URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Host with leading "www." stripped, derived from `website`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Discovery provider name ("serpapi", "brave").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// The query that produced this lead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_query: Option<String>,
    /// Best-known postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Best-known phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Resolved best contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// Classified role of the resolved email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_role: Option<ContactRole>,
    /// Every distinct email seen, first-seen order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_emails: Vec<String>,
    /// Alias of the resolved email, kept for outreach tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_contact: Option<String>,
    /// Resolved best social-profile URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_url: Option<String>,
    /// Resolved contact-form URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_form_url: Option<String>,
    /// Resolved contact page URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_page: Option<String>,
    /// Resolved about page URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_page: Option<String>,
    /// Resolved staff/directory page URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_page: Option<String>,
    /// One generated sentence referencing lead-specific page content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personalization_hook: Option<String>,
    /// Best available contact method.
    #[serde(default)]
    pub contact_method: ContactMethod,
    /// Contactability score, clamped to [0, 100].
    #[serde(default)]
    pub contact_score: u8,
    /// Outreach priority tier derived by the scorer.
    #[serde(default)]
    pub contact_tier: PriorityTier,
    /// Set on every enrichment pass; `None` means never enriched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_at: Option<DateTime<Utc>>,
    /// Path of the generated initial outreach draft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_draft_path: Option<String>,
    /// Path of the generated follow-up draft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followup_path: Option<String>,
    /// Path of the generated call brief.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief_path: Option<String>,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Lead {
    /// Create a lead with identity fields only; everything else starts empty.
    pub fn new(name: impl Into<String>, locality: impl Into<String>) -> Self {
        Self {
            lead_id: LeadId::new(),
            name: name.into(),
            locality: locality.into(),
            website: None,
            domain: None,
            provider: None,
            source_query: None,
            address: None,
            phone: None,
            contact_email: None,
            contact_role: None,
            all_emails: Vec::new(),
            primary_contact: None,
            social_url: None,
            contact_form_url: None,
            contact_page: None,
            about_page: None,
            staff_page: None,
            personalization_hook: None,
            contact_method: ContactMethod::None,
            contact_score: 0,
            contact_tier: PriorityTier::Tier5,
            enriched_at: None,
            email_draft_path: None,
            followup_path: None,
            brief_path: None,
            notes: None,
        }
    }

    /// Identity key for dedup/upsert: domain when present, else the
    /// normalized (name, locality) pair. Two leads with the same key denote
    /// the same real-world organization and must merge, never duplicate.
    pub fn entity_key(&self) -> String {
        match self.domain.as_deref() {
            Some(d) if !d.is_empty() => format!("domain:{}", d.to_lowercase()),
            _ => format!(
                "name_locality:{}::{}",
                self.name.trim().to_lowercase(),
                self.locality.trim().to_lowercase()
            ),
        }
    }

    /// Write a scoring result onto the lead.
    pub fn set_assessment(&mut self, assessment: ContactAssessment) {
        self.contact_method = assessment.method;
        self.contact_score = assessment.score;
        self.contact_tier = assessment.tier;
    }

    /// Stamp the enrichment timestamp.
    pub fn mark_enriched(&mut self) {
        self.enriched_at = Some(Utc::now());
    }
}

/// Derive a lead's domain from its website URL: lowercased host with a
/// leading "www." stripped.
pub fn domain_from_url(website: Option<&str>) -> Option<String> {
    let raw = website?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = url::Url::parse(raw).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let domain = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if domain.is_empty() { None } else { Some(domain) }
}
