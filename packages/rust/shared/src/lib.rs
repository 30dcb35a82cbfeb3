//! Shared types, error model, and configuration for schoolscout.
//!
//! This crate is the foundation depended on by all other schoolscout crates.
//! It provides:
//! - [`ScoutError`] — the unified error type
//! - Domain types ([`Lead`], [`ContactRole`], [`ContactAssessment`], [`PriorityTier`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlPolicyConfig, DefaultsConfig, LlmConfig, ProvidersConfig, config_dir,
    config_file_path, expand_home, init_config, load_config, load_config_from, require_api_key,
};
pub use error::{Result, ScoutError};
pub use types::{
    ContactAssessment, ContactMethod, ContactRole, Lead, LeadId, PriorityTier, SocialRole,
    domain_from_url,
};
