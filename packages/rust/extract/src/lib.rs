//! Pure contact-signal engine: extractors, role classifiers, candidate
//! resolution, and contactability scoring. No I/O happens in this crate —
//! the crawler feeds it text/markup and the orchestrator consumes its output.

pub mod resolve;
pub mod roles;
pub mod score;
pub mod signals;

pub use resolve::{EmailResolution, resolve_best_email, resolve_best_social};
pub use roles::{classify_email_role, classify_social_role};
pub use score::{ContactEvidence, assess_contactability};
pub use signals::{
    DEFAULT_CONTEXT_WINDOW, EmailSignal, SocialSignal, extract_emails_with_context,
    extract_social_links, find_contact_form_url, find_phone,
};
