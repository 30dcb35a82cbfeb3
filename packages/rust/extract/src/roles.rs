//! Keyword-based role classifiers for extracted signals.
//!
//! Each classifier is an ordered cascade: rules are evaluated in sequence
//! and the first match wins. Order matters because the categories overlap
//! lexically ("Director of Admissions" must not land on the operations rule).

use schoolscout_shared::{ContactRole, SocialRole};

/// Email role rules, evaluated in order against address + context.
const EMAIL_ROLE_RULES: &[(&[&str], ContactRole)] = &[
    (
        &["principal", "head of school", "headmaster"],
        ContactRole::Principal,
    ),
    (
        &["director of operations", "operations director"],
        ContactRole::OperationsDirector,
    ),
    (&["admission", "enrollment"], ContactRole::Admissions),
    (
        &["office", "info@", "contact@", "front desk", "general"],
        ContactRole::Office,
    ),
];

/// Social role rules, evaluated in order against anchor text + href.
const SOCIAL_ROLE_RULES: &[(&[&str], SocialRole)] = &[
    (
        &["principal", "head of school", "headmaster"],
        SocialRole::Principal,
    ),
    (
        &["director of operations", "operations director"],
        SocialRole::OperationsDirector,
    ),
];

/// Classify an email address given its surrounding context.
pub fn classify_email_role(address: &str, context: &str) -> ContactRole {
    let haystack = format!("{address} {context}").to_lowercase();
    for (needles, role) in EMAIL_ROLE_RULES {
        if needles.iter().any(|n| haystack.contains(n)) {
            return *role;
        }
    }
    ContactRole::Unknown
}

/// Classify a social-profile link given its anchor text and href.
pub fn classify_social_role(anchor: &str, href: &str) -> SocialRole {
    let haystack = format!("{anchor} {href}").to_lowercase();
    for (needles, role) in SOCIAL_ROLE_RULES {
        if needles.iter().any(|n| haystack.contains(n)) {
            return *role;
        }
    }
    SocialRole::School
}
