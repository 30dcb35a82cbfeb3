//! Candidate resolution: pick the single best signal of each kind.
//!
//! Ranking is by role priority; ties resolve to the earliest occurrence in
//! document order (stable). The resolver also reports every distinct value
//! seen, ordered by first occurrence, independent of rank.

use std::collections::HashSet;

use schoolscout_shared::{ContactRole, SocialRole};

use crate::roles::{classify_email_role, classify_social_role};
use crate::signals::{EmailSignal, SocialSignal};

/// Outcome of resolving all email signals from one enrichment pass.
#[derive(Debug, Clone, Default)]
pub struct EmailResolution {
    /// Top-ranked address and its classified role.
    pub best: Option<(String, ContactRole)>,
    /// Every distinct address seen, first-occurrence order.
    pub all: Vec<String>,
}

/// Resolve the best contact email from extracted signals.
pub fn resolve_best_email(signals: &[EmailSignal]) -> EmailResolution {
    let mut all = Vec::new();
    let mut seen = HashSet::new();
    for signal in signals {
        if seen.insert(signal.address.to_lowercase()) {
            all.push(signal.address.clone());
        }
    }

    let best = signals
        .iter()
        .enumerate()
        .map(|(idx, signal)| (classify_email_role(&signal.address, &signal.context), idx, signal))
        .min_by_key(|(role, idx, _)| (role.priority(), *idx))
        .map(|(role, _, signal)| (signal.address.clone(), role));

    EmailResolution { best, all }
}

/// Resolve the best social profile from extracted signals.
///
/// Signals are deduplicated by href (first occurrence wins) before
/// classification, since the same profile link often appears on every page.
pub fn resolve_best_social(signals: &[SocialSignal]) -> Option<(String, SocialRole)> {
    let mut seen = HashSet::new();
    let distinct: Vec<&SocialSignal> = signals
        .iter()
        .filter(|s| seen.insert(s.href.to_lowercase()))
        .collect();

    distinct
        .iter()
        .enumerate()
        .map(|(idx, signal)| (classify_social_role(&signal.anchor, &signal.href), idx, signal))
        .min_by_key(|(role, idx, _)| (role.priority(), *idx))
        .map(|(role, _, signal)| (signal.href.clone(), role))
}
