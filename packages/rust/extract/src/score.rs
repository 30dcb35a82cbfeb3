//! Contactability scoring: the decision table that drives all downstream
//! outreach choices.
//!
//! The table is evaluated top-to-bottom and the first matching row wins.
//! The tier comes from that row; the two +5 post-adjustments can move the
//! score but never the tier.

use schoolscout_shared::{ContactAssessment, ContactMethod, ContactRole, PriorityTier, SocialRole};

/// Local-part aliases treated as generic inboxes rather than named people.
const GENERIC_ALIASES: &[&str] = &["info@", "office@", "admissions@", "contact@"];

/// Everything the scorer looks at for one lead.
#[derive(Debug, Clone, Default)]
pub struct ContactEvidence {
    /// Resolved best email and its role.
    pub email: Option<(String, ContactRole)>,
    /// Role of the resolved best social profile, if one was found.
    pub social_role: Option<SocialRole>,
    /// A contact form was discovered.
    pub has_contact_form: bool,
    /// A phone number is known.
    pub has_phone: bool,
    /// The lead's locality string appears in the aggregated page text.
    pub locality_corroborated: bool,
}

/// Score the evidence into a method label, a score in [0, 100], and a tier.
pub fn assess_contactability(evidence: &ContactEvidence) -> ContactAssessment {
    let email_role = evidence.email.as_ref().map(|(_, role)| *role);
    let email_addr = evidence
        .email
        .as_ref()
        .map(|(address, _)| address.to_lowercase());
    let addr = email_addr.as_deref();

    let (base, method, tier) = if email_role == Some(ContactRole::Principal) {
        (100u32, ContactMethod::PrincipalEmail, PriorityTier::Tier1)
    } else if email_role == Some(ContactRole::OperationsDirector) {
        (95, ContactMethod::DirectorEmail, PriorityTier::Tier1)
    } else if evidence.social_role == Some(SocialRole::Principal) {
        (85, ContactMethod::SocialProfile, PriorityTier::Tier2)
    } else if evidence.social_role == Some(SocialRole::OperationsDirector) {
        (80, ContactMethod::SocialProfile, PriorityTier::Tier2)
    } else if evidence.social_role == Some(SocialRole::School) {
        (75, ContactMethod::SocialProfile, PriorityTier::Tier2)
    } else if email_role == Some(ContactRole::Admissions) {
        // The bare alias is worth less than a named admissions contact.
        let score = if addr.is_some_and(|a| a.starts_with("admissions@")) {
            70
        } else {
            90
        };
        (score, ContactMethod::AdmissionsEmail, PriorityTier::Tier3)
    } else if addr.is_some_and(|a| a.contains("info@")) {
        (65, ContactMethod::GeneralEmail, PriorityTier::Tier3)
    } else if addr.is_some_and(|a| a.contains("office@")) {
        (60, ContactMethod::GeneralEmail, PriorityTier::Tier3)
    } else if addr.is_some() {
        (50, ContactMethod::GeneralEmail, PriorityTier::Tier3)
    } else if evidence.has_contact_form {
        (40, ContactMethod::ContactForm, PriorityTier::Tier4)
    } else if evidence.has_phone {
        (20, ContactMethod::PhoneOnly, PriorityTier::Tier5)
    } else {
        (0, ContactMethod::None, PriorityTier::Tier5)
    };

    let mut score = base;

    // A named personal address is worth more than a shared inbox.
    if let Some(a) = addr
        && !GENERIC_ALIASES.iter().any(|alias| a.starts_with(alias))
        && base < 100
    {
        score += 5;
    }

    // A social profile plus the locality appearing on the site corroborates
    // that we found the right organization.
    if evidence.social_role.is_some() && evidence.locality_corroborated {
        score += 5;
    }

    ContactAssessment {
        method,
        score: score.min(100) as u8,
        tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(address: &str, role: ContactRole) -> Option<(String, ContactRole)> {
        Some((address.into(), role))
    }

    #[test]
    fn principal_email_caps_at_100() {
        let assessment = assess_contactability(&ContactEvidence {
            email: email("principal@eastside.edu", ContactRole::Principal),
            ..Default::default()
        });
        assert_eq!(assessment.method, ContactMethod::PrincipalEmail);
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.tier, PriorityTier::Tier1);
    }

    #[test]
    fn director_email_gets_named_bonus() {
        let assessment = assess_contactability(&ContactEvidence {
            email: email("maria.ops@eastside.edu", ContactRole::OperationsDirector),
            ..Default::default()
        });
        assert_eq!(assessment.method, ContactMethod::DirectorEmail);
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.tier, PriorityTier::Tier1);
    }

    #[test]
    fn email_row_outranks_social_row() {
        let assessment = assess_contactability(&ContactEvidence {
            email: email("principal@eastside.edu", ContactRole::Principal),
            social_role: Some(SocialRole::Principal),
            ..Default::default()
        });
        assert_eq!(assessment.method, ContactMethod::PrincipalEmail);
        assert_eq!(assessment.tier, PriorityTier::Tier1);
    }

    #[test]
    fn social_profile_tiers() {
        for (role, expected) in [
            (SocialRole::Principal, 85),
            (SocialRole::OperationsDirector, 80),
            (SocialRole::School, 75),
        ] {
            let assessment = assess_contactability(&ContactEvidence {
                social_role: Some(role),
                ..Default::default()
            });
            assert_eq!(assessment.method, ContactMethod::SocialProfile);
            assert_eq!(assessment.score, expected);
            assert_eq!(assessment.tier, PriorityTier::Tier2);
        }
    }

    #[test]
    fn named_admissions_beats_bare_alias() {
        let named = assess_contactability(&ContactEvidence {
            email: email("klee@eastside.edu", ContactRole::Admissions),
            ..Default::default()
        });
        assert_eq!(named.method, ContactMethod::AdmissionsEmail);
        assert_eq!(named.score, 95); // 90 base + 5 named-address bonus
        assert_eq!(named.tier, PriorityTier::Tier3);

        let alias = assess_contactability(&ContactEvidence {
            email: email("admissions@eastside.edu", ContactRole::Admissions),
            ..Default::default()
        });
        assert_eq!(alias.score, 70); // alias gets no bonus
        assert_eq!(alias.tier, PriorityTier::Tier3);
    }

    #[test]
    fn info_alias_scores_65_with_no_bonus() {
        let assessment = assess_contactability(&ContactEvidence {
            email: email("info@school.org", ContactRole::Office),
            ..Default::default()
        });
        assert_eq!(assessment.method, ContactMethod::GeneralEmail);
        assert_eq!(assessment.score, 65);
        assert_eq!(assessment.tier, PriorityTier::Tier3);
    }

    #[test]
    fn office_alias_scores_60() {
        let assessment = assess_contactability(&ContactEvidence {
            email: email("office@school.org", ContactRole::Office),
            ..Default::default()
        });
        assert_eq!(assessment.score, 60);
    }

    #[test]
    fn unclassified_email_scores_50_plus_named_bonus() {
        let assessment = assess_contactability(&ContactEvidence {
            email: email("jdoe@school.org", ContactRole::Unknown),
            ..Default::default()
        });
        assert_eq!(assessment.method, ContactMethod::GeneralEmail);
        assert_eq!(assessment.score, 55);
        assert_eq!(assessment.tier, PriorityTier::Tier3);
    }

    #[test]
    fn contact_form_only() {
        let assessment = assess_contactability(&ContactEvidence {
            has_contact_form: true,
            ..Default::default()
        });
        assert_eq!(assessment.method, ContactMethod::ContactForm);
        assert_eq!(assessment.score, 40);
        assert_eq!(assessment.tier, PriorityTier::Tier4);
    }

    #[test]
    fn phone_only() {
        let assessment = assess_contactability(&ContactEvidence {
            has_phone: true,
            ..Default::default()
        });
        assert_eq!(assessment.method, ContactMethod::PhoneOnly);
        assert_eq!(assessment.score, 20);
        assert_eq!(assessment.tier, PriorityTier::Tier5);
    }

    #[test]
    fn nothing_at_all() {
        let assessment = assess_contactability(&ContactEvidence::default());
        assert_eq!(assessment.method, ContactMethod::None);
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.tier, PriorityTier::Tier5);
    }

    #[test]
    fn locality_bonus_requires_social_profile() {
        let with_social = assess_contactability(&ContactEvidence {
            social_role: Some(SocialRole::School),
            locality_corroborated: true,
            ..Default::default()
        });
        assert_eq!(with_social.score, 80);

        let without_social = assess_contactability(&ContactEvidence {
            email: email("info@school.org", ContactRole::Office),
            locality_corroborated: true,
            ..Default::default()
        });
        assert_eq!(without_social.score, 65);
    }

    #[test]
    fn bonuses_never_change_tier_and_score_stays_clamped() {
        let assessment = assess_contactability(&ContactEvidence {
            email: email("klee@eastside.edu", ContactRole::Admissions),
            social_role: Some(SocialRole::School),
            locality_corroborated: true,
            ..Default::default()
        });
        // 90 + 5 + 5 clamps to 100, but the tier stays on the admissions row.
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.tier, PriorityTier::Tier3);
    }

    #[test]
    fn score_always_within_bounds() {
        let evidence_sets = [
            ContactEvidence::default(),
            ContactEvidence {
                email: email("principal@x.edu", ContactRole::Principal),
                social_role: Some(SocialRole::Principal),
                has_contact_form: true,
                has_phone: true,
                locality_corroborated: true,
            },
            ContactEvidence {
                has_phone: true,
                locality_corroborated: true,
                ..Default::default()
            },
        ];
        for evidence in &evidence_sets {
            let assessment = assess_contactability(evidence);
            assert!(assessment.score <= 100);
        }
    }
}
