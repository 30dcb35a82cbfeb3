//! Minimal robots.txt evaluation.
//!
//! A policy is parsed once per host and consulted per URL path. The gate is
//! fail-open: when no robots.txt can be fetched or parsed, the decision is
//! [`RobotsDecision::Unknown`], which callers collapse to "allowed" —
//! absence of a robots file is a normal, permissive case on the web.

/// Three-valued outcome of a robots lookup for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsDecision {
    /// The matched group explicitly or implicitly allows this path.
    Allowed,
    /// The matched group disallows this path.
    Disallowed,
    /// No policy could be determined (missing or unreadable robots.txt).
    Unknown,
}

impl RobotsDecision {
    /// Collapse `Unknown` to allowed at the call site.
    pub fn permits(self) -> bool {
        !matches!(self, Self::Disallowed)
    }
}

#[derive(Debug, Clone)]
struct RobotsRule {
    allow: bool,
    path: String,
}

#[derive(Debug, Default)]
struct Group {
    agents: Vec<String>,
    rules: Vec<RobotsRule>,
}

/// Directives from one robots.txt, reduced to the group matching our agent.
#[derive(Debug, Clone, Default)]
pub struct RobotsPolicy {
    rules: Vec<RobotsRule>,
}

impl RobotsPolicy {
    /// Parse robots.txt content, keeping the rule group that applies to
    /// `user_agent` (most specific agent token wins, `*` is the fallback).
    pub fn parse(content: &str, user_agent: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut in_agent_run = false;

        for raw_line in content.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            let field = field.trim().to_ascii_lowercase();
            let value = value.trim();

            match field.as_str() {
                "user-agent" => {
                    if !in_agent_run || groups.is_empty() {
                        groups.push(Group::default());
                    }
                    groups
                        .last_mut()
                        .expect("group pushed above")
                        .agents
                        .push(value.to_ascii_lowercase());
                    in_agent_run = true;
                }
                "allow" | "disallow" => {
                    in_agent_run = false;
                    // An empty Disallow value permits everything; no rule needed.
                    if value.is_empty() {
                        continue;
                    }
                    if let Some(group) = groups.last_mut() {
                        group.rules.push(RobotsRule {
                            allow: field == "allow",
                            path: value.to_string(),
                        });
                    }
                }
                _ => {
                    in_agent_run = false;
                }
            }
        }

        let ua = user_agent.to_ascii_lowercase();
        let mut wildcard: Option<&Group> = None;
        let mut specific: Option<(&Group, usize)> = None;
        for group in &groups {
            for agent in &group.agents {
                if agent == "*" {
                    wildcard.get_or_insert(group);
                } else if ua.contains(agent.as_str())
                    && specific.is_none_or(|(_, len)| agent.len() > len)
                {
                    specific = Some((group, agent.len()));
                }
            }
        }

        let chosen = specific.map(|(group, _)| group).or(wildcard);
        Self {
            rules: chosen.map(|group| group.rules.clone()).unwrap_or_default(),
        }
    }

    /// Decide whether `path` may be fetched. Longest matching rule wins;
    /// on equal length, Allow beats Disallow; no match means allowed.
    pub fn decision(&self, path: &str) -> RobotsDecision {
        let mut best: Option<&RobotsRule> = None;
        for rule in &self.rules {
            if !path.starts_with(rule.path.as_str()) {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => {
                    rule.path.len() > current.path.len()
                        || (rule.path.len() == current.path.len() && rule.allow && !current.allow)
                }
            };
            if better {
                best = Some(rule);
            }
        }
        match best {
            Some(rule) if !rule.allow => RobotsDecision::Disallowed,
            _ => RobotsDecision::Allowed,
        }
    }
}
