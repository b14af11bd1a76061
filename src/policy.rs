// src/policy.rs
//! Per-owner source policy: domain allow/deny lists applied to merged items before
//! enrichment and scoring.
//!
//! Rule, per item domain:
//! 1. non-empty deny list and the domain equals or is a subdomain of a deny rule → reject
//! 2. non-empty allow list and the domain matches no allow rule → reject
//! 3. otherwise admit

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::text::normalize_domain;

/// Cap per list after normalization.
pub const MAX_POLICY_DOMAINS: usize = 80;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePolicy {
    #[serde(default)]
    pub allow_domains: Vec<String>,
    #[serde(default)]
    pub deny_domains: Vec<String>,
}

/// Why an item was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyVerdict {
    Admit,
    Denied,
    NotAllowed,
}

impl SourcePolicy {
    /// Build a normalized policy from raw lists.
    pub fn new<S: AsRef<str>>(allow: &[S], deny: &[S]) -> Self {
        Self {
            allow_domains: clean_domains(allow),
            deny_domains: clean_domains(deny),
        }
    }

    /// Normalize, dedup and cap both lists.
    pub fn normalized(&self) -> Self {
        Self::new(&self.allow_domains[..], &self.deny_domains[..])
    }

    pub fn is_empty(&self) -> bool {
        self.allow_domains.is_empty() && self.deny_domains.is_empty()
    }

    /// Evaluate one (already normalized) domain. Lists are assumed normalized.
    pub fn evaluate(&self, domain: &str) -> PolicyVerdict {
        let domain = normalize_domain(domain);
        if !self.deny_domains.is_empty() && self.deny_domains.iter().any(|r| matches_rule(&domain, r))
        {
            return PolicyVerdict::Denied;
        }
        if !self.allow_domains.is_empty()
            && !self.allow_domains.iter().any(|r| matches_rule(&domain, r))
        {
            return PolicyVerdict::NotAllowed;
        }
        PolicyVerdict::Admit
    }

    pub fn admits(&self, domain: &str) -> bool {
        self.evaluate(domain) == PolicyVerdict::Admit
    }

    /// Split items into admitted ones and a rejected count.
    pub fn filter<T, F>(&self, items: Vec<T>, domain_of: F) -> (Vec<T>, usize)
    where
        F: Fn(&T) -> &str,
    {
        if self.is_empty() {
            return (items, 0);
        }
        let before = items.len();
        let kept: Vec<T> = items.into_iter().filter(|it| self.admits(domain_of(it))).collect();
        let rejected = before - kept.len();
        (kept, rejected)
    }
}

/// Exact match or subdomain of `rule`.
fn matches_rule(domain: &str, rule: &str) -> bool {
    if domain.is_empty() || rule.is_empty() {
        return false;
    }
    domain == rule
        || (domain.len() > rule.len()
            && domain.ends_with(rule)
            && domain.as_bytes()[domain.len() - rule.len() - 1] == b'.')
}

fn clean_domains<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for it in items {
        let d = normalize_domain(it.as_ref());
        if d.is_empty() || !seen.insert(d.clone()) {
            continue;
        }
        out.push(d);
        if out.len() == MAX_POLICY_DOMAINS {
            break;
        }
    }
    out
}

/// Load a policy file. Supports TOML or JSON (`allowDomains` / `denyDomains`).
pub fn load_policy_from(path: &Path) -> Result<SourcePolicy> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading source policy from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_policy(&content, ext.as_str())
}

fn parse_policy(s: &str, hint_ext: &str) -> Result<SourcePolicy> {
    let try_toml = hint_ext == "toml";
    if try_toml {
        if let Ok(p) = toml::from_str::<SourcePolicy>(s) {
            return Ok(p.normalized());
        }
    }
    if let Ok(p) = serde_json::from_str::<SourcePolicy>(s) {
        return Ok(p.normalized());
    }
    if !try_toml {
        if let Ok(p) = toml::from_str::<SourcePolicy>(s) {
            return Ok(p.normalized());
        }
    }
    Err(anyhow!("unsupported source policy format"))
}
