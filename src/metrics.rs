//! Derived profile metrics
//!
//! Reduces a [`ProfileData`] document into the views the presenter renders:
//! - audit pass/fail counts, deduplicated by result path
//! - the user's level for the tracked events
//! - per-project XP ranked by total
//! - module XP rounded to thousands, and the milestone flag
//!
//! Everything here is a pure function of its input.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::profile::{AuditRecord, ClosureType, EventLevelEntry, ProfileData, Transaction};

/// Module XP above which the profile celebrates.
pub const XP_MILESTONE: f64 = 600_000.0;

/// Only transactions of this type count toward project XP.
pub const XP_TRANSACTION_TYPE: &str = "xp";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditCounts {
    pub pass_count: usize,
    pub fail_count: usize,
}

impl AuditCounts {
    pub fn total(&self) -> usize {
        self.pass_count + self.fail_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLevel {
    Level(String),
    NotAvailable,
}

impl fmt::Display for ResolvedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => f.write_str(level),
            Self::NotAvailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for ResolvedLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectXp {
    pub project: String,
    pub amount: f64,
}

/// User fields handed to the presenter alongside the metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub login: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub audit_ratio: f64,
    pub total_up: f64,
    pub total_down: f64,
}

/// Everything the presenter may show. Rendering never looks at raw data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileMetrics {
    pub user: Option<UserSummary>,
    pub audits: AuditCounts,
    pub level: ResolvedLevel,
    pub projects: Vec<ProjectXp>,
    pub total_xp_kb: i64,
    pub milestone_reached: bool,
}

impl ProfileMetrics {
    pub fn from_profile(data: &ProfileData) -> Self {
        let login = data.current_login();
        let module_xp = data.module_xp_sum();

        Self {
            user: data.current_user().map(|u| UserSummary {
                login: u.login.clone(),
                first_name: u.first_name.clone(),
                last_name: u.last_name.clone(),
                email: u.email.clone(),
                audit_ratio: u.audit_ratio,
                total_up: u.total_up,
                total_down: u.total_down,
            }),
            audits: audit_counts(&data.audit, login),
            level: resolve_level(&data.event_user, login),
            projects: rank_projects(&data.transaction),
            total_xp_kb: total_xp_display(module_xp),
            milestone_reached: milestone_reached(module_xp),
        }
    }
}

/// Count distinct passed and failed result paths, skipping self-audits.
///
/// With no known login nothing is treated as a self-audit.
pub fn audit_counts(audits: &[AuditRecord], current_login: Option<&str>) -> AuditCounts {
    let mut passed = HashSet::new();
    let mut failed = HashSet::new();

    for audit in audits {
        if current_login.is_some() && audit.auditor_login.as_deref() == current_login {
            continue;
        }
        let Some(path) = audit.result_path() else {
            continue;
        };
        match audit.closure_type {
            ClosureType::Succeeded => {
                passed.insert(path);
            }
            ClosureType::Failed => {
                failed.insert(path);
            }
            ClosureType::Other => {}
        }
    }

    AuditCounts {
        pass_count: passed.len(),
        fail_count: failed.len(),
    }
}

/// Level from the first entry owned by the current login.
///
/// Entries without a login or a level are skipped.
pub fn resolve_level(entries: &[EventLevelEntry], current_login: Option<&str>) -> ResolvedLevel {
    let Some(login) = current_login else {
        return ResolvedLevel::NotAvailable;
    };
    entries
        .iter()
        .filter(|e| e.user_login.as_deref() == Some(login))
        .find_map(|e| e.level.clone())
        .map(ResolvedLevel::Level)
        .unwrap_or(ResolvedLevel::NotAvailable)
}

/// Sum xp per project (last path segment), highest first.
///
/// Ties keep the order in which projects were first seen.
pub fn rank_projects(transactions: &[Transaction]) -> Vec<ProjectXp> {
    let mut ranked: Vec<ProjectXp> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tx in transactions {
        if tx.kind.as_deref() != Some(XP_TRANSACTION_TYPE) {
            continue;
        }
        let Some(path) = tx.path.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        let project = project_name(path);

        match index.get(project) {
            Some(&i) => ranked[i].amount += tx.amount,
            None => {
                index.insert(project, ranked.len());
                ranked.push(ProjectXp {
                    project: project.to_string(),
                    amount: tx.amount,
                });
            }
        }
    }

    // sort_by is stable
    ranked.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    ranked
}

fn project_name(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => path,
    }
}

/// Module XP in thousands, halves rounded up. Missing aggregate counts as zero.
pub fn total_xp_display(sum: Option<f64>) -> i64 {
    let kb = sum.unwrap_or(0.0) / 1000.0;
    (kb + 0.5).floor() as i64
}

pub fn milestone_reached(sum: Option<f64>) -> bool {
    sum.unwrap_or(0.0) > XP_MILESTONE
}
