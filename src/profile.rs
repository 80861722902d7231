//! Raw profile document returned by the GraphQL endpoint

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub user: Vec<UserRecord>,
    #[serde(default)]
    pub audit: Vec<AuditRecord>,
    #[serde(default)]
    pub event_user: Vec<EventLevelEntry>,
    #[serde(default)]
    pub transaction: Vec<Transaction>,
    #[serde(default)]
    pub transaction_aggregate: Option<TransactionAggregate>,
}

impl ProfileData {
    /// The signed-in user. `None` means the record has not been loaded.
    pub fn current_user(&self) -> Option<&UserRecord> {
        self.user.first()
    }

    /// Login of the signed-in user. A null or empty login counts as unknown.
    pub fn current_login(&self) -> Option<&str> {
        self.current_user()
            .map(|u| u.login.as_str())
            .filter(|login| !login.is_empty())
    }

    /// Server-side xp sum for the module, if the aggregate came back.
    pub fn module_xp_sum(&self) -> Option<f64> {
        self.transaction_aggregate
            .as_ref()?
            .aggregate
            .as_ref()?
            .sum
            .as_ref()?
            .amount
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub login: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audit_ratio: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_up: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_down: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum ClosureType {
    Succeeded,
    Failed,
    /// Expired, canceled, unused and anything else the platform reports
    #[default]
    Other,
}

impl From<Option<String>> for ClosureType {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("succeeded") => Self::Succeeded,
            Some("failed") => Self::Failed,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    #[serde(default)]
    pub auditor_login: Option<String>,
    #[serde(default)]
    pub closure_type: ClosureType,
    #[serde(default)]
    pub result: Option<AuditResult>,
}

impl AuditRecord {
    /// Path of the audited result, ignoring empty values.
    pub fn result_path(&self) -> Option<&str> {
        self.result
            .as_ref()?
            .path
            .as_deref()
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditResult {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLevelEntry {
    #[serde(default, deserialize_with = "level_as_string")]
    pub level: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub event_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub event_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionAggregate {
    #[serde(default)]
    pub aggregate: Option<Aggregate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Aggregate {
    #[serde(default)]
    pub sum: Option<AggregateSum>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregateSum {
    #[serde(default)]
    pub amount: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Levels come back as integers from the platform but are displayed verbatim.
/// Null and non-scalar levels are treated as missing.
fn level_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s),
        _ => None,
    })
}
