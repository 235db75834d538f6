use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

/// Task as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteTask {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `PUT /api/tasks/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Client-owned annotations persisted under [`crate::TASKS_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalMeta {
    #[serde(alias = "_id")]
    pub id: Uuid,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
}

/// Server fields merged with the local annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTask {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub priority: Priority,
    pub due_at: Option<DateTime<Utc>>,
}

impl BoardTask {
    /// Tasks without a cache entry get `Medium` and no due time.
    pub fn merge(remote: RemoteTask, meta: Option<&LocalMeta>) -> Self {
        Self {
            id: remote.id,
            title: remote.title,
            completed: remote.completed,
            created_at: remote.created_at,
            priority: meta.map(|m| m.priority).unwrap_or_default(),
            due_at: meta.and_then(|m| m.due_at),
        }
    }

    /// Takes the server-owned fields, keeps the local annotations.
    pub fn apply_remote(&mut self, remote: RemoteTask) {
        self.title = remote.title;
        self.completed = remote.completed;
        self.created_at = remote.created_at;
    }

    pub fn meta(&self) -> LocalMeta {
        LocalMeta {
            id: self.id,
            due_at: self.due_at,
            priority: self.priority,
        }
    }
}

/// Accepts RFC 3339, a bare `YYYY-MM-DD` (midnight UTC) or a naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` (UTC). Anything else reads as no due time.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
