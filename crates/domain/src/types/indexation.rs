//! URL indexation records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Indexation state reported by the backend.
///
/// Status strings are free-form on the wire; unknown values are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexationStatus {
    Indexed,
    NotIndexed,
    Pending,
    Invalid,
    Other(String),
}

impl IndexationStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "indexed" => Self::Indexed,
            "not_indexed" => Self::NotIndexed,
            "pending" => Self::Pending,
            "invalid" | "invalid url" => Self::Invalid,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Indexed => "indexed",
            Self::NotIndexed => "not_indexed",
            Self::Pending => "pending",
            Self::Invalid => "invalid",
            Self::Other(raw) => raw,
        }
    }

    /// Pending and invalid URLs are both still awaiting a usable result
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Self::Pending | Self::Invalid)
    }
}

impl std::fmt::Display for IndexationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IndexationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IndexationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A URL tracked for search-engine indexation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlIndexation {
    #[serde(alias = "_id")]
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub status: Option<IndexationStatus>,
    #[serde(default)]
    pub indexation_details: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for registering a single URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIndexation {
    pub url: String,
}

impl NewIndexation {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Per-status counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexationSummary {
    pub total: usize,
    pub indexed: usize,
    pub not_indexed: usize,
    /// Pending plus invalid
    pub unresolved: usize,
}

impl IndexationSummary {
    pub fn from_records(records: &[UrlIndexation]) -> Self {
        records.iter().fold(Self { total: records.len(), ..Self::default() }, |mut acc, record| {
            match &record.status {
                Some(IndexationStatus::Indexed) => acc.indexed += 1,
                Some(IndexationStatus::NotIndexed) => acc.not_indexed += 1,
                Some(status) if status.is_unresolved() => acc.unresolved += 1,
                _ => {}
            }
            acc
        })
    }
}
