//! Admin account types
//!
//! The backend is a document store, so ids arrive as `_id` and field names
//! are camelCase. Fields the client does not model are kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Admin account as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdminAccount {
    /// "First Last", skipping missing parts
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Payload of the "current admin" endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityEnvelope {
    pub user: AdminAccount,
}

/// Payload of the admin listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminList {
    #[serde(default)]
    pub admins: Vec<AdminAccount>,
}

/// Body for creating an admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdmin {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}
