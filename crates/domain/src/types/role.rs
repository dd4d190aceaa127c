//! Identity roles served by the backend

use serde::{Deserialize, Serialize};

use crate::constants::ENDPOINT_ADMIN_ME;
use crate::impl_domain_status_conversions;

/// Role whose "current identity" endpoint the client can query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
}

impl_domain_status_conversions!(Role {
    Admin => "admin",
});

impl Role {
    /// Path of the "who am I" endpoint for this role
    pub const fn me_endpoint(&self) -> &'static str {
        match self {
            Self::Admin => ENDPOINT_ADMIN_ME,
        }
    }
}
