//! Application constants
//!
//! Pipeline defaults and backend endpoint paths.

// Request pipeline defaults
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 300;

// Identity cache
pub const DEFAULT_IDENTITY_TTL_MS: u64 = 30_000;

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Auth endpoints
pub const ENDPOINT_LOGOUT: &str = "/api/v1/auth/logout";

// Admin endpoints
pub const ENDPOINT_ADMIN_ME: &str = "/api/v1/user/admin/me";
pub const ENDPOINT_ADMIN_UPDATE: &str = "/api/v1/user/admin/update";
pub const ENDPOINT_ADMINS: &str = "/api/v1/user/admins";
pub const ENDPOINT_ADMIN_CREATE: &str = "/api/v1/user/admin/addnew";

// URL indexation endpoints
pub const ENDPOINT_INDEXATIONS: &str = "/api/v1/indexation/urls";
pub const ENDPOINT_INDEXATION_ADD: &str = "/api/v1/indexation/urls/add-url";
pub const ENDPOINT_INDEXATION_DELETE: &str = "/api/v1/indexation/urls/delete-url";
pub const ENDPOINT_INDEXATION_MANUAL_CHECK: &str = "/api/v1/indexation/urls/manual-check";
