//! Typed backend endpoints
//!
//! Thin wrappers over [`ApiClient`] for the admin, auth and indexation
//! routes. Path ids are percent-encoded.

use indexdesk_common::time::SystemClock;
use indexdesk_domain::constants::{
    ENDPOINT_ADMINS, ENDPOINT_ADMIN_CREATE, ENDPOINT_ADMIN_UPDATE, ENDPOINT_INDEXATIONS,
    ENDPOINT_INDEXATION_ADD, ENDPOINT_INDEXATION_DELETE, ENDPOINT_INDEXATION_MANUAL_CHECK,
    ENDPOINT_LOGOUT,
};
use indexdesk_domain::{
    AdminList, IdentityCacheConfig, IndexationSummary, NewAdmin, NewIndexation, Role,
    UrlIndexation,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use urlencoding::encode;

use super::client::ApiClient;
use super::errors::ApiError;
use super::identity::{IdentityCache, IdentityOptions};
use crate::http::RequestConfig;

/// Backend commands for the admin dashboard
#[derive(Clone)]
pub struct ApiCommands {
    client: ApiClient,
    identity: IdentityCache<SystemClock>,
}

impl ApiCommands {
    /// Create a new commands instance
    ///
    /// # Arguments
    ///
    /// * `client` - API client
    /// * `identity` - TTL for the cached "current admin" lookup
    pub fn new(client: ApiClient, identity: &IdentityCacheConfig) -> Self {
        let identity = IdentityCache::new(client.clone(), identity);
        Self { client, identity }
    }

    /// The shared API client
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The identity cache behind [`get_admin_me`](Self::get_admin_me)
    pub fn identity(&self) -> &IdentityCache<SystemClock> {
        &self.identity
    }

    // === Auth ===

    /// End the backend session
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Value, ApiError> {
        self.client.get(ENDPOINT_LOGOUT).await
    }

    /// End the admin session and forget its token and cached identity
    #[instrument(skip(self))]
    pub async fn logout_admin(&self) -> Result<Value, ApiError> {
        let response = self.client.get(ENDPOINT_LOGOUT).await?;
        self.client.clear_auth_token();
        self.identity.clear();
        Ok(response)
    }

    /// Current admin, served from the identity cache
    pub async fn get_admin_me(&self, options: IdentityOptions) -> Result<Value, ApiError> {
        self.identity.get_admin_me(options).await
    }

    /// Update the current admin's profile
    ///
    /// # Errors
    ///
    /// Returns the normalized failure; the cached identity is only dropped
    /// on success
    #[instrument(skip(self, payload))]
    pub async fn update_admin<P>(&self, payload: &P) -> Result<Value, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let response = self.client.put(ENDPOINT_ADMIN_UPDATE, payload).await?;
        self.identity.invalidate(Role::Admin);
        debug!("admin profile updated");
        Ok(response)
    }

    // === Admins ===

    #[instrument(skip(self))]
    pub async fn list_admins(&self) -> Result<AdminList, ApiError> {
        self.client.get(ENDPOINT_ADMINS).await
    }

    #[instrument(skip(self, admin), fields(email = %admin.email))]
    pub async fn create_admin(&self, admin: &NewAdmin) -> Result<Value, ApiError> {
        self.client.post(ENDPOINT_ADMIN_CREATE, admin).await
    }

    // === Indexation ===

    /// All tracked URLs. A `null` body is an empty list.
    #[instrument(skip(self))]
    pub async fn list_url_indexations(&self) -> Result<Vec<UrlIndexation>, ApiError> {
        let records: Option<Vec<UrlIndexation>> = self.client.get(ENDPOINT_INDEXATIONS).await?;
        Ok(records.unwrap_or_default())
    }

    /// Per-status counts over [`list_url_indexations`](Self::list_url_indexations)
    pub async fn indexation_summary(&self) -> Result<IndexationSummary, ApiError> {
        let records = self.list_url_indexations().await?;
        Ok(IndexationSummary::from_records(&records))
    }

    #[instrument(skip(self, indexation), fields(url = %indexation.url))]
    pub async fn create_url_indexation(&self, indexation: &NewIndexation) -> Result<Value, ApiError> {
        self.client.post(ENDPOINT_INDEXATION_ADD, indexation).await
    }

    #[instrument(skip(self))]
    pub async fn delete_url_indexation(&self, id: &str) -> Result<Value, ApiError> {
        let path = format!("{ENDPOINT_INDEXATION_DELETE}/{}", encode(id));
        self.client.delete(&path).await
    }

    /// Ask the backend to re-check one URL now
    #[instrument(skip(self))]
    pub async fn run_manual_check(&self, id: &str) -> Result<Value, ApiError> {
        let path = format!("{ENDPOINT_INDEXATION_MANUAL_CHECK}/{}", encode(id));
        self.client.request(RequestConfig::post(path)).await
    }
}
