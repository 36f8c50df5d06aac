//! Tenant status feature client. The `is_active` flag drives the blocking
//! suspension overlay in the console, so it is surfaced exactly as the
//! backend reports it; staleness is bounded by the status poll interval.

use crate::{errors::Error, gateway::Gateway};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantStatus {
    pub is_active: bool,
    /// Optional human-readable note the backend attaches to a suspended
    /// tenant, shown verbatim on the overlay.
    #[serde(default)]
    pub message: Option<String>,
}

/// Fetches the current tenant status through the company gateway.
///
/// # Errors
/// [`Error::SessionExpired`] / [`Error::Network`] from the gateway,
/// [`Error::Http`] on any other non-2xx status, [`Error::Parse`] on a
/// malformed body.
pub async fn fetch_status(gateway: &Gateway) -> Result<TenantStatus, Error> {
    let response = gateway.get("/company/status").await?;
    crate::gateway::read_json(response).await
}
