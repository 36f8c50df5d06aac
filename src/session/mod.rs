//! Session records for the two identity domains. Records are immutable once
//! created; a credential or identity change replaces the whole record. The
//! serde layout (camelCase) is shared by the backend payloads and the
//! persisted store.

pub mod controller;
pub mod store;

pub use controller::SessionController;
pub use store::{FileStorage, MemoryStorage, SessionStore, StorageBackend};

use serde::{Deserialize, Serialize};

/// The two isolated identity domains of the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    Company,
    Admin,
}

impl Domain {
    /// Key of this domain's record in the persisted store.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Domain::Company => "company_session",
            Domain::Admin => "admin_session",
        }
    }
}

/// Authenticated tenant-operator session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySession {
    /// Opaque bearer token. Non-empty.
    pub token: String,
    pub company_id: String,
    pub display_name: String,
}

/// Authenticated platform super-administrator session. Only exists after the
/// TOTP second factor completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    /// Opaque bearer token. Non-empty.
    pub token: String,
    pub username: String,
}

/// Transient admin-login intermediate: the first factor succeeded and the
/// backend demands a TOTP code. The challenge token is scoped solely to
/// completing verification and is never persisted; a reload mid-challenge
/// restarts from credential entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTwoFactor {
    pub challenge_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_distinct() {
        assert_ne!(Domain::Company.storage_key(), Domain::Admin.storage_key());
    }

    #[test]
    fn company_session_uses_camel_case_keys() {
        let session = CompanySession {
            token: "tok-1".to_string(),
            company_id: "acme".to_string(),
            display_name: "Acme Corp".to_string(),
        };

        let json = serde_json::to_string(&session).expect("Failed to serialize");
        assert!(json.contains("companyId"));
        assert!(json.contains("displayName"));

        let roundtrip: CompanySession = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(roundtrip, session);
    }
}
