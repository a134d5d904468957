//! Stored OAuth credentials and the storage boundary they live behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// The OAuth credential for one connected provider account.
///
/// A credential with a refresh token can always recover from expiry. One
/// with neither token is a terminal state until the user relinks the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthCredential {
    pub account_id: String,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Absent means "treat the access token as expired".
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl OAuthCredential {
    /// Whether this credential can still mint new access tokens.
    pub fn is_recoverable(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// Storage boundary for credentials, keyed by account.
///
/// Only the token refresh path writes; everything else treats stored
/// credentials as read-only input.
pub trait CredentialStore {
    async fn read(&self, account: &str) -> Result<Option<OAuthCredential>, StoreError>;
    async fn write(&self, credential: &OAuthCredential) -> Result<(), StoreError>;
}
