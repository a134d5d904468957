//! Token lifecycle for connected provider accounts.
//!
//! [`TokenGuardian`] guarantees callers a non-expired access token, refreshing
//! and persisting the stored credential when needed, and wraps external calls
//! with a single forced-refresh retry for authorization failures.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};

use crate::clock::{Clock, SystemClock};
use crate::credential::{CredentialStore, OAuthCredential};
use crate::error::{ApiError, RefreshError, SyncError, TokenError};

/// Tokens expiring within this window are treated as already expired.
const EXPIRY_BUFFER_SECS: i64 = 5 * 60;

/// Fallback lifetime when the provider omits an expiry on refresh.
const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// A successful response from the provider's token-refresh endpoint.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// Some providers rotate the refresh token; `None` means keep the old one.
    pub refresh_token: Option<String>,
}

/// Boundary to the provider's token-refresh endpoint.
pub trait TokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, RefreshError>;
}

/// Owns the lifecycle of stored OAuth credentials.
///
/// Two callers refreshing the same expired credential concurrently may both
/// write the store; callers needing single-flight refresh must hold a
/// per-account lock outside this type.
pub struct TokenGuardian<S, R, C = SystemClock> {
    store: S,
    refresher: R,
    clock: C,
}

impl<S, R> TokenGuardian<S, R>
where
    S: CredentialStore,
    R: TokenRefresher,
{
    pub fn new(store: S, refresher: R) -> Self {
        Self::with_clock(store, refresher, SystemClock)
    }
}

impl<S, R, C> TokenGuardian<S, R, C>
where
    S: CredentialStore,
    R: TokenRefresher,
    C: Clock,
{
    pub fn with_clock(store: S, refresher: R, clock: C) -> Self {
        TokenGuardian {
            store,
            refresher,
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return an access token for `account` that is valid for immediate use.
    ///
    /// A token expiring within the next five minutes counts as expired and is
    /// refreshed (and persisted) before being returned. A token with time
    /// left is returned as stored, with no store write.
    pub async fn get_valid_access_token(&self, account: &str) -> Result<String, TokenError> {
        let credential = self
            .store
            .read(account)
            .await?
            .ok_or_else(|| TokenError::NotConnected(account.to_string()))?;

        if credential.access_token.is_none() && credential.refresh_token.is_none() {
            return Err(TokenError::NotConnected(account.to_string()));
        }

        if let (Some(token), Some(expires_at)) = (&credential.access_token, credential.expires_at) {
            if self.clock.now() < expires_at - Duration::seconds(EXPIRY_BUFFER_SECS) {
                return Ok(token.clone());
            }
        }

        self.refresh(&credential).await
    }

    /// Run `operation` with a valid access token.
    ///
    /// If the operation reports an authorization failure, the credential is
    /// re-read from the store (a concurrent caller may have rotated it),
    /// refreshed regardless of its stored expiry, and the operation is retried
    /// exactly once. Every other error class propagates immediately, and a
    /// second authorization failure is propagated unchanged.
    pub async fn with_valid_token<T, F, Fut>(
        &self,
        account: &str,
        operation: F,
    ) -> Result<T, SyncError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let token = self.get_valid_access_token(account).await?;

        match operation(token).await {
            Ok(value) => Ok(value),
            Err(error) if error.is_authorization() => {
                let credential = self
                    .store
                    .read(account)
                    .await
                    .map_err(TokenError::from)?
                    .ok_or_else(|| TokenError::NotConnected(account.to_string()))?;

                let token = self.refresh(&credential).await?;
                Ok(operation(token).await?)
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Exchange the stored refresh token for a new access token and persist
    /// the result. A rotated refresh token overwrites the stored one; an
    /// omitted one leaves it unchanged.
    async fn refresh(&self, credential: &OAuthCredential) -> Result<String, TokenError> {
        let Some(refresh_token) = credential.refresh_token.as_deref() else {
            return Err(TokenError::RefreshUnavailable(credential.account_id.clone()));
        };

        let refreshed = self
            .refresher
            .refresh(refresh_token)
            .await
            .map_err(|error| match error {
                RefreshError::InvalidGrant(reason) => TokenError::RefreshFailed {
                    account: credential.account_id.clone(),
                    requires_reconnect: true,
                    reason,
                },
                RefreshError::Transient(reason) => TokenError::RefreshFailed {
                    account: credential.account_id.clone(),
                    requires_reconnect: false,
                    reason,
                },
            })?;

        let expires_at = refreshed
            .expires_at
            .unwrap_or_else(|| self.clock.now() + Duration::seconds(DEFAULT_TOKEN_TTL_SECS));

        let updated = OAuthCredential {
            account_id: credential.account_id.clone(),
            access_token: Some(refreshed.access_token.clone()),
            refresh_token: refreshed
                .refresh_token
                .or_else(|| credential.refresh_token.clone()),
            expires_at: Some(expires_at),
        };

        self.store.write(&updated).await?;

        Ok(refreshed.access_token)
    }
}
