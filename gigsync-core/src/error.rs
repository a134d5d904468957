//! Error types for the gigsync core.

use thiserror::Error;

/// Failures while loading or persisting stored state (credentials, settings).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse stored data: {0}")]
    Parse(String),
}

/// Failures reported by the provider's token-refresh endpoint.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// The grant is invalid or has been revoked; the user must reconnect.
    #[error("Refresh token rejected by provider: {0}")]
    InvalidGrant(String),

    /// Anything else (network failure, 5xx, rate limit); safe to retry later.
    #[error("Token refresh failed: {0}")]
    Transient(String),
}

/// Errors surfaced by the token lifecycle.
#[derive(Error, Debug)]
pub enum TokenError {
    /// No usable credential exists for this account.
    #[error("No connected account: {0}")]
    NotConnected(String),

    /// A credential exists but holds no refresh token, so it cannot recover
    /// from expiry.
    #[error("Stored credential for {0} has no refresh token; reconnect required")]
    RefreshUnavailable(String),

    /// The refresh call to the provider failed.
    #[error("Token refresh failed for {account}: {reason}")]
    RefreshFailed {
        account: String,
        requires_reconnect: bool,
        reason: String,
    },

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}

impl TokenError {
    /// Whether the user must re-authorize the provider account before any
    /// further sync can succeed.
    pub fn requires_reconnect(&self) -> bool {
        match self {
            TokenError::NotConnected(_) | TokenError::RefreshUnavailable(_) => true,
            TokenError::RefreshFailed {
                requires_reconnect, ..
            } => *requires_reconnect,
            TokenError::Store(_) => false,
        }
    }
}

/// Typed classification of failures from external API calls made with an
/// access token. Retry logic dispatches on these variants, never on raw
/// response shapes.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP 401/403 class: the token was rejected. The only class that
    /// triggers a forced refresh and a single retry.
    #[error("Authorization rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },
}

impl ApiError {
    pub fn is_authorization(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Errors surfaced by a full sync operation (token handling plus the wrapped
/// external call).
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Validation failures for sync settings loaded from disk.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Unsupported settings version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("confidence_threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    #[error("sync_window_days must be positive, got {0}")]
    InvalidSyncWindow(i64),

    #[error("Rule '{0}' is enabled but has no keywords")]
    EmptyKeywords(String),

    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),
}
