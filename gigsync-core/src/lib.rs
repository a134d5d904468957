//! Core logic for gigsync, independent of any HTTP client or storage backend.
//!
//! Two components do the real work:
//! - [`token::TokenGuardian`] keeps a connected account's access token valid
//!   and retries a rejected call exactly once after a forced refresh.
//! - [`classify::EventClassifier`] labels calendar events as work or personal
//!   using ordered keyword rules with synonym expansion.
//!
//! Everything at the boundary (credential storage, the token-refresh
//! endpoint) is a trait, implemented by the CLI crate.

pub mod classify;
pub mod clock;
pub mod credential;
pub mod error;
pub mod import;
pub mod rules;
pub mod settings;
pub mod synonyms;
pub mod token;

// Re-export the main types at crate root for convenience
pub use classify::{CalendarEventRef, ClassificationResult, EventClassifier};
pub use clock::{Clock, SystemClock};
pub use credential::{CredentialStore, OAuthCredential};
pub use error::{ApiError, RefreshError, SettingsError, StoreError, SyncError, TokenError};
pub use import::{ImportCandidate, IncomeDraft};
pub use rules::{ClassificationRule, MatchScope, RuleKind, default_rules};
pub use settings::SyncSettings;
pub use synonyms::SynonymTable;
pub use token::{RefreshedToken, TokenGuardian, TokenRefresher};
