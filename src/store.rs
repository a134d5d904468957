//! File-backed storage for credentials, settings, and imported drafts.
//!
//! Layout under ~/.config/gigsync/:
//!   accounts/{account}.toml  - OAuth credential per connected account (0600)
//!   settings.toml            - sync settings (rules, threshold, window)
//!   income.json              - imported income drafts, keyed account/event

use anyhow::{Context, Result};
use gigsync_core::credential::{CredentialStore, OAuthCredential};
use gigsync_core::error::StoreError;
use gigsync_core::import::{dedup_new, draft_key, IncomeDraft};
use gigsync_core::settings::SyncSettings;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::app_config::base_dir;

pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    pub fn open() -> Result<Self> {
        Ok(FileCredentialStore {
            dir: base_dir()?.join("accounts"),
        })
    }

    fn path_for_account(&self, account: &str) -> PathBuf {
        let slug = account.replace(['/', '\\', ':'], "_");
        self.dir.join(format!("{}.toml", slug))
    }

    pub fn list_accounts(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut accounts = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    accounts.push(stem.to_string());
                }
            }
        }
        accounts.sort();
        Ok(accounts)
    }

    /// Remove a stored credential. Returns whether one existed.
    pub fn remove(&self, account: &str) -> Result<bool> {
        let path = self.path_for_account(account);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        Ok(true)
    }
}

impl CredentialStore for FileCredentialStore {
    async fn read(&self, account: &str) -> Result<Option<OAuthCredential>, StoreError> {
        let path = self.path_for_account(account);

        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)?;
        let credential =
            toml::from_str(&contents).map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(Some(credential))
    }

    async fn write(&self, credential: &OAuthCredential) -> Result<(), StoreError> {
        let contents =
            toml::to_string_pretty(credential).map_err(|e| StoreError::Parse(e.to_string()))?;

        let path = self.path_for_account(&credential.account_id);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, contents)?;

        // Set to owner-only (0600) since the file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

pub fn load_settings() -> Result<SyncSettings> {
    let path = base_dir()?.join("settings.toml");

    if !path.exists() {
        return Ok(SyncSettings::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    let settings: SyncSettings = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

    settings
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;

    Ok(settings)
}

pub fn save_settings(settings: &SyncSettings) -> Result<()> {
    let contents = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    let path = base_dir()?.join("settings.toml");

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

/// Imported drafts on disk: a map from `account/event_id` to the draft.
pub struct IncomeStore {
    path: PathBuf,
    drafts: BTreeMap<String, IncomeDraft>,
}

impl IncomeStore {
    pub fn load() -> Result<Self> {
        let path = base_dir()?.join("income.json");

        let drafts = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read income drafts from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse income drafts from {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(IncomeStore { path, drafts })
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Insert-if-absent on the `(account, event_id)` key. Returns how many
    /// drafts were actually new.
    pub fn insert_new(&mut self, drafts: Vec<IncomeDraft>) -> usize {
        let existing: HashSet<String> = self.drafts.keys().cloned().collect();
        let new = dedup_new(&existing, drafts);
        let added = new.len();

        for draft in new {
            let key = draft_key(&draft.account, &draft.event_id);
            self.drafts.insert(key, draft);
        }

        added
    }

    pub fn save(&self) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(&self.drafts).context("Failed to serialize drafts")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write drafts to {}", self.path.display()))?;

        Ok(())
    }
}
