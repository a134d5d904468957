//! `gigsync sync` - pull calendar events and import work events as drafts.

use anyhow::{Context, Result};
use chrono::Utc;
use gigsync_core::classify::EventClassifier;
use gigsync_core::import::{select_candidates, IncomeDraft};
use gigsync_core::rules::ClassificationRule;
use gigsync_core::settings::SyncSettings;
use gigsync_core::synonyms::SynonymTable;
use gigsync_core::token::TokenGuardian;
use gigsync_core::CalendarEventRef;
use std::time::Duration;

use crate::app_config::AppConfig;
use crate::google::{self, FetchedEvent, GoogleTokenClient};
use crate::store::{self, FileCredentialStore, IncomeStore};

/// Pause between accounts when syncing them all, to stay within provider
/// rate limits.
const INTER_ACCOUNT_DELAY: Duration = Duration::from_millis(500);

pub async fn run(account: Option<String>, all: bool, days: Option<i64>) -> Result<()> {
    let app_config = AppConfig::load()?;
    let settings = store::load_settings()?;
    let credential_store = FileCredentialStore::open()?;

    let accounts: Vec<String> = if all {
        credential_store.list_accounts()?
    } else if let Some(account) = account {
        vec![account]
    } else {
        let connected = credential_store.list_accounts()?;
        match connected.len() {
            1 => connected,
            0 => Vec::new(),
            _ => anyhow::bail!("Multiple accounts connected; pass --account or --all."),
        }
    };

    if accounts.is_empty() {
        anyhow::bail!("No connected accounts. Run `gigsync connect` first.");
    }

    let refresher = GoogleTokenClient::new(app_config.client_id, app_config.client_secret);
    let guardian = TokenGuardian::new(credential_store, refresher);
    let http = reqwest::Client::new();

    let classifier = EventClassifier::new(SynonymTable::builtin());
    let rules = settings.effective_rules();
    let window_days = days.unwrap_or(settings.sync_window_days);

    let mut income = IncomeStore::load()?;

    for (i, account) in accounts.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(INTER_ACCOUNT_DELAY).await;
        }

        let added = sync_account(
            &guardian,
            &http,
            &classifier,
            &rules,
            &settings,
            &mut income,
            account,
            window_days,
        )
        .await
        .with_context(|| format!("Sync failed for {}", account))?;

        eprintln!("{}: {} new income draft(s)", account, added);
    }

    income.save()?;

    Ok(())
}

async fn sync_account(
    guardian: &TokenGuardian<FileCredentialStore, GoogleTokenClient>,
    http: &reqwest::Client,
    classifier: &EventClassifier,
    rules: &[ClassificationRule],
    settings: &SyncSettings,
    income: &mut IncomeStore,
    account: &str,
    window_days: i64,
) -> Result<usize> {
    let mut fetched: Vec<FetchedEvent> = Vec::new();

    for calendar_id in &settings.calendar_ids {
        let events = guardian
            .with_valid_token(account, |token| {
                let http = http.clone();
                let calendar_id = calendar_id.clone();
                async move { google::fetch_events(&http, &token, &calendar_id, window_days).await }
            })
            .await?;

        fetched.extend(events);
    }

    let event_refs: Vec<CalendarEventRef> = fetched.iter().map(|e| e.to_ref()).collect();
    let results = classifier.classify(&event_refs, rules);
    let candidates = select_candidates(&event_refs, &results, settings.confidence_threshold);

    let now = Utc::now();
    let drafts: Vec<IncomeDraft> = candidates
        .iter()
        .map(|candidate| {
            let occurred_at = fetched
                .iter()
                .find(|e| e.id == candidate.event_id)
                .and_then(|e| e.start);

            IncomeDraft {
                account: account.to_string(),
                event_id: candidate.event_id.clone(),
                title: candidate.title.clone(),
                occurred_at,
                imported_at: now,
            }
        })
        .collect();

    Ok(income.insert_new(drafts))
}
