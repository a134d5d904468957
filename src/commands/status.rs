//! `gigsync status` - connection state for each account.

use anyhow::Result;
use chrono::Utc;
use gigsync_core::credential::{CredentialStore, OAuthCredential};

use crate::store::{FileCredentialStore, IncomeStore};

pub async fn run() -> Result<()> {
    let store = FileCredentialStore::open()?;
    let accounts = store.list_accounts()?;

    if accounts.is_empty() {
        println!("No connected accounts. Run `gigsync connect` first.");
        return Ok(());
    }

    for account in accounts {
        match store.read(&account).await? {
            Some(credential) => println!("{}: {}", account, describe(&credential)),
            None => println!("{}: missing credential file", account),
        }
    }

    let income = IncomeStore::load()?;
    println!("{} income draft(s) imported", income.len());

    Ok(())
}

fn describe(credential: &OAuthCredential) -> String {
    if credential.access_token.is_none() && credential.refresh_token.is_none() {
        return "disconnected (reconnect required)".to_string();
    }

    if !credential.is_recoverable() {
        return "no refresh token (reconnect required)".to_string();
    }

    match credential.expires_at {
        Some(expires_at) if expires_at > Utc::now() => {
            format!(
                "connected (token valid for {} min)",
                (expires_at - Utc::now()).num_minutes()
            )
        }
        _ => "connected (token expired, will refresh on next sync)".to_string(),
    }
}
