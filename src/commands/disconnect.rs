//! `gigsync disconnect` - remove a stored credential.

use anyhow::Result;

use crate::store::FileCredentialStore;

pub fn run(account: &str) -> Result<()> {
    let store = FileCredentialStore::open()?;

    if store.remove(account)? {
        eprintln!("Disconnected {}", account);
    } else {
        eprintln!("No stored credential for {}", account);
    }

    Ok(())
}
