//! `gigsync connect` - run the OAuth flow and store the credential.

use anyhow::{Context, Result};
use gigsync_core::credential::{CredentialStore, OAuthCredential};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::app_config::AppConfig;
use crate::google::{self, GoogleTokenClient};
use crate::store::FileCredentialStore;

const REDIRECT_PORT: u16 = 8310;

fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

/// Start a local HTTP server to receive the OAuth callback
fn wait_for_callback(expected_state: &str) -> Result<String> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", REDIRECT_PORT))
        .with_context(|| format!("Failed to bind to port {}", REDIRECT_PORT))?;

    eprintln!("Waiting for OAuth callback on port {}...", REDIRECT_PORT);

    let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    // Parse the request to get the code and state
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .context("Invalid request")?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let code = url
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
        .context("No code in callback")?;

    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .context("No state in callback")?;

    if state != expected_state {
        anyhow::bail!("OAuth state mismatch");
    }

    // Send a response to the browser
    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>Account connected!</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    stream.write_all(response.as_bytes())?;
    stream.flush()?;

    Ok(code)
}

pub async fn run() -> Result<()> {
    let app_config = AppConfig::load()?;
    let client = GoogleTokenClient::new(
        app_config.client_id.clone(),
        app_config.client_secret.clone(),
    );

    let state = format!(
        "{:x}",
        SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos()
    );
    let auth_url = google::consent_url(&app_config.client_id, &redirect_uri(), &state)?;

    eprintln!("\nOpen this URL in your browser to connect your Google account:\n");
    eprintln!("{}\n", auth_url);

    // Try to open the browser automatically
    if open::that(&auth_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let code = wait_for_callback(&state)?;

    eprintln!("\nReceived authorization code, exchanging for tokens...");

    let tokens = client.exchange_code(&code, &redirect_uri()).await?;

    // Discover the user's email
    let http = reqwest::Client::new();
    let account = google::primary_calendar_id(&http, &tokens.access_token)
        .await
        .context("Failed to discover the connected account")?;

    let credential = OAuthCredential {
        account_id: account.clone(),
        access_token: Some(tokens.access_token),
        refresh_token: tokens.refresh_token,
        expires_at: tokens.expires_at,
    };

    let store = FileCredentialStore::open()?;
    store
        .write(&credential)
        .await
        .context("Failed to save credential")?;

    eprintln!("Connected {}", account);

    Ok(())
}
