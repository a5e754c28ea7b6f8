//! `pa-cli login`.

use secrecy::SecretString;
use serde_json::json;

use pharmacy_admin::api::ApiClient;

use super::{CliError, emit};

/// Log in and print the token and its expiry.
///
/// # Errors
///
/// Returns `CliError::Api` when the API refuses the credentials.
pub async fn login(client: &ApiClient, username: &str, password: String) -> Result<(), CliError> {
    let password = SecretString::from(password);
    let session = client.login(username.trim(), &password).await?;

    tracing::info!(username = username.trim(), "Logged in");
    emit(&json!({
        "token": session.token.expose(),
        "expires_at": session.expires_at.map(|at| at.to_rfc3339()),
        "message": session.message,
    }))
}
