//! Access token resolution and request headers

use crate::config::secret::{secret_token, SecretString};
use crate::domain::errors::TripdataError;
use crate::domain::result::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use secrecy::ExposeSecret;
use std::path::Path;

/// Resolves the archive access token
///
/// The environment variable wins; the secrets file is only consulted when the
/// variable is unset or blank. A missing token is not an error.
///
/// # Arguments
///
/// * `env_var` - Name of the environment variable, e.g. `GITHUB_TOKEN`
/// * `secrets_file` - Dotenv-style file holding `env_var=...`
pub fn resolve_token(env_var: &str, secrets_file: &Path) -> Option<SecretString> {
    if let Some(token) = secret_token(std::env::var(env_var).ok()) {
        tracing::debug!(source = %env_var, "Using access token from environment");
        return Some(token);
    }

    let token = secret_token(token_from_file(env_var, secrets_file));
    if token.is_some() {
        tracing::debug!(source = %secrets_file.display(), "Using access token from secrets file");
    }
    token
}

fn token_from_file(key: &str, path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }

    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read secrets file");
            return None;
        }
    };

    for entry in entries {
        match entry {
            Ok((name, value)) if name == key => return Some(value),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping malformed secrets file line");
            }
        }
    }

    None
}

/// Default headers for every archive request
///
/// # Errors
///
/// Returns [`TripdataError::Initialization`] if the user agent or the token
/// contain characters not allowed in an HTTP header.
pub fn archive_headers(user_agent: &str, token: Option<&SecretString>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/octet-stream"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .map_err(|e| TripdataError::Initialization(format!("Invalid user agent: {e}")))?,
    );

    match token {
        Some(token) => {
            let mut value =
                HeaderValue::from_str(&format!("Bearer {}", token.expose_secret().as_ref()))
                    .map_err(|_| {
                        TripdataError::Initialization(
                            "Access token contains invalid header characters".to_string(),
                        )
                    })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        None => {
            tracing::warn!("No access token configured; requests may be rate limited by the archive");
        }
    }

    Ok(headers)
}
