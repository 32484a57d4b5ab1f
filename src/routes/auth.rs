// SPDX-License-Identifier: MIT

//! Google OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::models::CREDENTIAL_KEY;
use crate::session::{SESSION_COOKIE, SESSION_TTL_SECS};
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
}

/// Start the OAuth flow - redirect to Google's consent page.
async fn login(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let oauth_state = sign_state(&state.config.oauth_state_key)?;
    let auth_url = state.oauth.authorization_url(&oauth_state)?;

    tracing::info!("Starting OAuth flow, redirecting to Google");
    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange the code for a credential, store it in a
/// fresh session and continue to the analytics endpoint.
///
/// Every exchange failure (provider error, tampered state, rejected
/// code) sends the caller back to `/login` rather than erroring out.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return Redirect::temporary("/login").into_response();
    }

    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        tracing::warn!("Callback missing code or state parameter");
        return Redirect::temporary("/login").into_response();
    };

    if !verify_state(&oauth_state, &state.config.oauth_state_key) {
        tracing::warn!("Invalid or tampered state parameter");
        return Redirect::temporary("/login").into_response();
    }

    tracing::info!("Exchanging authorization code for credential");

    let credential = match state.oauth.exchange_code(&code).await {
        Ok(credential) => credential,
        Err(err) => {
            tracing::warn!(error = %err, "Code exchange failed, restarting flow");
            return Redirect::temporary("/login").into_response();
        }
    };

    let session_id = match rotate_session(&state, &jar) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };
    state
        .sessions
        .put(&session_id, CREDENTIAL_KEY, Value::Object(credential.encode()));

    tracing::info!("OAuth successful, credential stored in session");

    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build();

    (jar.add(cookie), Redirect::temporary("/analytics")).into_response()
}

/// Mint the session for a fresh login, destroying whichever session
/// the caller's cookie still points at so re-login never leaves an
/// orphaned credential behind server-side.
fn rotate_session(state: &AppState, jar: &CookieJar) -> Result<String> {
    if let Some(old) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(old.value());
    }
    state.sessions.create()
}

/// Sign a timestamp into an opaque state parameter.
///
/// Format before encoding: `timestamp_hex|signature_hex`, HMAC-SHA256
/// over the timestamp, the whole thing URL-safe base64.
fn sign_state(secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{timestamp:x}");

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{payload}|{signature}").as_bytes()))
}

/// Verify the HMAC signature on a state parameter.
fn verify_state(state: &str, secret: &[u8]) -> bool {
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(state) else {
        return false;
    };
    let Ok(state_str) = String::from_utf8(bytes) else {
        return false;
    };

    let parts: Vec<&str> = state_str.splitn(2, '|').collect();
    let &[payload, signature_hex] = parts.as_slice() else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected {
        tracing::warn!("OAuth state signature mismatch");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_sign_verify_roundtrip() {
        let secret = b"secret_key";
        let state = sign_state(secret).unwrap();
        assert!(verify_state(&state, secret));
    }

    #[test]
    fn test_state_wrong_secret_rejected() {
        let state = sign_state(b"secret_key").unwrap();
        assert!(!verify_state(&state, b"wrong_key"));
    }

    #[test]
    fn test_state_tampered_payload_rejected() {
        let secret = b"secret_key";
        let state = sign_state(secret).unwrap();

        let decoded = URL_SAFE_NO_PAD.decode(&state).unwrap();
        let mut text = String::from_utf8(decoded).unwrap();
        text.insert(0, 'f');
        let tampered = URL_SAFE_NO_PAD.encode(text.as_bytes());

        assert!(!verify_state(&tampered, secret));
    }

    #[test]
    fn test_state_malformed_rejected() {
        let secret = b"secret_key";
        assert!(!verify_state("not-valid-base64!!!", secret));
        assert!(!verify_state(&URL_SAFE_NO_PAD.encode("no-separator"), secret));
        assert!(!verify_state("", secret));
    }

    #[test]
    fn test_state_is_url_safe() {
        let state = sign_state(b"secret_key").unwrap();
        assert!(!state.contains('+'));
        assert!(!state.contains('/'));
        assert!(!state.contains('='));
    }

    #[test]
    fn test_rotate_session_destroys_previous() {
        let state = AppState::from_config(crate::config::Config::default());

        let old_id = state.sessions.create().unwrap();
        state
            .sessions
            .put(&old_id, CREDENTIAL_KEY, serde_json::json!({"token": "old"}));

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, old_id.clone()));
        let new_id = rotate_session(&state, &jar).unwrap();

        assert_ne!(new_id, old_id);
        assert!(!state.sessions.exists(&old_id));
        assert!(state.sessions.exists(&new_id));
        // Only the fresh session remains resident
        assert_eq!(state.sessions.len(), 1);
    }

    #[test]
    fn test_rotate_session_without_prior_cookie() {
        let state = AppState::from_config(crate::config::Config::default());

        let id = rotate_session(&state, &CookieJar::new()).unwrap();
        assert!(state.sessions.exists(&id));
        assert_eq!(state.sessions.len(), 1);
    }
}
