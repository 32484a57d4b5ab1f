// SPDX-License-Identifier: MIT

//! Session-credential middleware for protected routes.
//!
//! Loads the caller's session, decodes the stored credential, runs the
//! refresher (at most one token-endpoint call per request) and injects
//! the valid credential into request extensions. Callers with no
//! session at all are redirected to `/login`; callers with an unusable
//! credential get a structured 401 and must restart the flow.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{DelegatedCredential, CREDENTIAL_KEY};
use crate::session::SESSION_COOKIE;
use crate::AppState;

/// Valid credential extracted from the session, ready for API calls.
#[derive(Debug, Clone)]
pub struct AuthCredential(pub DelegatedCredential);

/// Middleware that requires a valid session credential.
pub async fn require_credential(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    // No session cookie, or the session has expired server-side:
    // start the flow from the top.
    let Some(session_id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return Redirect::temporary("/login").into_response();
    };

    let Some(stored) = state.sessions.get(&session_id, CREDENTIAL_KEY) else {
        return Redirect::temporary("/login").into_response();
    };

    let credential = match decode_stored(&stored) {
        Ok(credential) => credential,
        Err(err) => return err.into_response(),
    };

    // Refresh when expired. A refreshed credential is re-persisted so
    // the next request sees the new access token.
    let outcome = match state.oauth.ensure_valid(credential).await {
        Ok(outcome) => outcome,
        Err(err) => return err.into_response(),
    };

    if outcome.refreshed {
        state.sessions.put(
            &session_id,
            CREDENTIAL_KEY,
            Value::Object(outcome.credential.encode()),
        );
        tracing::info!("Refreshed credential persisted to session");
    }

    request
        .extensions_mut()
        .insert(AuthCredential(outcome.credential));

    next.run(request).await
}

/// Decode a session value into a credential. Anything that is not a
/// well-formed record is a malformed credential, which the error layer
/// reports as unauthenticated.
fn decode_stored(stored: &Value) -> Result<DelegatedCredential, AppError> {
    let Value::Object(record) = stored else {
        return Err(AppError::MalformedCredential(
            "session record is not an object".to_string(),
        ));
    };
    DelegatedCredential::decode(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_stored_rejects_non_object() {
        let err = decode_stored(&json!("just-a-token")).unwrap_err();
        assert!(matches!(err, AppError::MalformedCredential(_)));
    }

    #[test]
    fn test_decode_stored_accepts_encoded_credential() {
        let credential = DelegatedCredential {
            token: "access".to_string(),
            refresh_token: None,
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![],
            expiry: None,
        };

        let decoded = decode_stored(&Value::Object(credential.encode())).unwrap();
        assert_eq!(decoded, credential);
    }
}
