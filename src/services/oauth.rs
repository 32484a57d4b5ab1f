// SPDX-License-Identifier: MIT

//! Google OAuth client: authorization URL construction, code exchange
//! and credential refresh.
//!
//! The refresher is a two-state machine (VALID / EXPIRED). An expired
//! credential with a refresh token gets exactly one refresh attempt per
//! request; an expired credential without one is terminally
//! unauthenticated and never hits the network.

use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::config::Config;
use crate::error::AppError;
use crate::models::DelegatedCredential;

const AUTH_BASE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth client for the authorization-code flow.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    auth_base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
}

/// Result of running the refresher over a stored credential.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    pub credential: DelegatedCredential,
    /// True when a token-endpoint call was made and the caller must
    /// re-persist the credential.
    pub refreshed: bool,
}

impl OAuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_base_url: AUTH_BASE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
        }
    }

    /// Build the authorization URL for the consent redirect.
    ///
    /// Always forces re-consent (`prompt=consent`) with offline access
    /// so Google reliably issues a refresh token.
    pub fn authorization_url(&self, state: &str) -> Result<String, AppError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(AppError::Configuration(
                "OAuth client credentials not configured".to_string(),
            ));
        }
        if self.scopes.is_empty() {
            return Err(AppError::Configuration(
                "no OAuth scopes configured".to_string(),
            ));
        }

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
             access_type=offline&prompt=consent&state={}",
            self.auth_base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scopes.join(" ")),
            state,
        ))
    }

    /// Exchange an authorization code for a credential.
    pub async fn exchange_code(&self, code: &str) -> Result<DelegatedCredential, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::AuthorizationExchangeFailed(format!("token request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Token exchange rejected");
            return Err(AppError::AuthorizationExchangeFailed(format!(
                "token endpoint returned {status}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::AuthorizationExchangeFailed(format!("bad token response: {e}"))
        })?;

        Ok(self.credential_from_token(token, None))
    }

    /// Validate a stored credential, refreshing it when expired.
    ///
    /// State machine:
    /// - VALID (not expired): returned unchanged, zero network calls.
    /// - EXPIRED with refresh token: one token-endpoint call; success
    ///   transitions back to VALID, failure is terminal.
    /// - EXPIRED without refresh token: terminal, zero network calls.
    pub async fn ensure_valid(
        &self,
        credential: DelegatedCredential,
    ) -> Result<RefreshOutcome, AppError> {
        if !credential.is_expired(Utc::now()) {
            return Ok(RefreshOutcome {
                credential,
                refreshed: false,
            });
        }

        let Some(refresh_token) = credential.refresh_token.clone() else {
            tracing::warn!("Expired credential has no refresh token, re-auth required");
            return Err(AppError::Unauthenticated);
        };

        tracing::info!("Access token expired, refreshing");

        let response = self
            .http
            .post(&credential.token_uri)
            .form(&[
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::YouTubeApi(format!("token refresh request failed: {e}")))?;

        if !response.status().is_success() {
            // Revoked or otherwise rejected refresh token: the caller
            // must restart the authorization flow.
            let status = response.status();
            tracing::warn!(status = %status, "Token refresh rejected");
            return Err(AppError::Unauthenticated);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::YouTubeApi(format!("bad refresh response: {e}")))?;

        // Google omits the refresh token from refresh responses; keep
        // the one we already hold unless a new one was issued.
        let refreshed = self.credential_from_token(token, Some(&credential));

        Ok(RefreshOutcome {
            credential: refreshed,
            refreshed: true,
        })
    }

    fn credential_from_token(
        &self,
        token: TokenResponse,
        previous: Option<&DelegatedCredential>,
    ) -> DelegatedCredential {
        let scopes = token
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .or_else(|| previous.map(|c| c.scopes.clone()))
            .unwrap_or_else(|| self.scopes.clone());

        DelegatedCredential {
            token: token.access_token,
            refresh_token: token
                .refresh_token
                .or_else(|| previous.and_then(|c| c.refresh_token.clone())),
            token_uri: self.token_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes,
            expiry: token
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Token endpoint response (shared by exchange and refresh).
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}
