// SPDX-License-Identifier: MIT

//! Delegated OAuth credential and its session codec.
//!
//! A credential lives in the session as a flat key-value record so the
//! session layer never needs to know its shape. Decoding validates the
//! required fields explicitly instead of failing deep inside an API
//! call with a half-built credential.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Well-known session key under which the encoded credential is stored.
pub const CREDENTIAL_KEY: &str = "credentials";

/// An OAuth credential obtained through delegated authorization.
#[derive(Debug, Clone, PartialEq)]
pub struct DelegatedCredential {
    /// Bearer access token for API calls.
    pub token: String,
    /// Refresh token, absent when the user did not grant offline access.
    pub refresh_token: Option<String>,
    /// Token endpoint used for exchange and refresh.
    pub token_uri: String,
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Scopes granted by the user, in the order the provider returned them.
    pub scopes: Vec<String>,
    /// Access token expiry; absent when the provider did not report one.
    pub expiry: Option<DateTime<Utc>>,
}

/// Flat record shape used for opaque session storage.
pub type CredentialRecord = Map<String, Value>;

impl DelegatedCredential {
    /// Whether the access token has expired as of `now`.
    ///
    /// A credential without a reported expiry is assumed valid; the
    /// upstream API is the authority in that case.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| now >= expiry)
    }

    /// Encode into a flat key-value record for session storage.
    pub fn encode(&self) -> CredentialRecord {
        let mut record = Map::new();
        record.insert("token".to_string(), Value::String(self.token.clone()));
        record.insert(
            "refresh_token".to_string(),
            match &self.refresh_token {
                Some(token) => Value::String(token.clone()),
                None => Value::Null,
            },
        );
        record.insert(
            "token_uri".to_string(),
            Value::String(self.token_uri.clone()),
        );
        record.insert(
            "client_id".to_string(),
            Value::String(self.client_id.clone()),
        );
        record.insert(
            "client_secret".to_string(),
            Value::String(self.client_secret.clone()),
        );
        record.insert(
            "scopes".to_string(),
            Value::Array(
                self.scopes
                    .iter()
                    .map(|scope| Value::String(scope.clone()))
                    .collect(),
            ),
        );
        // Full-precision RFC 3339 so decode(encode(c)) == c exactly
        record.insert(
            "expiry".to_string(),
            match self.expiry {
                Some(expiry) => Value::String(expiry.to_rfc3339()),
                None => Value::Null,
            },
        );
        record
    }

    /// Decode a session record back into a credential.
    ///
    /// Fails with [`AppError::MalformedCredential`] when a required
    /// field (token, token_uri, client_id, client_secret) is missing or
    /// has the wrong type.
    pub fn decode(record: &CredentialRecord) -> Result<Self, AppError> {
        let required = |field: &'static str| -> Result<String, AppError> {
            record
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    AppError::MalformedCredential(format!("missing field: {field}"))
                })
        };

        let optional = |field: &str| -> Option<String> {
            record
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let scopes = match record.get("scopes") {
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        AppError::MalformedCredential("non-string scope entry".to_string())
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(AppError::MalformedCredential(
                    "scopes is not a list".to_string(),
                ))
            }
        };

        let expiry = match optional("expiry") {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| {
                        AppError::MalformedCredential(format!("bad expiry timestamp: {e}"))
                    })?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(Self {
            token: required("token")?,
            refresh_token: optional("refresh_token"),
            token_uri: required("token_uri")?,
            client_id: required("client_id")?,
            client_secret: required("client_secret")?,
            scopes,
            expiry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_credential() -> DelegatedCredential {
        DelegatedCredential {
            token: "ya29.access".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "client-id.apps.googleusercontent.com".to_string(),
            client_secret: "shhh".to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/youtube.readonly".to_string(),
                "https://www.googleapis.com/auth/yt-analytics.readonly".to_string(),
            ],
            expiry: Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let credential = sample_credential();
        let decoded = DelegatedCredential::decode(&credential.encode()).unwrap();
        assert_eq!(decoded, credential);
    }

    #[test]
    fn test_roundtrip_preserves_subsecond_expiry() {
        let credential = DelegatedCredential {
            expiry: Some(Utc::now()),
            ..sample_credential()
        };
        let decoded = DelegatedCredential::decode(&credential.encode()).unwrap();
        assert_eq!(decoded, credential);
    }

    #[test]
    fn test_roundtrip_without_refresh_token_or_expiry() {
        let credential = DelegatedCredential {
            refresh_token: None,
            expiry: None,
            ..sample_credential()
        };
        let record = credential.encode();
        assert_eq!(record.get("refresh_token"), Some(&Value::Null));
        assert_eq!(record.get("expiry"), Some(&Value::Null));

        let decoded = DelegatedCredential::decode(&record).unwrap();
        assert_eq!(decoded, credential);
    }

    #[test]
    fn test_scope_order_preserved() {
        let credential = sample_credential();
        let decoded = DelegatedCredential::decode(&credential.encode()).unwrap();
        assert_eq!(decoded.scopes, credential.scopes);
    }

    #[test]
    fn test_decode_missing_required_field() {
        for field in ["token", "token_uri", "client_id", "client_secret"] {
            let mut record = sample_credential().encode();
            record.remove(field);

            let err = DelegatedCredential::decode(&record).unwrap_err();
            assert!(
                matches!(err, AppError::MalformedCredential(ref msg) if msg.contains(field)),
                "expected MalformedCredential for missing {field}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_bad_expiry() {
        let mut record = sample_credential().encode();
        record.insert(
            "expiry".to_string(),
            Value::String("not-a-timestamp".to_string()),
        );
        let err = DelegatedCredential::decode(&record).unwrap_err();
        assert!(matches!(err, AppError::MalformedCredential(_)));
    }

    #[test]
    fn test_decode_rejects_non_list_scopes() {
        let mut record = sample_credential().encode();
        record.insert("scopes".to_string(), Value::String("read".to_string()));
        let err = DelegatedCredential::decode(&record).unwrap_err();
        assert!(matches!(err, AppError::MalformedCredential(_)));
    }

    #[test]
    fn test_is_expired() {
        let credential = sample_credential();
        let before = Utc.with_ymd_and_hms(2025, 5, 31, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();

        assert!(!credential.is_expired(before));
        assert!(credential.is_expired(after));
        // Boundary: now == expiry counts as expired
        assert!(credential.is_expired(credential.expiry.unwrap()));

        let no_expiry = DelegatedCredential {
            expiry: None,
            ..credential
        };
        assert!(!no_expiry.is_expired(after));
    }
}
