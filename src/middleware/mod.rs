// SPDX-License-Identifier: MIT

//! Middleware modules (session authentication, security headers).

pub mod security;
pub mod session_auth;

pub use session_auth::{require_credential, AuthCredential};
