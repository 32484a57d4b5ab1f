// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod channel;
pub mod credential;
pub mod report;

pub use channel::{ChannelSummary, VideoAggregate, VideoTotals};
pub use credential::{CredentialRecord, DelegatedCredential, CREDENTIAL_KEY};
pub use report::{IdScope, ReportQuery};
