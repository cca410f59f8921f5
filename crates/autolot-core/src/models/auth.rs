//! Request and response payloads of the auth API.

use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

use super::Role;

/// Credentials posted to `/v1/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Account registration payload for `/v1/auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "phoneNo", skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub role: Role,
}

/// Free-form acknowledgement returned by the verification endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl MessageResponse {
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().or(self.detail.as_deref())
    }
}
