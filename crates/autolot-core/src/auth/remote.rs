//! Calls against the auth service.
//!
//! These go straight to the auth base URL rather than through `ApiClient`:
//! a 401 here means bad credentials, not an expired session.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::error::server_message;
use crate::models::{Credentials, MessageResponse, SignupRequest, TokenPair, UserRecord};

use super::AuthError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/v1/auth/login";
const SIGNUP_PATH: &str = "/v1/auth/signup";
const VERIFY_PATH: &str = "/v1/auth/verify";
const RESEND_VERIFICATION_PATH: &str = "/v1/auth/resend-verification";
const CURRENT_USER_PATH: &str = "/me";

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthApi {
    client: Client,
    base_url: Option<String>,
}

impl AuthApi {
    pub fn new(base_url: Option<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: Option<String>) -> Self {
        Self { client, base_url }
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    fn url(&self, path: &str) -> Result<String, AuthError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or_else(|| AuthError::Configuration("auth API base URL is not set".to_string()))?;
        Ok(format!("{}{}", base.trim_end_matches('/'), path))
    }

    /// Check if response is successful, returning an error with the
    /// server's message if not.
    async fn check_response(response: Response) -> Result<Response, AuthError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(AuthError::Rejected {
                status,
                message: server_message(&body),
            })
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, AuthError> {
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(format!("{}: {}", what, e)))
    }

    /// Exchange credentials for a token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let url = self.url(LOGIN_PATH)?;
        debug!(url = %url, "Sending login request");

        let response = self
            .client
            .post(&url)
            .json(&Credentials { email, password })
            .send()
            .await?;

        Self::parse(response, "login response").await
    }

    /// Profile of the user owning `access_token`.
    pub async fn current_user(&self, access_token: &str) -> Result<UserRecord, AuthError> {
        let url = self.url(CURRENT_USER_PATH)?;

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::parse(response, "user profile").await
    }

    pub async fn signup(&self, payload: &SignupRequest) -> Result<(), AuthError> {
        let url = self.url(SIGNUP_PATH)?;

        let response = self.client.post(&url).json(payload).send().await?;

        Self::check_response(response).await?;
        Ok(())
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let url = self.url(RESEND_VERIFICATION_PATH)?;

        let response = self
            .client
            .post(&url)
            .query(&[("email", email)])
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Confirm an email address. Returns the server's acknowledgement text.
    pub async fn verify(&self, token: &str) -> Result<Option<String>, AuthError> {
        let url = self.url(VERIFY_PATH)?;

        let response = self
            .client
            .get(&url)
            .query(&[("token", token)])
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        // Some deployments answer with an empty body
        let body = response.text().await?;
        let parsed: MessageResponse = serde_json::from_str(&body).unwrap_or_default();
        Ok(parsed.text().map(str::to_string))
    }
}
