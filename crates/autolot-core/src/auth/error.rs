use reqwest::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The auth service refused the request; `message` is its own wording
    #[error("{}", rejected_message(.status, .message))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to store session: {0}")]
    Storage(#[from] StoreError),
}

fn rejected_message(status: &StatusCode, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("Request rejected with status {}", status),
    }
}

impl AuthError {
    /// Server wording when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AuthError::Rejected {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AuthError::Rejected { status, .. } => Some(*status),
            AuthError::Network(e) => e.status(),
            _ => None,
        }
    }
}
