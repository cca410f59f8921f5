//! Data models shared by the session store, auth flows and API client.
//!
//! - `UserRecord`, `Role`: the signed-in user as returned by `GET /me`
//! - `TokenPair`: access/refresh credentials from `POST /v1/auth/login`
//! - `Credentials`, `SignupRequest`: auth request payloads

pub mod auth;
pub mod user;

pub use auth::{Credentials, MessageResponse, SignupRequest, TokenPair};
pub use user::{Role, UserRecord};
