//! Authentication and session lifecycle.
//!
//! This module provides:
//! - `SessionManager`: login, signup, verification, logout and restore
//! - `IdleWatchdog`: forced logout after a period without user activity
//! - `AuthApi`: the raw calls against the auth service
//!
//! A session is the access token, refresh token and user record kept
//! together in the `SessionStore`. The refresh token is stored but never
//! exchanged; once the access token expires the user signs in again.

pub mod error;
pub mod manager;
pub mod remote;
pub mod watchdog;

pub use error::AuthError;
pub use manager::{SessionManager, SessionState};
pub use remote::AuthApi;
pub use watchdog::{IdleWatchdog, IDLE_TIMEOUT};
