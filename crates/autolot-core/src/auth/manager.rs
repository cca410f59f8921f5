//! Session lifecycle management.
//!
//! `SessionManager` owns the in-memory user and moves it between the two
//! session states. It is shared as `Arc<SessionManager>` between the host,
//! the idle watchdog and any API clients it hands out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::models::{Role, SignupRequest, UserRecord};
use crate::ports::{Navigator, Notification, Notifier};
use crate::store::{PersistedSession, SessionLoad, SessionStore};
use crate::token;

use super::{AuthApi, AuthError};

// ============================================================================
// Constants
// ============================================================================

const ROOT_PATH: &str = "/";

const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";
const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please try again.";
const LOGOUT_MESSAGE: &str = "Logged out successfully";
const INACTIVITY_MESSAGE: &str = "You have been logged out due to inactivity";
const SIGNUP_SUCCESS_MESSAGE: &str =
    "Signup successful! Please check your email to verify your account.";
const SIGNUP_FAILED_MESSAGE: &str = "Signup failed. Please try again.";
const RESEND_SUCCESS_MESSAGE: &str = "Verification email sent";
const RESEND_FAILED_MESSAGE: &str = "Failed to resend verification email";
const VERIFIED_MESSAGE: &str = "Email verified successfully";
const FORGOT_PASSWORD_MESSAGE: &str = "Password reset link sent to your email";

/// Simulated round-trip of the password reset request.
/// There is no reset endpoint yet, the flow only acknowledges.
const FORGOT_PASSWORD_DELAY: Duration = Duration::from_secs(1);

/// Whether a user is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(UserRecord),
}

impl SessionState {
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Anonymous => None,
        }
    }
}

pub struct SessionManager {
    auth: AuthApi,
    api_base: Option<String>,
    store: SessionStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    user: Arc<watch::Sender<Option<UserRecord>>>,
    // Set once the stored session has been looked at
    restored: AtomicBool,
}

impl SessionManager {
    pub fn new(
        config: &Config,
        store: SessionStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AuthError> {
        let auth = AuthApi::new(config.auth_api_url.clone())?;
        let (user, _) = watch::channel(None);

        Ok(Self {
            auth,
            api_base: config.api_url.clone(),
            store,
            notifier,
            navigator,
            user: Arc::new(user),
            restored: AtomicBool::new(false),
        })
    }

    /// Client for the domain API sharing this manager's session.
    pub fn api_client(&self) -> ApiClient {
        ApiClient::with_client(
            self.auth.client().clone(),
            self.api_base.clone(),
            self.store.clone(),
            Arc::clone(&self.notifier),
            Arc::clone(&self.navigator),
        )
        .attach_session_user(Arc::clone(&self.user))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn state(&self) -> SessionState {
        match self.user.borrow().clone() {
            Some(user) => SessionState::Authenticated(user),
            None => SessionState::Anonymous,
        }
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.user.borrow().clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.borrow().as_ref().map(|u| u.role.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.borrow().is_some()
    }

    /// Watch the signed-in user change.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserRecord>> {
        self.user.subscribe()
    }

    // =========================================================================
    // Restore
    // =========================================================================

    /// Pick up the session left in storage by an earlier run.
    ///
    /// Only the first call looks at storage; later calls report the current
    /// state. Anything short of a complete session with a live access token
    /// is cleared.
    pub fn restore(&self) -> SessionState {
        if self.restored.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        match self.store.load() {
            SessionLoad::Complete(session) => {
                if token::is_expired(&session.tokens.access_token) {
                    info!("Stored access token expired, clearing session");
                    self.clear_session();
                } else {
                    info!(user_id = %session.user.id, role = %session.user.role, "Session restored");
                    let role = session.user.role.clone();
                    self.user.send_replace(Some(session.user));
                    self.redirect_after_restore(&role);
                }
            }
            SessionLoad::Empty => {
                debug!("No stored session");
                self.user.send_replace(None);
            }
            SessionLoad::Partial => {
                warn!("Incomplete session in storage, clearing");
                self.clear_session();
            }
            SessionLoad::Corrupt(e) => {
                warn!(error = %e, "Unreadable user record in storage, clearing session");
                self.clear_session();
            }
        }

        self.state()
    }

    /// One-time landing redirect for a visit that starts at the root.
    /// Popup launches (e.g. the admin panel opened from another window)
    /// keep their path.
    fn redirect_after_restore(&self, role: &Role) {
        if self.navigator.current_path() != ROOT_PATH || self.navigator.opened_by_another_window() {
            return;
        }
        if let Some(path) = role.landing_path() {
            debug!(role = %role, path = path, "Redirecting to role landing page");
            self.navigator.navigate(path);
        }
    }

    // =========================================================================
    // Login / Logout
    // =========================================================================

    /// Sign in and replace any current session.
    ///
    /// On failure the previous state stays as it was. The one exception is a
    /// storage failure that also prevents putting the previous session back;
    /// the user is then signed out, since memory would otherwise claim a
    /// session storage no longer holds.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        match self.try_login(email, password).await {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role, "Login successful");
                self.notifier.notify(Notification::success(LOGIN_SUCCESS_MESSAGE));
                Ok(user)
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.notifier
                    .notify(Notification::error(e.user_message(LOGIN_FAILED_MESSAGE)));
                Err(e)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        let tokens = self.auth.login(email, password).await?;
        let user = self.auth.current_user(&tokens.access_token).await?;

        let previous = match self.store.load() {
            SessionLoad::Complete(session) => Some(session),
            _ => None,
        };
        if let Err(e) = self.store.save(&tokens, &user) {
            // The store already dropped the half-written session
            self.put_back(previous);
            return Err(e.into());
        }

        self.user.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Rewrite the session a failed login displaced.
    fn put_back(&self, previous: Option<PersistedSession>) {
        let Some(session) = previous else {
            return;
        };
        if let Err(e) = self.store.save(&session.tokens, &session.user) {
            warn!(error = %e, "Could not restore previous session");
            self.user.send_replace(None);
        }
    }

    /// Sign out. Always succeeds and needs no network.
    pub fn logout(&self) {
        info!("Logging out");
        self.end_session(Notification::info(LOGOUT_MESSAGE));
    }

    /// Idle timeout. Returns false when there was no session to end.
    pub(crate) fn expire_for_inactivity(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        info!("Session idle too long, logging out");
        self.end_session(Notification::info(INACTIVITY_MESSAGE));
        true
    }

    fn end_session(&self, notification: Notification) {
        self.clear_session();
        self.navigator.navigate(ROOT_PATH);
        self.notifier.notify(notification);
    }

    fn clear_session(&self) {
        self.store.clear();
        self.user.send_replace(None);
    }

    // =========================================================================
    // Account flows
    // =========================================================================

    /// Register an account, then ask for the verification email.
    pub async fn signup(&self, payload: &SignupRequest) -> Result<(), AuthError> {
        let result = async {
            self.auth.signup(payload).await?;
            self.auth.resend_verification(&payload.email).await
        }
        .await;

        match result {
            Ok(()) => {
                info!(role = %payload.role, "Signup successful");
                self.notifier.notify(Notification::success(SIGNUP_SUCCESS_MESSAGE));
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Signup failed");
                self.notifier
                    .notify(Notification::error(e.user_message(SIGNUP_FAILED_MESSAGE)));
                Err(e)
            }
        }
    }

    /// Confirm an email address with the token from the verification link.
    /// The outcome is returned for the caller to display.
    pub async fn verify(&self, token: &str) -> Result<String, AuthError> {
        match self.auth.verify(token).await {
            Ok(message) => Ok(message.unwrap_or_else(|| VERIFIED_MESSAGE.to_string())),
            Err(e) => {
                warn!(error = %e, "Email verification failed");
                Err(e)
            }
        }
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        match self.auth.resend_verification(email).await {
            Ok(()) => {
                self.notifier.notify(Notification::success(RESEND_SUCCESS_MESSAGE));
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Resending verification email failed");
                self.notifier
                    .notify(Notification::error(e.user_message(RESEND_FAILED_MESSAGE)));
                Err(e)
            }
        }
    }

    /// Acknowledge a password reset request. No server is contacted.
    pub async fn forgot_password(&self, _email: &str) {
        tokio::time::sleep(FORGOT_PASSWORD_DELAY).await;
        debug!("Password reset acknowledged");
        self.notifier.notify(Notification::success(FORGOT_PASSWORD_MESSAGE));
    }
}
