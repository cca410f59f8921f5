//! Session core of the autolot marketplace client.
//!
//! - `token`: expiry checks on bearer tokens
//! - `store`: the persisted session (access token, refresh token, user)
//! - `api`: authenticated requests against the marketplace API
//! - `auth`: login/signup/verification flows, restore, idle timeout
//! - `ports`: notifications, navigation and activity events from the host

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod ports;
pub mod store;
pub mod token;

pub use api::{ApiClient, ApiError, RequestOptions};
pub use auth::{AuthError, IdleWatchdog, SessionManager, SessionState, IDLE_TIMEOUT};
pub use config::{Config, SessionBackend};
pub use models::{Role, SignupRequest, TokenPair, UserRecord};
pub use ports::{
    activity_channel, ActivityEvent, ActivityReceiver, ActivitySender, Navigator, Notification,
    NotificationLevel, Notifier,
};
pub use store::{KeyValueStore, MemoryStore, SessionStore, StorageKey};
