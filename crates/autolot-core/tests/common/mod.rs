// Shared by several test binaries; each uses a different subset
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use autolot_core::store::StorageKey;
use autolot_core::{
    Config, KeyValueStore, MemoryStore, Navigator, Notification, NotificationLevel, Notifier,
    Role, SessionManager, SessionStore, UserRecord,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde_json::json;

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.all().into_iter().map(|n| n.message).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

struct NavState {
    current: String,
    popup: bool,
    navigations: Vec<String>,
    reloads: Vec<String>,
}

pub struct RecordingNavigator {
    state: Mutex<NavState>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Self {
        Self {
            state: Mutex::new(NavState {
                current: path.to_string(),
                popup: false,
                navigations: Vec::new(),
                reloads: Vec::new(),
            }),
        }
    }

    pub fn popup_at(path: &str) -> Self {
        let nav = Self::at(path);
        nav.state.lock().unwrap().popup = true;
        nav
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn reloads(&self) -> Vec<String> {
        self.state.lock().unwrap().reloads.clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.state.lock().unwrap().current.clone()
    }

    fn opened_by_another_window(&self) -> bool {
        self.state.lock().unwrap().popup
    }

    fn navigate(&self, path: &str) {
        let mut state = self.state.lock().unwrap();
        state.current = path.to_string();
        state.navigations.push(path.to_string());
    }

    fn reload(&self, path: &str) {
        let mut state = self.state.lock().unwrap();
        state.current = path.to_string();
        state.reloads.push(path.to_string());
    }
}

pub struct Harness {
    pub manager: Arc<SessionManager>,
    pub kv: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new(auth_url: Option<String>, api_url: Option<String>) -> Self {
        Self::with_navigator(auth_url, api_url, RecordingNavigator::at("/"))
    }

    pub fn with_navigator(
        auth_url: Option<String>,
        api_url: Option<String>,
        navigator: RecordingNavigator,
    ) -> Self {
        Self::build(auth_url, api_url, navigator, |kv| kv as Arc<dyn KeyValueStore>)
    }

    /// Manager whose storage goes through `wrap`; `kv` still sees the data.
    pub fn with_backend(
        auth_url: Option<String>,
        wrap: impl FnOnce(Arc<MemoryStore>) -> Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::build(auth_url, None, RecordingNavigator::at("/"), wrap)
    }

    fn build(
        auth_url: Option<String>,
        api_url: Option<String>,
        navigator: RecordingNavigator,
        wrap: impl FnOnce(Arc<MemoryStore>) -> Arc<dyn KeyValueStore>,
    ) -> Self {
        let kv = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(navigator);
        let config = Config {
            api_url,
            auth_api_url: auth_url,
            ..Default::default()
        };

        let manager = SessionManager::new(
            &config,
            SessionStore::new(wrap(kv.clone())),
            notifier.clone(),
            navigator.clone(),
        )
        .unwrap();

        Self {
            manager: Arc::new(manager),
            kv,
            notifier,
            navigator,
        }
    }

    /// Put a complete session into storage as an earlier run would have.
    pub fn seed_session(&self, access_token: &str, user: &UserRecord) {
        self.kv.set(StorageKey::AccessToken, access_token).unwrap();
        self.kv.set(StorageKey::RefreshToken, "refresh").unwrap();
        self.kv
            .set(StorageKey::User, &serde_json::to_string(user).unwrap())
            .unwrap();
    }
}

pub fn make_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "1", "exp": exp }).to_string());
    format!("{}.{}.signature", header, payload)
}

pub fn live_token() -> String {
    make_token((Utc::now() + Duration::hours(1)).timestamp())
}

pub fn expired_token() -> String {
    make_token((Utc::now() - Duration::hours(1)).timestamp())
}

pub fn user_with_role(role: Role) -> UserRecord {
    UserRecord {
        id: "1".to_string(),
        first_name: "Sam".to_string(),
        mid_name: None,
        last_name: "Seller".to_string(),
        email: "sam@example.com".to_string(),
        phone_no: Some("5551234567".to_string()),
        city: None,
        address: None,
        role,
    }
}

pub fn user_json(role: &str) -> serde_json::Value {
    json!({
        "id": "1",
        "first_name": "Sam",
        "last_name": "Seller",
        "email": "sam@example.com",
        "phoneNo": "5551234567",
        "role": role,
    })
}
