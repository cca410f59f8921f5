mod common;

use std::time::Duration;

use autolot_core::{activity_channel, ActivityEvent, IdleWatchdog, Role, SessionState, IDLE_TIMEOUT};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{live_token, user_json, user_with_role, Harness};

const INACTIVITY_MESSAGE: &str = "You have been logged out due to inactivity";

fn signed_in() -> Harness {
    let h = Harness::new(None, None);
    h.seed_session(&live_token(), &user_with_role(Role::Seller));
    h.manager.restore();
    assert!(h.manager.is_authenticated());
    h
}

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_logs_out() {
    let h = signed_in();
    let (_activity, events) = activity_channel();
    let _watchdog = IdleWatchdog::spawn(h.manager.clone(), events, IDLE_TIMEOUT);

    tokio::time::sleep(IDLE_TIMEOUT - Duration::from_secs(1)).await;
    assert!(h.manager.is_authenticated());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.manager.state(), SessionState::Anonymous);
    assert!(h.kv.is_empty());
    assert_eq!(h.notifier.messages(), vec![INACTIVITY_MESSAGE.to_string()]);
    assert_eq!(h.navigator.navigations(), vec!["/".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_activity_resets_countdown() {
    let h = signed_in();
    let (activity, events) = activity_channel();
    let _watchdog = IdleWatchdog::spawn(h.manager.clone(), events, IDLE_TIMEOUT);

    for event in ActivityEvent::ALL {
        tokio::time::sleep(Duration::from_secs(10 * 60)).await;
        activity.record(event);
    }

    // 40 minutes in, last activity 0 minutes ago
    tokio::time::sleep(Duration::from_secs(14 * 60)).await;
    assert!(h.manager.is_authenticated());

    tokio::time::sleep(Duration::from_secs(2 * 60)).await;
    assert!(!h.manager.is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_when_anonymous_is_silent() {
    let h = Harness::new(None, None);
    h.manager.restore();
    let (_activity, events) = activity_channel();
    let _watchdog = IdleWatchdog::spawn(h.manager.clone(), events, IDLE_TIMEOUT);

    tokio::time::sleep(IDLE_TIMEOUT * 2).await;
    assert!(h.notifier.all().is_empty());
    assert!(h.navigator.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_closed_activity_source_still_times_out() {
    let h = signed_in();
    let (activity, events) = activity_channel();
    let _watchdog = IdleWatchdog::spawn(h.manager.clone(), events, IDLE_TIMEOUT);

    tokio::time::sleep(Duration::from_secs(60)).await;
    activity.record(ActivityEvent::KeyPress);
    drop(activity);

    tokio::time::sleep(IDLE_TIMEOUT + Duration::from_secs(61)).await;
    assert!(!h.manager.is_authenticated());
    assert_eq!(h.notifier.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_stops_on_drop() {
    let h = signed_in();
    let (activity, events) = activity_channel();
    let watchdog = IdleWatchdog::spawn(h.manager.clone(), events, IDLE_TIMEOUT);
    assert!(watchdog.is_running());

    watchdog.shutdown();
    tokio::time::sleep(IDLE_TIMEOUT * 2).await;

    assert!(h.manager.is_authenticated());
    // Recording after shutdown is a no-op
    activity.record(ActivityEvent::Scroll);
}

// Real clock while talking to the mock server, paused clock for the waits
#[tokio::test]
async fn test_watchdog_rearms_after_firing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": live_token(), "refresh_token": "R" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("seller")))
        .mount(&server)
        .await;

    let h = Harness::new(Some(server.uri()), None);
    h.seed_session(&live_token(), &user_with_role(Role::Seller));
    h.manager.restore();

    tokio::time::pause();
    let (activity, events) = activity_channel();
    let watchdog = IdleWatchdog::spawn(h.manager.clone(), events, IDLE_TIMEOUT);
    tokio::time::sleep(IDLE_TIMEOUT + Duration::from_secs(1)).await;
    assert!(!h.manager.is_authenticated());
    tokio::time::resume();

    h.manager.login("sam@example.com", "hunter2").await.unwrap();
    assert!(h.manager.is_authenticated());

    tokio::time::pause();
    activity.record(ActivityEvent::Click);
    tokio::time::sleep(IDLE_TIMEOUT - Duration::from_secs(1)).await;
    assert!(h.manager.is_authenticated());
    assert!(watchdog.is_running());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!h.manager.is_authenticated());
    assert_eq!(
        h.notifier.messages(),
        vec![
            INACTIVITY_MESSAGE.to_string(),
            "Login successful".to_string(),
            INACTIVITY_MESSAGE.to_string(),
        ]
    );
    assert_eq!(h.navigator.navigations(), vec!["/".to_string(), "/".to_string()]);
}
