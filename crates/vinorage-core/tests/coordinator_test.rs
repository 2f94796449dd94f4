#![allow(clippy::unwrap_used)]
// Integration tests for `Coordinator` against a wiremock controller.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::broadcast::error::TryRecvError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vinorage_core::{Coordinator, CoordinatorConfig, CoordinatorPhase, CoreError, RefreshEvent};

// ── Helpers ─────────────────────────────────────────────────────────

fn status_page(level: u8) -> String {
    format!(r#"<html><input id="level" type="number" value="{level}"></html>"#)
}

fn page(level: u8) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(status_page(level))
}

fn config(server: &MockServer) -> CoordinatorConfig {
    CoordinatorConfig::new(server.address().to_string())
        .with_poll_interval_secs(0)
        .with_timeout(Duration::from_millis(300))
}

fn coordinator(config: CoordinatorConfig) -> Coordinator {
    Coordinator::with_http(config, reqwest::Client::new()).unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

// ── Setup ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_setup_performs_first_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(page(42))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    assert_eq!(coordinator.state().phase(), CoordinatorPhase::Idle);
    assert!(coordinator.current_snapshot().is_none());

    let snapshot = coordinator.setup().await.unwrap();
    assert_eq!(snapshot.led_brightness, 42);
    assert_eq!(coordinator.current_snapshot().unwrap().led_brightness, 42);

    let state = coordinator.state();
    assert_eq!(state.phase(), CoordinatorPhase::Ready);
    assert!(state.last_update_success());
    assert!(state.last_success.is_some());
    assert_eq!(state.sequence, 1);

    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_setup_fails_when_first_refresh_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server).with_poll_interval_secs(1));
    let err = coordinator.setup().await.unwrap_err();
    assert!(err.is_communication(), "expected communication error, got: {err:?}");
    assert!(coordinator.current_snapshot().is_none());
    assert_eq!(coordinator.state().phase(), CoordinatorPhase::Failed);

    // No ticker was started.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(request_count(&server).await, 1);
}

// ── In-flight guard ─────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_refreshes_share_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(page(7).set_delay(Duration::from_millis(150)))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    let (a, b) = tokio::join!(coordinator.refresh_now(), coordinator.refresh_now());
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.led_brightness, 7);
    assert_eq!(coordinator.state().sequence, 1);
}

#[tokio::test]
async fn test_sequential_refreshes_fetch_each_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(7))
        .expect(2)
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    coordinator.refresh_now().await.unwrap();
    coordinator.refresh_now().await.unwrap();
    assert_eq!(coordinator.state().sequence, 2);
}

// ── Scheduled ticks ─────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_tick_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(60))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(page(10).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    let before = coordinator.setup().await.unwrap();

    coordinator.scheduled_tick().await;

    let after = coordinator.current_snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.led_brightness, 60);

    let state = coordinator.state();
    assert!(!state.last_update_success());
    assert!(!state.is_available());
    assert_eq!(state.phase(), CoordinatorPhase::Ready);
    assert!(state.last_error.as_ref().unwrap().is_communication());
}

#[tokio::test]
async fn test_tick_recovers_after_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(20))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(page(30))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    coordinator.setup().await.unwrap();

    coordinator.scheduled_tick().await;
    assert!(!coordinator.state().is_available());

    coordinator.scheduled_tick().await;
    let state = coordinator.state();
    assert!(state.is_available());
    assert_eq!(state.snapshot.as_ref().unwrap().led_brightness, 30);
    assert_eq!(state.sequence, 3);
}

// ── Listeners ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_listeners_notified_once_per_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(5))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    let mut events = coordinator.subscribe();

    coordinator.refresh_now().await.unwrap();
    coordinator.refresh_now().await.unwrap_err();

    match events.try_recv().unwrap() {
        RefreshEvent::Updated { sequence, snapshot } => {
            assert_eq!(sequence, 1);
            assert_eq!(snapshot.led_brightness, 5);
        }
        other => panic!("expected Updated, got: {other:?}"),
    }
    match events.try_recv().unwrap() {
        RefreshEvent::Failed { sequence, error, stale } => {
            assert_eq!(sequence, 2);
            assert!(error.is_communication());
            assert_eq!(stale.unwrap().led_brightness, 5);
        }
        other => panic!("expected Failed, got: {other:?}"),
    }
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_joined_refresh_notifies_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(9).set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    let mut events = coordinator.subscribe();

    let _ = tokio::join!(
        coordinator.refresh_now(),
        coordinator.refresh_now(),
        coordinator.refresh_now()
    );

    assert_eq!(events.try_recv().unwrap().sequence(), 1);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_watch_state_sees_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(33))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    let mut stream = coordinator.watch_state();
    assert_eq!(stream.current().sequence, 0);

    let watcher = tokio::spawn(async move { stream.changed().await });
    coordinator.refresh_now().await.unwrap();

    let state = tokio::time::timeout(Duration::from_secs(2), watcher)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(state.sequence, 1);
    assert_eq!(state.snapshot.as_ref().unwrap().led_brightness, 33);
}

// ── Polling lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_polling_runs_until_shutdown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(50))
        .mount(&server)
        .await;

    let config = CoordinatorConfig {
        poll_interval: Duration::from_millis(100),
        ..config(&server)
    };
    let coordinator = coordinator(config);
    coordinator.setup().await.unwrap();

    tokio::time::sleep(Duration::from_millis(450)).await;
    let polled = request_count(&server).await;
    assert!(polled >= 3, "expected ticks to poll, saw {polled} requests");

    coordinator.shutdown().await;
    assert!(coordinator.is_shut_down());
    let after_shutdown = request_count(&server).await;

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(request_count(&server).await, after_shutdown);
}

#[tokio::test]
async fn test_zero_interval_never_polls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(50))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    assert!(!coordinator.config().polling_enabled());
    coordinator.setup().await.unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(request_count(&server).await, 1);

    // Manual refreshes still work.
    coordinator.refresh_now().await.unwrap();
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_request_refresh_runs_in_background() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(12))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    coordinator.setup().await.unwrap();
    let mut events = coordinator.subscribe();

    coordinator.request_refresh();

    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.sequence(), 2);
    assert!(!event.is_failure());
}

#[tokio::test]
async fn test_refresh_after_shutdown_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(1))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    coordinator.setup().await.unwrap();
    coordinator.shutdown().await;

    let err = coordinator.refresh_now().await.unwrap_err();
    assert!(matches!(err, CoreError::Shutdown { .. }), "got: {err:?}");

    // Ticks after shutdown are silent no-ops.
    coordinator.scheduled_tick().await;
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_abandoned_refresh_still_completes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(40).set_delay(Duration::from_millis(150)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(page(70))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));

    // The only caller gives up while the fetch is still running.
    let gave_up = tokio::time::timeout(Duration::from_millis(30), coordinator.refresh_now()).await;
    assert!(gave_up.is_err());

    // The fetch finishes on its own and is published.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let state = coordinator.state();
    assert_eq!(state.sequence, 1);
    assert_eq!(coordinator.current_snapshot().unwrap().led_brightness, 40);

    // The next refresh performs a fresh fetch instead of joining a stale one.
    let snapshot = coordinator.refresh_now().await.unwrap();
    assert_eq!(snapshot.led_brightness, 70);
    assert_eq!(coordinator.state().sequence, 2);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_shutdown_drops_requested_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(10))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(page(90).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;

    let coordinator = coordinator(config(&server));
    coordinator.setup().await.unwrap();
    let mut events = coordinator.subscribe();

    coordinator.request_refresh();
    tokio::time::sleep(Duration::from_millis(50)).await;
    coordinator.shutdown().await;
    let sequence_at_shutdown = coordinator.state().sequence;

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(coordinator.state().sequence, sequence_at_shutdown);
    assert_eq!(coordinator.current_snapshot().unwrap().led_brightness, 10);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_shutdown_does_not_wait_out_a_slow_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page(5).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let coordinator = Coordinator::with_http(
        config(&server).with_timeout(Duration::from_secs(10)),
        reqwest::Client::new(),
    )
    .unwrap();
    let waiting = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.refresh_now().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    tokio::time::timeout(Duration::from_secs(1), coordinator.shutdown())
        .await
        .unwrap();
    let err = waiting.await.unwrap().unwrap_err();
    assert!(matches!(err, CoreError::Shutdown { .. }), "got: {err:?}");
    assert_eq!(coordinator.state().sequence, 0);
}
