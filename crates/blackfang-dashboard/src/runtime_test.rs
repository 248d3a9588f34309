use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use blackfang_core::auth::{DEMO_EMAIL, DEMO_PASSWORD};
use blackfang_core::{Credentials, Dataset};
use tokio::time::Instant;

use super::*;
use crate::reducer::{REFRESH_FAILED, REFRESH_OK};
use crate::source::{SourceError, StaticSource};
use crate::state::Section;

fn controller() -> Controller {
    Controller::new(Dataset::demo(), Credentials::demo(), Duration::from_secs(3))
}

fn settings() -> RuntimeSettings {
    RuntimeSettings::default()
}

fn toast_messages(frame: &Frame) -> Vec<String> {
    frame
        .toasts
        .as_ref()
        .map(|t| t.iter().map(|v| v.message.clone()).collect())
        .unwrap_or_default()
}

struct FailingSource;

#[async_trait]
impl DataSource for FailingSource {
    async fn fetch(&self) -> Result<Option<Dataset>, SourceError> {
        Err(SourceError::Remote("connection refused".to_string()))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

#[tokio::test(start_paused = true)]
async fn refresh_completes_after_delay_then_toast_expires() {
    let (handle, task) = spawn(controller(), Arc::new(StaticSource), settings());
    let mut screen = handle.screen();

    handle.dispatch(Action::login(DEMO_EMAIL, DEMO_PASSWORD)).unwrap();
    screen
        .wait_for(|f| f.dashboard.is_some())
        .await
        .unwrap();

    let start = Instant::now();
    handle.dispatch(Action::RefreshRequested).unwrap();
    screen
        .wait_for(|f| f.nav.as_ref().is_some_and(|n| n.refreshing))
        .await
        .unwrap();

    screen
        .wait_for(|f| toast_messages(f).iter().any(|m| m == REFRESH_OK))
        .await
        .unwrap();
    assert!(start.elapsed() >= DEFAULT_REFRESH_DELAY);
    assert!(!handle.current().nav.unwrap().refreshing);

    screen
        .wait_for(|f| toast_messages(f).is_empty())
        .await
        .unwrap();
    assert!(start.elapsed() >= DEFAULT_REFRESH_DELAY + Duration::from_secs(3));

    handle.shutdown();
    let controller = task.await.unwrap();
    assert!(controller.state().last_refreshed().is_some());
}

#[tokio::test(start_paused = true)]
async fn screen_watcher_wakes_for_the_next_dispatch() {
    let (handle, task) = spawn(controller(), Arc::new(StaticSource), settings());
    let mut screen = handle.screen();

    handle.dispatch(Action::login(DEMO_EMAIL, DEMO_PASSWORD)).unwrap();
    screen
        .wait_for(|f| f.dashboard.is_some())
        .await
        .unwrap();

    screen.mark_unchanged();
    handle.dispatch(Action::Navigate(Section::Reports)).unwrap();
    screen.changed().await.unwrap();
    let frame = screen.borrow_and_update().clone();
    assert_eq!(frame.nav.map(|n| n.section), Some(Section::Reports));
    assert!(frame.reports.is_some());

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_shows_error_toast() {
    let (handle, task) = spawn(controller(), Arc::new(FailingSource), settings());
    let mut screen = handle.screen();

    handle.dispatch(Action::login(DEMO_EMAIL, DEMO_PASSWORD)).unwrap();
    handle.dispatch(Action::RefreshRequested).unwrap();
    screen
        .wait_for(|f| toast_messages(f).iter().any(|m| m == REFRESH_FAILED))
        .await
        .unwrap();

    handle.shutdown();
    let controller = task.await.unwrap();
    assert!(!controller.state().is_refreshing());
    assert_eq!(controller.dataset().unread_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn logout_cancels_pending_refresh() {
    let (handle, task) = spawn(controller(), Arc::new(StaticSource), settings());
    let mut screen = handle.screen();

    handle.dispatch(Action::login(DEMO_EMAIL, DEMO_PASSWORD)).unwrap();
    handle.dispatch(Action::RefreshRequested).unwrap();
    handle.dispatch(Action::Logout).unwrap();
    handle.dispatch(Action::login(DEMO_EMAIL, DEMO_PASSWORD)).unwrap();
    screen
        .wait_for(|f| f.dashboard.is_some())
        .await
        .unwrap();

    tokio::time::sleep(DEFAULT_REFRESH_DELAY * 2).await;
    assert!(toast_messages(&handle.current()).is_empty());

    handle.shutdown();
    let controller = task.await.unwrap();
    assert!(controller.state().last_refreshed().is_none());
    assert!(!controller.state().is_refreshing());
}

#[tokio::test(start_paused = true)]
async fn clock_ticks_only_while_logged_in() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ticks);
    let mut c = controller();
    c.subscribe(move |frame: &Frame| {
        if frame.clock.is_some() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let (handle, task) = spawn(c, Arc::new(StaticSource), settings());
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 0);

    handle.dispatch(Action::login(DEMO_EMAIL, DEMO_PASSWORD)).unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let while_logged_in = ticks.load(Ordering::SeqCst);
    assert!(while_logged_in >= 3, "got {while_logged_in} clock frames");

    handle.dispatch(Action::Logout).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let at_logout = ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), at_logout);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn auto_refresh_fires_on_schedule() {
    let settings = RuntimeSettings {
        auto_refresh: Some(Duration::from_secs(300)),
        ..RuntimeSettings::default()
    };
    let (handle, task) = spawn(controller(), Arc::new(StaticSource), settings);
    let mut screen = handle.screen();

    handle.dispatch(Action::login(DEMO_EMAIL, DEMO_PASSWORD)).unwrap();
    let start = Instant::now();
    screen
        .wait_for(|f| toast_messages(f).iter().any(|m| m == REFRESH_OK))
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_secs(300));

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn actions_apply_in_send_order() {
    let (handle, task) = spawn(controller(), Arc::new(StaticSource), settings());

    handle.dispatch(Action::login(DEMO_EMAIL, DEMO_PASSWORD)).unwrap();
    handle.dispatch(Action::Navigate(Section::Alerts)).unwrap();
    handle.dispatch(Action::ToggleRead(3)).unwrap();
    handle.dispatch(Action::ToggleRead(3)).unwrap();
    handle.dispatch(Action::Navigate(Section::Competitors)).unwrap();
    handle.shutdown();

    let controller = task.await.unwrap();
    assert_eq!(controller.state().section(), Section::Competitors);
    assert_eq!(controller.dataset().unread_count(), 2);
    assert!(handle.dispatch(Action::Logout).is_err());
}
