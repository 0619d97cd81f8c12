use std::sync::Arc;

use anyhow::Result;
use common::api::ApiClient;
use serde_json::json;
use uuid::Uuid;

use crate::controller::{Controller, Outcome};
use crate::forms::LoginForm;
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::test_support::{harness, harness_with_store, unreachable_base_url, MockApi, RecordingView};
use crate::view::{Color, OutputArea};

fn login_form() -> LoginForm {
    LoginForm { email: "a@b.com".into(), password: "pw".into() }
}

#[tokio::test]
async fn successful_login_sets_and_persists_session() -> Result<()> {
    let api = MockApi::start().await?;
    api.reply("POST", "/login", 200, json!({ "message": "Login successful", "user_id": 42, "email": "a@b.com" }));
    let h = harness(api.client());

    assert_eq!(h.controller.login(&login_form()).await, Outcome::Succeeded);
    assert_eq!(h.controller.session().user_id().await, Some(42));
    assert_eq!(h.view.labels(), vec![Some(42)]);
    assert_eq!(h.store.load().await.as_deref(), Some("42"));

    let calls = api.calls();
    assert_eq!(calls[0].body, Some(json!({ "email": "a@b.com", "password": "pw" })));
    assert_eq!(h.view.last(OutputArea::Login).unwrap().color, Color::Black);
    Ok(())
}

#[tokio::test]
async fn failed_login_clears_session_and_shows_none() -> Result<()> {
    let api = MockApi::start().await?;
    api.reply("POST", "/login", 401, json!({ "message": "Invalid credentials" }));
    let store = Arc::new(MemorySessionStore::with_value("7"));
    let h = harness_with_store(api.client(), store);

    h.controller.startup().await;
    assert_eq!(h.controller.session().user_id().await, Some(7));

    assert_eq!(h.controller.login(&login_form()).await, Outcome::Failed);
    assert_eq!(h.controller.session().user_id().await, None);
    assert_eq!(h.view.labels(), vec![Some(7), None]);
    assert_eq!(h.store.load().await, None);

    let shown = h.view.last(OutputArea::Login).unwrap();
    assert!(shown.is_error());
    assert_eq!(shown.value().unwrap()["message"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn unreachable_api_on_login_keeps_session() -> Result<()> {
    let api = ApiClient::new(unreachable_base_url().await)?;
    let h = harness_with_store(api, Arc::new(MemorySessionStore::with_value("5")));
    h.controller.startup().await;

    assert_eq!(h.controller.login(&login_form()).await, Outcome::Failed);
    assert_eq!(h.controller.session().user_id().await, Some(5));
    assert_eq!(h.store.load().await.as_deref(), Some("5"));
    // only the startup label; the failed exchange does not touch it
    assert_eq!(h.view.labels(), vec![Some(5)]);
    assert!(h.view.last(OutputArea::Login).unwrap().is_error());
    Ok(())
}

#[tokio::test]
async fn login_answer_without_user_id_clears_session() -> Result<()> {
    let api = MockApi::start().await?;
    api.reply("POST", "/login", 200, json!({ "message": "ok" }));
    let h = harness_with_store(api.client(), Arc::new(MemorySessionStore::with_value("5")));
    h.controller.startup().await;

    assert_eq!(h.controller.login(&login_form()).await, Outcome::Succeeded);
    assert_eq!(h.controller.session().user_id().await, None);
    assert_eq!(h.store.load().await, None);
    assert_eq!(h.view.labels(), vec![Some(5), None]);
    assert!(!h.view.last(OutputArea::Login).unwrap().is_error());
    Ok(())
}

#[tokio::test]
async fn rejected_login_form_keeps_session() -> Result<()> {
    let api = MockApi::start().await?;
    let h = harness_with_store(api.client(), Arc::new(MemorySessionStore::with_value("3")));
    h.controller.startup().await;

    let form = LoginForm { email: String::new(), password: "pw".into() };
    assert_eq!(h.controller.login(&form).await, Outcome::Rejected);
    assert_eq!(h.controller.session().user_id().await, Some(3));
    assert!(api.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn logout_is_local() -> Result<()> {
    let api = MockApi::start().await?;
    let h = harness_with_store(api.client(), Arc::new(MemorySessionStore::with_value("3")));
    h.controller.startup().await;

    assert_eq!(h.controller.logout().await, Outcome::Succeeded);
    assert_eq!(h.controller.session().user_id().await, None);
    assert_eq!(h.store.load().await, None);
    assert_eq!(h.view.labels(), vec![Some(3), None]);
    assert!(!h.view.last(OutputArea::Login).unwrap().is_error());
    assert!(api.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn startup_without_stored_id_does_nothing() -> Result<()> {
    let api = MockApi::start().await?;
    let h = harness(api.client());
    h.controller.startup().await;
    assert_eq!(h.controller.session().user_id().await, None);
    assert!(h.view.labels().is_empty());
    Ok(())
}

#[tokio::test]
async fn startup_ignores_garbage() -> Result<()> {
    let api = MockApi::start().await?;
    let h = harness_with_store(api.client(), Arc::new(MemorySessionStore::with_value("nobody")));
    h.controller.startup().await;
    assert_eq!(h.controller.session().user_id().await, None);
    assert!(h.view.labels().is_empty());
    Ok(())
}

#[tokio::test]
async fn file_store_survives_a_restart() -> Result<()> {
    let api = MockApi::start().await?;
    api.reply("POST", "/login", 200, json!({ "message": "Login successful", "user_id": 8 }));
    let path = std::env::temp_dir().join(format!("subs_session_{}.json", Uuid::new_v4()));

    let first = {
        let store = FileSessionStore::open(&path, "loggedInUserId").await?;
        let view = Arc::new(RecordingView::default());
        Controller::new(api.client(), store, view)
    };
    assert_eq!(first.login(&login_form()).await, Outcome::Succeeded);

    let view = Arc::new(RecordingView::default());
    let second = Controller::new(
        api.client(),
        FileSessionStore::open(&path, "loggedInUserId").await?,
        view.clone(),
    );
    second.startup().await;
    assert_eq!(second.session().user_id().await, Some(8));
    assert_eq!(view.labels(), vec![Some(8)]);
    // restoring does not talk to the API
    assert_eq!(api.calls().len(), 1);

    let _ = tokio::fs::remove_file(&path).await;
    Ok(())
}
