//! One method per user action: read the form, check presence, issue the
//! request, render the answer into the action's output area.

use std::sync::Arc;

use common::api::{ApiClient, ApiResponse};
use common::CoreError;
use models::{user::login_user_id, JsInt};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::errors::ServiceError;
use crate::forms::{
    LoginForm, RegisterForm, SearchForm, ServiceForm, SubscriptionForm, UserForm,
    MSG_DELETE_SUBSCRIPTION_REQUIRED, MSG_GET_SUBSCRIPTION_REQUIRED,
};
use crate::session::{SessionContext, SessionStore};
use crate::view::{OutputArea, Rendered, View};

/// How an action ended, for callers that need an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Stopped locally; nothing was sent.
    Rejected,
    /// Network failure or a non-2xx answer.
    Failed,
    Succeeded,
}

impl Outcome {
    fn of(result: &Result<ApiResponse, CoreError>) -> Self {
        match result {
            Ok(resp) if resp.is_success() => Outcome::Succeeded,
            _ => Outcome::Failed,
        }
    }
}

/// Cheap to clone; clones share the session, so independent actions can run
/// as separate tasks.
#[derive(Clone)]
pub struct Controller {
    api: ApiClient,
    session: SessionContext,
    store: Arc<dyn SessionStore>,
    view: Arc<dyn View>,
}

impl Controller {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>, view: Arc<dyn View>) -> Self {
        Self { api, session: SessionContext::new(), store, view }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Restore a previously persisted user id without contacting the API.
    pub async fn startup(&self) {
        let Some(stored) = self.store.load().await.filter(|v| !v.is_empty()) else {
            return;
        };
        match JsInt::parse(&stored).as_i64() {
            Some(user_id) => {
                self.session.set_user_id(Some(user_id)).await;
                self.view.show_user_id(Some(user_id));
                debug!(user_id, "session restored");
            }
            None => warn!(value = %stored, "ignoring stored user id that is not a number"),
        }
    }

    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn register_user(&self, form: &RegisterForm) -> Outcome {
        let body = match form.to_request() {
            Ok(body) => body,
            Err(e) => return self.reject(OutputArea::Register, e),
        };
        let result = self.exchange(OutputArea::Register, Method::POST, "/users", &[], Some(&body)).await;
        Outcome::of(&result)
    }

    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn login(&self, form: &LoginForm) -> Outcome {
        let body = match form.to_request() {
            Ok(body) => body,
            Err(e) => return self.reject(OutputArea::Login, e),
        };
        let result = self.api.send_json(Method::POST, "/login", &body).await;
        match &result {
            Ok(resp) if resp.is_success() => {
                let user_id = login_user_id(&resp.body);
                self.remember(user_id).await;
                info!(?user_id, "login_succeeded");
            }
            Ok(resp) => {
                self.remember(None).await;
                info!(status = resp.status.as_u16(), "login_rejected");
            }
            Err(_) => {}
        }
        self.show(OutputArea::Login, &result);
        Outcome::of(&result)
    }

    /// Forget the logged-in user locally; no request is made.
    pub async fn logout(&self) -> Outcome {
        self.remember(None).await;
        self.view.render(OutputArea::Login, &Rendered::notice("Logged out"));
        info!("logout");
        Outcome::Succeeded
    }

    #[instrument(skip_all)]
    pub async fn search_users(&self, form: &SearchForm) -> Outcome {
        let query = form.query_pairs();
        let result = self
            .exchange::<Value>(OutputArea::SearchUsers, Method::GET, "/search/users", &query, None)
            .await;
        Outcome::of(&result)
    }

    #[instrument(skip_all)]
    pub async fn list_users(&self) -> Outcome {
        let result = self.exchange::<Value>(OutputArea::Users, Method::GET, "/users", &[], None).await;
        Outcome::of(&result)
    }

    #[instrument(skip_all, fields(user_id = %form.user_id))]
    pub async fn get_user(&self, form: &UserForm) -> Outcome {
        let user_id = match form.user_id() {
            Ok(id) => id,
            Err(e) => return self.reject(OutputArea::Users, e),
        };
        let path = format!("/users/{user_id}");
        let result = self.exchange::<Value>(OutputArea::Users, Method::GET, &path, &[], None).await;
        Outcome::of(&result)
    }

    #[instrument(skip_all, fields(user_id = %form.user_id))]
    pub async fn update_user(&self, form: &UserForm) -> Outcome {
        let (user_id, body) = match form.update() {
            Ok(parts) => parts,
            Err(e) => return self.reject(OutputArea::Users, e),
        };
        let path = format!("/users/{user_id}");
        let result = self.exchange(OutputArea::Users, Method::PUT, &path, &[], Some(&body)).await;
        Outcome::of(&result)
    }

    #[instrument(skip_all, fields(user_id = %form.user_id))]
    pub async fn delete_user(&self, form: &UserForm) -> Outcome {
        let user_id = match form.user_id() {
            Ok(id) => id,
            Err(e) => return self.reject(OutputArea::Users, e),
        };
        let path = format!("/users/{user_id}");
        let result = self.exchange::<Value>(OutputArea::Users, Method::DELETE, &path, &[], None).await;
        Outcome::of(&result)
    }

    #[instrument(skip_all)]
    pub async fn list_services(&self) -> Outcome {
        let result = self.exchange::<Value>(OutputArea::Services, Method::GET, "/services", &[], None).await;
        Outcome::of(&result)
    }

    #[instrument(skip_all, fields(service_id = %form.service_id))]
    pub async fn get_service(&self, form: &ServiceForm) -> Outcome {
        let service_id = match form.service_id() {
            Ok(id) => id,
            Err(e) => return self.reject(OutputArea::Services, e),
        };
        let path = format!("/services/{service_id}");
        let result = self.exchange::<Value>(OutputArea::Services, Method::GET, &path, &[], None).await;
        Outcome::of(&result)
    }

    #[instrument(skip_all, fields(user_id = %form.user_id))]
    pub async fn list_subscriptions(&self, form: &SubscriptionForm) -> Outcome {
        let user_id = match form.user_id() {
            Ok(id) => id,
            Err(e) => return self.reject(OutputArea::Subscriptions, e),
        };
        let path = format!("/users/{user_id}/subscriptions");
        let result = self
            .exchange::<Value>(OutputArea::Subscriptions, Method::GET, &path, &[], None)
            .await;
        Outcome::of(&result)
    }

    #[instrument(skip_all, fields(user_id = %form.user_id, service_id = %form.service_id))]
    pub async fn get_subscription(&self, form: &SubscriptionForm) -> Outcome {
        let (user_id, service_id) = match form.target(MSG_GET_SUBSCRIPTION_REQUIRED) {
            Ok(ids) => ids,
            Err(e) => return self.reject(OutputArea::Subscriptions, e),
        };
        let path = format!("/users/{user_id}/subscriptions/{service_id}");
        let result = self
            .exchange::<Value>(OutputArea::Subscriptions, Method::GET, &path, &[], None)
            .await;
        Outcome::of(&result)
    }

    #[instrument(skip_all, fields(user_id = %form.user_id, service_id = %form.service_id))]
    pub async fn add_subscription(&self, form: &SubscriptionForm) -> Outcome {
        let (user_id, body) = match form.new_subscription() {
            Ok(parts) => parts,
            Err(e) => return self.reject(OutputArea::Subscriptions, e),
        };
        let path = format!("/users/{user_id}/subscriptions");
        let result = self
            .exchange(OutputArea::Subscriptions, Method::POST, &path, &[], Some(&body))
            .await;
        self.refresh_after(form, Outcome::of(&result)).await
    }

    #[instrument(skip_all, fields(user_id = %form.user_id, service_id = %form.service_id))]
    pub async fn update_subscription(&self, form: &SubscriptionForm) -> Outcome {
        let (user_id, service_id, body) = match form.update() {
            Ok(parts) => parts,
            Err(e) => return self.reject(OutputArea::Subscriptions, e),
        };
        let path = format!("/users/{user_id}/subscriptions/{service_id}");
        let result = self
            .exchange(OutputArea::Subscriptions, Method::PUT, &path, &[], Some(&body))
            .await;
        self.refresh_after(form, Outcome::of(&result)).await
    }

    #[instrument(skip_all, fields(user_id = %form.user_id, service_id = %form.service_id))]
    pub async fn delete_subscription(&self, form: &SubscriptionForm) -> Outcome {
        let (user_id, service_id) = match form.target(MSG_DELETE_SUBSCRIPTION_REQUIRED) {
            Ok(ids) => ids,
            Err(e) => return self.reject(OutputArea::Subscriptions, e),
        };
        let path = format!("/users/{user_id}/subscriptions/{service_id}");
        let result = self
            .exchange::<Value>(OutputArea::Subscriptions, Method::DELETE, &path, &[], None)
            .await;
        self.refresh_after(form, Outcome::of(&result)).await
    }

    /// Re-read the user's subscriptions after a successful mutation. The
    /// mutation's outcome is what the caller gets back.
    async fn refresh_after(&self, form: &SubscriptionForm, outcome: Outcome) -> Outcome {
        if outcome == Outcome::Succeeded {
            debug!(user_id = %form.user_id, "refreshing subscriptions");
            self.list_subscriptions(form).await;
        }
        outcome
    }

    async fn exchange<B>(
        &self,
        area: OutputArea,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<ApiResponse, CoreError>
    where
        B: Serialize + ?Sized,
    {
        let result = self.api.execute(method, path, query, body).await;
        self.show(area, &result);
        result
    }

    fn show(&self, area: OutputArea, result: &Result<ApiResponse, CoreError>) {
        let rendered = match result {
            Ok(resp) => Rendered::json(&resp.body, !resp.is_success()),
            Err(e) => Rendered::network_error(e),
        };
        self.view.render(area, &rendered);
    }

    fn reject(&self, area: OutputArea, err: ServiceError) -> Outcome {
        let message = match err {
            ServiceError::Validation(message) => message,
            other => other.to_string(),
        };
        debug!(%area, %message, "rejected locally");
        self.view.render(area, &Rendered::local_error(&message));
        Outcome::Rejected
    }

    /// Set the session, keep the persisted copy in step, update the label.
    async fn remember(&self, user_id: Option<i64>) {
        self.session.set_user_id(user_id).await;
        let persisted = match user_id {
            Some(id) => self.store.save(id).await,
            None => self.store.clear().await,
        };
        if let Err(e) = persisted {
            warn!(error = %e, "could not persist session");
        }
        self.view.show_user_id(user_id);
    }
}
