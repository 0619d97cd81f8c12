//! Current form values, one struct per page section.
//!
//! Every field is a plain string; empty means "not provided". Only presence
//! is checked here, never format.

use models::subscription::{NewSubscription, SubscriptionUpdate};
use models::user::{LoginRequest, RegisterRequest, UserUpdate};
use models::JsInt;

use crate::errors::ServiceError;

pub const MSG_REGISTER_REQUIRED: &str = "Email, password, first name and last name are required";
pub const MSG_LOGIN_REQUIRED: &str = "Email and password are required";
pub const MSG_USER_ID_REQUIRED: &str = "Please enter a user ID";
pub const MSG_SERVICE_ID_REQUIRED: &str = "Please enter a service ID";
pub const MSG_ADD_SUBSCRIPTION_REQUIRED: &str = "User ID, Service ID and Start Date are required";
pub const MSG_UPDATE_SUBSCRIPTION_REQUIRED: &str = "User ID and Service ID are required for update";
pub const MSG_DELETE_SUBSCRIPTION_REQUIRED: &str = "User ID and Service ID are required for deletion";
pub const MSG_GET_SUBSCRIPTION_REQUIRED: &str = "User ID and Service ID are required";
pub const MSG_NO_SUBSCRIPTION_UPDATE: &str = "No update data provided (end_date or active)";
pub const MSG_NO_USER_UPDATE: &str = "No update data provided (email, first_name, last_name or password)";

fn present(value: &str) -> bool {
    !value.is_empty()
}

fn optional(value: &str) -> Option<String> {
    present(value).then(|| value.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterForm {
    pub fn to_request(&self) -> Result<RegisterRequest, ServiceError> {
        let all = [&self.email, &self.password, &self.first_name, &self.last_name];
        if !all.iter().all(|v| present(v)) {
            return Err(ServiceError::validation(MSG_REGISTER_REQUIRED));
        }
        Ok(RegisterRequest {
            email: self.email.clone(),
            password: self.password.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn to_request(&self) -> Result<LoginRequest, ServiceError> {
        if !present(&self.email) || !present(&self.password) {
            return Err(ServiceError::validation(MSG_LOGIN_REQUIRED));
        }
        Ok(LoginRequest { email: self.email.clone(), password: self.password.clone() })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl SearchForm {
    /// Query pairs for the non-empty fields, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("email", self.email.as_str()),
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| present(v))
        .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl UserForm {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), ..Default::default() }
    }

    pub fn user_id(&self) -> Result<&str, ServiceError> {
        if !present(&self.user_id) {
            return Err(ServiceError::validation(MSG_USER_ID_REQUIRED));
        }
        Ok(&self.user_id)
    }

    pub fn update(&self) -> Result<(&str, UserUpdate), ServiceError> {
        let user_id = self.user_id()?;
        let update = UserUpdate {
            email: optional(&self.email),
            first_name: optional(&self.first_name),
            last_name: optional(&self.last_name),
            password: optional(&self.password),
        };
        if update.is_empty() {
            return Err(ServiceError::validation(MSG_NO_USER_UPDATE));
        }
        Ok((user_id, update))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceForm {
    pub service_id: String,
}

impl ServiceForm {
    pub fn service_id(&self) -> Result<&str, ServiceError> {
        if !present(&self.service_id) {
            return Err(ServiceError::validation(MSG_SERVICE_ID_REQUIRED));
        }
        Ok(&self.service_id)
    }
}

/// The subscriptions section; every subscription action reads from it.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionForm {
    pub user_id: String,
    pub service_id: String,
    pub start_date: String,
    pub end_date: String,
    pub active: String,
}

impl SubscriptionForm {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), ..Default::default() }
    }

    pub fn user_id(&self) -> Result<&str, ServiceError> {
        if !present(&self.user_id) {
            return Err(ServiceError::validation(MSG_USER_ID_REQUIRED));
        }
        Ok(&self.user_id)
    }

    /// `(user_id, service_id)` when both are present, otherwise `message`.
    pub fn target(&self, message: &str) -> Result<(&str, &str), ServiceError> {
        if !present(&self.user_id) || !present(&self.service_id) {
            return Err(ServiceError::validation(message));
        }
        Ok((&self.user_id, &self.service_id))
    }

    pub fn new_subscription(&self) -> Result<(&str, NewSubscription), ServiceError> {
        if !present(&self.user_id) || !present(&self.service_id) || !present(&self.start_date) {
            return Err(ServiceError::validation(MSG_ADD_SUBSCRIPTION_REQUIRED));
        }
        let body = NewSubscription {
            service_id: JsInt::parse(&self.service_id),
            start_date: self.start_date.clone(),
            active: JsInt::parse(&self.active),
            end_date: optional(&self.end_date),
        };
        Ok((&self.user_id, body))
    }

    /// Any non-empty `active`, `"0"` included, counts as provided.
    pub fn update(&self) -> Result<(&str, &str, SubscriptionUpdate), ServiceError> {
        let (user_id, service_id) = self.target(MSG_UPDATE_SUBSCRIPTION_REQUIRED)?;
        let update = SubscriptionUpdate {
            end_date: optional(&self.end_date),
            active: present(&self.active).then(|| JsInt::parse(&self.active)),
        };
        if update.is_empty() {
            return Err(ServiceError::validation(MSG_NO_SUBSCRIPTION_UPDATE));
        }
        Ok((user_id, service_id, update))
    }
}
