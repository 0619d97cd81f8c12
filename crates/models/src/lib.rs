//! Wire types for the subscriptions API.
//!
//! Records coming back from the server stay opaque `serde_json::Value`s;
//! only request bodies and the login answer's `user_id` are typed here.

pub mod js_int;
pub mod subscription;
pub mod user;

pub use js_int::JsInt;
