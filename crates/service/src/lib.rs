//! Client-side service layer for the subscriptions API.
//! - `forms`: current input values and presence checks.
//! - `controller`: one operation per user action, rendering into a `View`.
//! - `session`: logged-in user context and its persisted copy.

pub mod errors;
pub mod forms;
pub mod view;
pub mod session;
pub mod storage;
pub mod controller;
#[cfg(test)]
pub mod test_support;
#[cfg(test)]
mod tests;

pub use controller::{Controller, Outcome};
