//! Output areas and how results are rendered into them.

use std::fmt;

use common::CoreError;
use serde_json::{json, Value};

/// Fixed message for any failure below the HTTP status level.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error or API unavailable";

/// One display slot per page section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputArea {
    Register,
    Login,
    SearchUsers,
    Users,
    Services,
    Subscriptions,
}

impl OutputArea {
    pub fn name(self) -> &'static str {
        match self {
            OutputArea::Register => "register",
            OutputArea::Login => "login",
            OutputArea::SearchUsers => "search",
            OutputArea::Users => "users",
            OutputArea::Services => "services",
            OutputArea::Subscriptions => "subscriptions",
        }
    }
}

impl fmt::Display for OutputArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
}

/// Text ready to drop into an output area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub color: Color,
}

impl Rendered {
    /// Pretty-printed JSON with two-space indentation.
    pub fn json(value: &Value, is_error: bool) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        let color = if is_error { Color::Red } else { Color::Black };
        Self { text, color }
    }

    pub fn local_error(message: &str) -> Self {
        Self::json(&json!({ "message": message }), true)
    }

    pub fn notice(message: &str) -> Self {
        Self::json(&json!({ "message": message }), false)
    }

    pub fn network_error(err: &CoreError) -> Self {
        Self::json(
            &json!({ "message": NETWORK_ERROR_MESSAGE, "error": err.to_string() }),
            true,
        )
    }

    pub fn is_error(&self) -> bool {
        self.color == Color::Red
    }

    /// Parse the text back; handy for assertions.
    pub fn value(&self) -> Option<Value> {
        serde_json::from_str(&self.text).ok()
    }
}

/// Text shown in the logged-in user slot.
pub fn user_id_label(user_id: Option<i64>) -> String {
    match user_id {
        Some(id) => id.to_string(),
        None => "None".to_string(),
    }
}

/// Presentation sink for the controller. Renders into the same area
/// replace each other; the last one to land is what is shown.
pub trait View: Send + Sync {
    fn render(&self, area: OutputArea, output: &Rendered);
    fn show_user_id(&self, user_id: Option<i64>);
}
