use serde::Serialize;

use crate::JsInt;

/// Body of `POST /users/{id}/subscriptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubscription {
    pub service_id: JsInt,
    pub start_date: String,
    pub active: JsInt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Body of `PUT /users/{id}/subscriptions/{service_id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubscriptionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<JsInt>,
}

impl SubscriptionUpdate {
    pub fn is_empty(&self) -> bool {
        self.end_date.is_none() && self.active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_subscription_omits_missing_end_date() {
        let sub = NewSubscription {
            service_id: JsInt::Int(2),
            start_date: "2024-01-01".into(),
            active: JsInt::Int(1),
            end_date: None,
        };
        assert_eq!(
            serde_json::to_value(&sub).unwrap(),
            json!({ "service_id": 2, "start_date": "2024-01-01", "active": 1 })
        );
    }

    #[test]
    fn non_numeric_service_id_still_sent() {
        let sub = NewSubscription {
            service_id: JsInt::parse("netflix"),
            start_date: "2024-01-01".into(),
            active: JsInt::parse("1"),
            end_date: Some("2024-12-31".into()),
        };
        let v = serde_json::to_value(&sub).unwrap();
        assert!(v.as_object().unwrap().contains_key("service_id"));
        assert!(v["service_id"].is_null());
        assert_eq!(v["end_date"], "2024-12-31");
    }

    #[test]
    fn update_with_inactive_flag_is_not_empty() {
        let upd = SubscriptionUpdate { end_date: None, active: Some(JsInt::Int(0)) };
        assert!(!upd.is_empty());
        assert_eq!(serde_json::to_value(&upd).unwrap(), json!({ "active": 0 }));
        assert!(SubscriptionUpdate::default().is_empty());
    }
}
