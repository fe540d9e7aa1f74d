//! Outbound data-payload construction.
//!
//! Push-gateway data maps are string→string only, so the free-form JSONB
//! extra data is flattened with one rule: strings pass through unchanged,
//! everything else becomes its JSON text form.

use std::collections::BTreeMap;

use chrono::Utc;
use pushbridge_common::types::Notification;

/// Fixed client-interaction hint expected by the mobile apps.
pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Flatten a single JSON value to its string form.
pub fn flatten_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flatten an extra-data mapping to string values. Non-object values yield
/// an empty map.
pub fn flatten_extra_data(data: &serde_json::Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    if let serde_json::Value::Object(map) = data {
        for (key, value) in map {
            out.insert(key.clone(), flatten_value(value));
        }
    }
    out
}

/// Build the full outbound data map for a notification document.
///
/// Starts from the bookkeeping fields — document id, type, title/body,
/// target user, the client-interaction hint, and the current timestamp in
/// epoch millis — then overlays the flattened extra data, so a same-named
/// extra-data key wins over the base field. The resolved category tag is
/// inserted last and always wins.
pub fn build_data_payload(doc: &Notification, resolved_user_type: &str) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();

    data.insert("notification_id".to_string(), doc.id.to_string());
    data.insert("type".to_string(), doc.notification_type.clone());
    data.insert("title".to_string(), doc.title.clone());
    data.insert("body".to_string(), doc.message.clone());
    if let Some(user_id) = doc.user_id {
        data.insert("user_id".to_string(), user_id.to_string());
    }
    data.insert("click_action".to_string(), CLICK_ACTION.to_string());
    data.insert(
        "timestamp".to_string(),
        Utc::now().timestamp_millis().to_string(),
    );

    data.extend(flatten_extra_data(&doc.data));

    data.insert(
        "user_type".to_string(),
        doc.user_type
            .clone()
            .unwrap_or_else(|| resolved_user_type.to_string()),
    );

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_doc(data: serde_json::Value) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            title: "Order update".to_string(),
            message: "Your order has shipped".to_string(),
            notification_type: "order".to_string(),
            data,
            read: false,
            user_type: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_strings_pass_through() {
        let data = flatten_extra_data(&serde_json::json!({"order_id": "ord-42"}));
        assert_eq!(data["order_id"], "ord-42");
    }

    #[test]
    fn test_non_strings_become_json_text() {
        let data = flatten_extra_data(&serde_json::json!({
            "count": 3,
            "flag": true,
            "nested": {"a": 1}
        }));
        assert_eq!(data["count"], "3");
        assert_eq!(data["flag"], "true");
        assert_eq!(data["nested"], r#"{"a":1}"#);
    }

    #[test]
    fn test_non_object_data_is_empty() {
        assert!(flatten_extra_data(&serde_json::json!("oops")).is_empty());
        assert!(flatten_extra_data(&serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_payload_injects_bookkeeping_fields() {
        let doc = make_doc(serde_json::json!({"order_id": "ord-42"}));
        let data = build_data_payload(&doc, "customer");

        assert_eq!(data["notification_id"], doc.id.to_string());
        assert_eq!(data["type"], "order");
        assert_eq!(data["title"], "Order update");
        assert_eq!(data["body"], "Your order has shipped");
        assert_eq!(data["user_id"], doc.user_id.unwrap().to_string());
        assert_eq!(data["user_type"], "customer");
        assert_eq!(data["click_action"], CLICK_ACTION);
        assert_eq!(data["order_id"], "ord-42");
        assert!(data["timestamp"].parse::<i64>().is_ok());
    }

    #[test]
    fn test_document_user_type_wins_over_resolved() {
        let mut doc = make_doc(serde_json::json!({}));
        doc.user_type = Some("driver".to_string());
        let data = build_data_payload(&doc, "customer");
        assert_eq!(data["user_type"], "driver");
    }

    #[test]
    fn test_extra_data_overrides_base_fields() {
        let doc = make_doc(serde_json::json!({
            "type": "reminder",
            "title": "Override title"
        }));
        let data = build_data_payload(&doc, "customer");
        assert_eq!(data["type"], "reminder");
        assert_eq!(data["title"], "Override title");
        // Untouched base fields survive the overlay
        assert_eq!(data["body"], "Your order has shipped");
    }

    #[test]
    fn test_category_tag_wins_over_extra_data() {
        let doc = make_doc(serde_json::json!({"user_type": "spoofed"}));
        let data = build_data_payload(&doc, "customer");
        assert_eq!(data["user_type"], "customer");
    }
}
