//! Wire types for the FCM HTTP v1 API and delivery result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Human-readable notification shown by the platform's notification tray.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

/// Top-level request body for `projects/{id}/messages:send`.
#[derive(Debug, Serialize)]
pub struct FcmRequest<'a> {
    pub message: FcmMessage<'a>,
}

/// One message addressed to a single device token.
#[derive(Debug, Serialize)]
pub struct FcmMessage<'a> {
    pub token: &'a str,
    pub notification: &'a PushNotification,
    pub data: &'a BTreeMap<String, String>,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

impl<'a> FcmMessage<'a> {
    /// Build a message with the standard delivery hints attached:
    /// high-priority on Android, silent content-available + badge + sound
    /// on iOS.
    pub fn new(
        token: &'a str,
        notification: &'a PushNotification,
        data: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            token,
            notification,
            data,
            android: AndroidConfig::default(),
            apns: ApnsConfig::default(),
        }
    }
}

/// Android-specific delivery options.
#[derive(Debug, Serialize)]
pub struct AndroidConfig {
    pub priority: &'static str,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self { priority: "HIGH" }
    }
}

/// APNs-specific delivery options.
#[derive(Debug, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Serialize)]
pub struct Aps {
    #[serde(rename = "content-available")]
    pub content_available: u8,
    pub badge: u32,
    pub sound: &'static str,
}

impl Default for ApnsConfig {
    fn default() -> Self {
        Self {
            payload: ApnsPayload {
                aps: Aps {
                    content_available: 1,
                    badge: 1,
                    sound: "default",
                },
            },
        }
    }
}

/// Success response body: `name` is the server-assigned message id.
#[derive(Debug, Deserialize)]
pub struct FcmApiResponse {
    pub name: Option<String>,
}

/// Error response body.
#[derive(Debug, Deserialize)]
pub struct FcmApiError {
    pub error: FcmErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct FcmErrorBody {
    pub code: Option<i64>,
    pub message: Option<String>,
    /// Canonical status string, e.g. `NOT_FOUND` or `UNREGISTERED`.
    pub status: Option<String>,
}

/// Result of delivering to a single token.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    pub message_id: Option<String>,
    pub error_code: Option<String>,
}

impl SendOutcome {
    pub fn ok(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error_code: None,
        }
    }

    pub fn failed(error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error_code: Some(error_code.into()),
        }
    }
}

/// Aggregated multicast result. `outcomes` is ordered exactly like the input
/// token slice, so index `k` is the result for token `k`.
#[derive(Debug, Clone, Serialize)]
pub struct MulticastReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub outcomes: Vec<SendOutcome>,
}

impl MulticastReport {
    pub fn from_outcomes(outcomes: Vec<SendOutcome>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.success).count();
        let failure_count = outcomes.len() - success_count;
        Self {
            success_count,
            failure_count,
            outcomes,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        data.insert("notification_id".to_string(), "abc-123".to_string());
        data
    }

    #[test]
    fn test_message_carries_platform_hints() {
        let notification = PushNotification {
            title: "Order shipped".to_string(),
            body: "Your order is on its way".to_string(),
        };
        let data = sample_data();
        let msg = FcmMessage::new("token-1", &notification, &data);
        let json = serde_json::to_value(FcmRequest { message: msg }).unwrap();

        assert_eq!(json["message"]["token"], "token-1");
        assert_eq!(json["message"]["android"]["priority"], "HIGH");
        assert_eq!(
            json["message"]["apns"]["payload"]["aps"]["content-available"],
            1
        );
        assert_eq!(json["message"]["apns"]["payload"]["aps"]["badge"], 1);
        assert_eq!(json["message"]["apns"]["payload"]["aps"]["sound"], "default");
        assert_eq!(json["message"]["data"]["notification_id"], "abc-123");
        assert_eq!(json["message"]["notification"]["title"], "Order shipped");
    }

    #[test]
    fn test_report_counts() {
        let report = MulticastReport::from_outcomes(vec![
            SendOutcome::ok(Some("m1".to_string())),
            SendOutcome::failed("UNREGISTERED"),
            SendOutcome::ok(None),
        ]);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert!(report.has_failures());
        assert!(!report.outcomes[1].success);
        assert_eq!(report.outcomes[1].error_code.as_deref(), Some("UNREGISTERED"));
    }

    #[test]
    fn test_report_no_failures() {
        let report = MulticastReport::from_outcomes(vec![SendOutcome::ok(None)]);
        assert!(!report.has_failures());
    }
}
