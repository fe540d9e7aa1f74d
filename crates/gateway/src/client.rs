//! FCM HTTP v1 client.
//!
//! The v1 API has no server-side multicast endpoint, so `send_multicast`
//! performs one `messages:send` request per token and aggregates the
//! outcomes in input order. A per-token transport or API failure becomes a
//! failed outcome in the report, never an overall error — only an OAuth
//! failure (which would fail every send identically) aborts the multicast.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::PushGateway;
use crate::error::GatewayError;
use crate::message::{
    FcmApiError, FcmApiResponse, FcmMessage, FcmRequest, MulticastReport, PushNotification,
    SendOutcome,
};
use crate::oauth::{ServiceAccountKey, TokenProvider};

pub struct FcmClient {
    project_id: String,
    oauth: TokenProvider,
    http: reqwest::Client,
}

impl FcmClient {
    pub fn new(key: ServiceAccountKey) -> Self {
        let key = Arc::new(key);
        let http = reqwest::Client::new();
        Self {
            project_id: key.project_id.clone(),
            oauth: TokenProvider::new(Arc::clone(&key), http.clone()),
            http,
        }
    }

    /// Build a client from a service-account key file on disk.
    pub fn from_key_file(path: &str) -> Result<Self, GatewayError> {
        Ok(Self::new(ServiceAccountKey::from_file(path)?))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn send_url(&self) -> String {
        format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.project_id
        )
    }

    /// Deliver one message to a single token.
    async fn send_one(
        &self,
        bearer: &str,
        token: &str,
        notification: &PushNotification,
        data: &BTreeMap<String, String>,
    ) -> SendOutcome {
        let request = FcmRequest {
            message: FcmMessage::new(token, notification, data),
        };

        let response = match self
            .http
            .post(self.send_url())
            .bearer_auth(bearer)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "FCM request failed in transit");
                return SendOutcome::failed("TRANSPORT_ERROR");
            }
        };

        let status = response.status();
        if status.is_success() {
            let message_id = response
                .json::<FcmApiResponse>()
                .await
                .ok()
                .and_then(|r| r.name);
            return SendOutcome::ok(message_id);
        }

        // Pull the canonical status string (e.g. UNREGISTERED) out of the
        // error body when present; fall back to the HTTP status code.
        let error_code = response
            .json::<FcmApiError>()
            .await
            .ok()
            .and_then(|e| e.error.status)
            .unwrap_or_else(|| status.as_u16().to_string());

        SendOutcome::failed(error_code)
    }
}

impl PushGateway for FcmClient {
    async fn send_multicast(
        &self,
        tokens: &[String],
        notification: &PushNotification,
        data: &BTreeMap<String, String>,
    ) -> Result<MulticastReport, GatewayError> {
        let bearer = self.oauth.bearer_token().await?;

        let mut outcomes = Vec::with_capacity(tokens.len());
        for token in tokens {
            let outcome = self.send_one(&bearer, token, notification, data).await;
            if let Some(code) = outcome.error_code.as_deref() {
                let prefix: String = token.chars().take(15).collect();
                tracing::debug!(
                    token_prefix = %prefix,
                    error_code = code,
                    "Push delivery failed for token"
                );
            }
            outcomes.push(outcome);
        }

        let report = MulticastReport::from_outcomes(outcomes);
        tracing::info!(
            success = report.success_count,
            failure = report.failure_count,
            "Multicast send completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> ServiceAccountKey {
        ServiceAccountKey {
            project_id: "test-project".to_string(),
            private_key_id: "key-id".to_string(),
            private_key: "not-a-real-key".to_string(),
            client_email: "svc@test-project.iam.gserviceaccount.com".to_string(),
            client_id: "123456".to_string(),
            auth_uri: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }

    #[test]
    fn test_client_takes_project_from_key() {
        let client = FcmClient::new(test_key());
        assert_eq!(client.project_id(), "test-project");
    }

    #[test]
    fn test_send_url() {
        let client = FcmClient::new(test_key());
        assert_eq!(
            client.send_url(),
            "https://fcm.googleapis.com/v1/projects/test-project/messages:send"
        );
    }
}
