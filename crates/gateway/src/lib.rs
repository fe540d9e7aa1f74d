//! Push-gateway client for FCM (HTTP v1 API).
//!
//! Exposes the [`PushGateway`] trait — the seam between the dispatch engine
//! and the concrete gateway — plus [`FcmClient`], the production
//! implementation that handles Google service-account OAuth2 and per-token
//! multicast delivery.

pub mod client;
pub mod error;
pub mod message;
pub mod oauth;

use std::collections::BTreeMap;

pub use client::FcmClient;
pub use error::GatewayError;
pub use message::{MulticastReport, PushNotification, SendOutcome};
pub use oauth::ServiceAccountKey;

/// A one-shot multicast push sender.
///
/// `send_multicast` addresses one logical message to many device tokens and
/// returns per-token outcomes in the same order as the input slice. No retry
/// is performed; the caller alone decides what to do with failed tokens.
pub trait PushGateway {
    fn send_multicast(
        &self,
        tokens: &[String],
        notification: &PushNotification,
        data: &BTreeMap<String, String>,
    ) -> impl std::future::Future<Output = Result<MulticastReport, GatewayError>> + Send;
}

impl<G: PushGateway + Sync> PushGateway for &G {
    fn send_multicast(
        &self,
        tokens: &[String],
        notification: &PushNotification,
        data: &BTreeMap<String, String>,
    ) -> impl std::future::Future<Output = Result<MulticastReport, GatewayError>> + Send {
        (**self).send_multicast(tokens, notification, data)
    }
}
