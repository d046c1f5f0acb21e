use async_trait::async_trait;

use crate::errors::CoreError;

/// Raw HTTP answer: status code and body text, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait abstraction for how stepper requests reach the server.
///
/// The browser build posts through `fetch`; native builds and tests use
/// reqwest or a scripted mock. The controller only ever sees this trait.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait StepperTransport: Send + Sync {
    /// Human-readable name of this transport (for logs).
    fn name(&self) -> &str;

    /// POST a multipart form to `path` and return the raw response.
    ///
    /// Non-2xx statuses are returned, not turned into errors; only failures
    /// to complete the exchange are `Err`.
    async fn post_form(
        &self,
        path: &str,
        fields: &[(&'static str, String)],
    ) -> Result<TransportResponse, CoreError>;
}
