use async_trait::async_trait;
use log::debug;
use reqwest::multipart::Form;
use reqwest::Client;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::{StepperTransport, TransportResponse};
use crate::errors::CoreError;
use crate::models::settings::Settings;

/// reqwest-backed transport posting multipart forms.
///
/// - **Origin**: `base_url` from settings; paths are appended verbatim.
/// - **Timeout**: honored on native targets only; `None` waits indefinitely.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout_secs: Option<u64>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match timeout_secs {
            Some(secs) => builder.timeout(Duration::from_secs(secs)),
            None => builder,
        };
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build from settings; requires `base_url` since reqwest needs an absolute URL.
    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        let base = settings.base_url.as_deref().ok_or_else(|| {
            CoreError::InvalidConfig("base_url is required for the HTTP transport".into())
        })?;
        Ok(Self::new(base, settings.request_timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Assemble the multipart body, preserving field order.
    pub fn build_form(fields: &[(&'static str, String)]) -> Form {
        fields
            .iter()
            .fold(Form::new(), |form, (name, value)| form.text(*name, value.clone()))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl StepperTransport for HttpTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn post_form(
        &self,
        path: &str,
        fields: &[(&'static str, String)],
    ) -> Result<TransportResponse, CoreError> {
        let url = self.url_for(path);
        debug!("POST {url} ({} fields)", fields.len());

        let resp = self
            .client
            .post(&url)
            .multipart(Self::build_form(fields))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(TransportResponse { status, body })
    }
}
