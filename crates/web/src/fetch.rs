use async_trait::async_trait;
use gloo_net::http::Request;
use log::debug;
use web_sys::FormData;

use trade_desk_core::errors::CoreError;
use trade_desk_core::models::settings::Settings;
use trade_desk_core::transport::traits::{StepperTransport, TransportResponse};

use crate::js_text;

/// `fetch`-backed transport posting `FormData`, like a native form submit.
///
/// Paths stay relative to the page unless `base_url` is configured, so
/// the session cookie goes along with the request.
pub struct FetchTransport {
    settings: Settings,
}

impl FetchTransport {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }
}

#[async_trait(?Send)]
impl StepperTransport for FetchTransport {
    fn name(&self) -> &str {
        "fetch"
    }

    async fn post_form(
        &self,
        path: &str,
        fields: &[(&'static str, String)],
    ) -> Result<TransportResponse, CoreError> {
        let form = FormData::new().map_err(|e| CoreError::Network(js_text(&e)))?;
        for (name, value) in fields {
            form.append_with_str(name, value)
                .map_err(|e| CoreError::Network(js_text(&e)))?;
        }

        let url = self.settings.url_for(path);
        debug!("POST {url} ({} fields)", fields.len());

        let resp = Request::post(&url)
            .body(form)
            .map_err(|e| CoreError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;
        Ok(TransportResponse { status, body })
    }
}
