use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::notice::DismissTiming;
use crate::constants::{DEFAULT_BUY_ENDPOINT, DEFAULT_SELL_ENDPOINT, DEFAULT_STOCK_NAMES};
use crate::errors::CoreError;

/// Names and ids the page template exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    /// Row-level data attribute (without `data-`) holding the serialized transaction.
    pub row_data_attribute: String,
    /// Id of the cash cell.
    pub cash_cell_id: String,
    /// Id of the grand-total cell.
    pub total_cell_id: String,
    /// Data attribute (without `data-`) on the grand-total cell.
    pub grand_total_data_attribute: String,
    /// Selector for stepper controls inside a row.
    pub button_selector: String,
    /// Selector for alert banners dismissed on load.
    pub alert_selector: String,
    /// Id of the element notices are appended to; falls back to `<body>`.
    pub notice_container_id: String,
    /// Selector for typeahead inputs.
    pub typeahead_selector: String,
    /// Class marking forms whose submission is gated.
    pub validated_form_class: String,
    /// Class added to a form after a submit attempt.
    pub was_validated_class: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            row_data_attribute: "transaction".to_string(),
            cash_cell_id: "td-cash".to_string(),
            total_cell_id: "th-total".to_string(),
            grand_total_data_attribute: "grand_total".to_string(),
            button_selector: ".btn".to_string(),
            alert_selector: ".alert".to_string(),
            notice_container_id: "notices".to_string(),
            typeahead_selector: ".typeahead".to_string(),
            validated_form_class: "validation-required".to_string(),
            was_validated_class: "was-validated".to_string(),
        }
    }
}

/// Typeahead behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeaheadOptions {
    /// Offer the top suggestion as an inline completion of the query
    pub hint: bool,
    /// Mark the matched part of each suggestion
    pub highlight: bool,
    /// Minimum query length (characters) before suggesting anything
    pub min_length: usize,
    /// Maximum number of suggestions; `None` shows all
    pub limit: Option<usize>,
}

impl Default for TypeaheadOptions {
    fn default() -> Self {
        Self {
            hint: true,
            highlight: true,
            min_length: 1,
            limit: None,
        }
    }
}

/// Page-wide configuration. Every field has a default, so an empty JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path posted to for a "+" click.
    pub buy_endpoint: String,

    /// Path posted to for a "-" click.
    pub sell_endpoint: String,

    /// Origin to prefix endpoint paths with. `None` posts to the page's own origin.
    pub base_url: Option<String>,

    /// Per-request timeout for the native transport. `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,

    /// `log` level filter name (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,

    pub selectors: PageSelectors,

    /// Timing shared by server-rendered alerts and posted notices.
    pub alerts: DismissTiming,

    pub typeahead: TypeaheadOptions,

    /// Names offered by the typeahead.
    pub stock_names: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            buy_endpoint: DEFAULT_BUY_ENDPOINT.to_string(),
            sell_endpoint: DEFAULT_SELL_ENDPOINT.to_string(),
            base_url: None,
            request_timeout_secs: None,
            log_level: "info".to_string(),
            selectors: PageSelectors::default(),
            alerts: DismissTiming::default(),
            typeahead: TypeaheadOptions::default(),
            stock_names: DEFAULT_STOCK_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, path) in [
            ("buy_endpoint", &self.buy_endpoint),
            ("sell_endpoint", &self.sell_endpoint),
        ] {
            if !path.starts_with('/') {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be an absolute path, got {path:?}"
                )));
            }
        }
        if self.buy_endpoint == self.sell_endpoint {
            return Err(CoreError::InvalidConfig(
                "buy_endpoint and sell_endpoint must differ".into(),
            ));
        }
        if self.alerts.slide_ms == 0 {
            return Err(CoreError::InvalidConfig("alerts.slide_ms must be positive".into()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(CoreError::InvalidConfig(
                "request_timeout_secs must be positive when set".into(),
            ));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, CoreError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| CoreError::InvalidConfig(format!("unknown log level {:?}", self.log_level)))
    }

    /// Full URL for an endpoint path.
    pub fn url_for(&self, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => path.to_string(),
        }
    }
}
