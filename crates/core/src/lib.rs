pub mod constants;
pub mod errors;
pub mod models;
pub mod page;
pub mod services;
pub mod transport;

use models::notice::{Notice, NoticeLevel};
use models::settings::Settings;
use page::traits::PortfolioPage;
use services::{
    alert_service::AlertBoard, stepper_service::StepperController,
    typeahead_service::SubstringMatcher, validation_service::FormValidator,
};
use transport::{http::HttpTransport, traits::StepperTransport};

use errors::CoreError;

/// Main entry point for the trade-desk core library.
/// Holds the page configuration and hands out services built from it.
#[must_use]
pub struct TradeDesk {
    settings: Settings,
}

impl std::fmt::Debug for TradeDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeDesk")
            .field("buy_endpoint", &self.settings.buy_endpoint)
            .field("sell_endpoint", &self.settings.sell_endpoint)
            .field("stock_names", &self.settings.stock_names.len())
            .finish()
    }
}

impl TradeDesk {
    /// Default configuration (`/buy_1`, `/sell_1`, stock template ids).
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
        }
    }

    /// Use the given settings after validating them.
    pub fn with_settings(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Parse settings from JSON; absent keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(Self {
            settings: Settings::from_json(json)?,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Services ────────────────────────────────────────────────────

    /// Stepper controller bound to the given transport and page.
    pub fn stepper<T, P>(&self, transport: T, page: P) -> StepperController<T, P>
    where
        T: StepperTransport,
        P: PortfolioPage,
    {
        StepperController::new(transport, page, self.settings.clone())
    }

    /// reqwest transport for `base_url`. Fails when no base URL is configured.
    pub fn http_transport(&self) -> Result<HttpTransport, CoreError> {
        HttpTransport::from_settings(&self.settings)
    }

    /// Typeahead over the configured stock names.
    #[must_use]
    pub fn typeahead(&self) -> SubstringMatcher {
        SubstringMatcher::new(self.settings.stock_names.clone(), self.settings.typeahead)
    }

    #[must_use]
    pub fn validator(&self) -> FormValidator {
        FormValidator::new()
    }

    #[must_use]
    pub fn alert_board(&self) -> AlertBoard {
        AlertBoard::new()
    }

    /// A notice using the configured dismissal timing.
    #[must_use]
    pub fn notice(&self, level: NoticeLevel, message: impl Into<String>) -> Notice {
        Notice::new(level, message, self.settings.alerts)
    }
}

impl Default for TradeDesk {
    fn default() -> Self {
        Self::new()
    }
}
