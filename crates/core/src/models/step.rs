use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::display::DisplayValue;
use super::settings::Settings;
use super::totals::PortfolioTotals;
use super::transaction::RowTransaction;
use crate::errors::CoreError;

/// Fallback notice text when a rejection arrives without a message.
pub const DEFAULT_REJECTION_MESSAGE: &str = "The request was rejected";

/// Which way a stepper click moves the holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Buy one unit (`+`)
    Buy,
    /// Sell one unit (`-`)
    Sell,
}

impl Direction {
    /// Parse the `value` attribute of a stepper control.
    pub fn from_control_value(value: &str) -> Result<Self, CoreError> {
        match value.trim() {
            "+" => Ok(Direction::Buy),
            "-" => Ok(Direction::Sell),
            other => Err(CoreError::InvalidDirection(other.to_string())),
        }
    }

    /// Endpoint path for this direction.
    pub fn endpoint(self, settings: &Settings) -> &str {
        match self {
            Direction::Buy => &settings.buy_endpoint,
            Direction::Sell => &settings.sell_endpoint,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "Buy"),
            Direction::Sell => write!(f, "Sell"),
        }
    }
}

/// What gets posted for one click.
///
/// Both payloads are forwarded exactly as the page holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRequest {
    pub direction: Direction,
    pub transaction: String,
    pub grand_total: String,
}

impl StepRequest {
    /// Multipart form fields, in send order.
    pub fn form_fields(&self) -> [(&'static str, String); 2] {
        [
            ("transaction", self.transaction.clone()),
            ("grand_total", self.grand_total.clone()),
        ]
    }
}

/// JSON body returned by the buy/sell endpoints.
///
/// Display fields stay raw until `into_outcome` so a bad one can be named.
#[derive(Debug, Clone, Deserialize)]
pub struct StepResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub variation: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub cash: Option<Value>,
    #[serde(default)]
    pub grand_total: Option<Value>,
}

/// Everything a successful non-zero step writes back to the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate {
    pub transaction: RowTransaction,
    pub price: DisplayValue,
    pub variation: DisplayValue,
    pub amount: DisplayValue,
    pub totals: PortfolioTotals,
}

impl RowUpdate {
    /// Text for the quantity label; always the server's figure.
    pub fn quantity_label(&self) -> String {
        self.transaction.quantity.to_string()
    }
}

/// Result of a step the server accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Updated(RowUpdate),
    /// Quantity reached zero; the row goes away.
    Removed,
}

impl StepResponse {
    pub fn parse(body: &str) -> Result<Self, CoreError> {
        serde_json::from_str(body).map_err(|e| CoreError::MalformedResponse(e.to_string()))
    }

    /// Turn the wire shape into an outcome, or the error it represents.
    ///
    /// Nothing here touches the page, so a failure at any point leaves it as it was.
    pub fn into_outcome(self) -> Result<StepOutcome, CoreError> {
        if !self.success {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string());
            return Err(CoreError::Rejected(message));
        }

        let raw = self
            .transaction
            .ok_or_else(|| CoreError::MalformedResponse("missing field `transaction`".into()))?;
        let transaction: RowTransaction = serde_json::from_value(raw).map_err(|e| {
            CoreError::MalformedResponse(format!("invalid `transaction`: {e}"))
        })?;

        if transaction.is_empty() {
            return Ok(StepOutcome::Removed);
        }

        Ok(StepOutcome::Updated(RowUpdate {
            transaction,
            price: required("price", self.price)?,
            variation: required("variation", self.variation)?,
            amount: required("amount", self.amount)?,
            totals: PortfolioTotals {
                cash: required("cash", self.cash)?,
                grand_total: required("grand_total", self.grand_total)?,
            },
        }))
    }
}

fn required(name: &str, value: Option<Value>) -> Result<DisplayValue, CoreError> {
    let value =
        value.ok_or_else(|| CoreError::MalformedResponse(format!("missing field `{name}`")))?;
    DisplayValue::from_json(&value).ok_or_else(|| {
        CoreError::MalformedResponse(format!("field `{name}` is not displayable: {value}"))
    })
}
