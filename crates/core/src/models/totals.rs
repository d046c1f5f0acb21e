use serde::{Deserialize, Serialize};

use super::display::DisplayValue;

/// Page-level figures recomputed by the server after every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    /// Uninvested cash balance
    pub cash: DisplayValue,

    /// Cash plus the value of every holding
    pub grand_total: DisplayValue,
}
