use crate::errors::CoreError;
use crate::models::notice::Notice;
use crate::models::row::{RowField, RowKey};
use crate::models::step::RowUpdate;

/// Everything the stepper reads from or writes to the rendered page.
///
/// The browser implementation wraps DOM elements captured at bind time;
/// `MemoryPage` keeps the same state in plain Rust for tests and tooling.
/// Methods take `&self`: DOM handles are shared references by nature.
pub trait PortfolioPage {
    /// The row's serialized transaction, or `None` if the row is gone.
    fn row_data(&self, row: &RowKey) -> Option<String>;

    /// The serialized grand total the server expects back.
    fn grand_total_data(&self) -> Option<String>;

    /// Confirm the row exists and exposes all of its labels.
    fn check_row(&self, row: &RowKey) -> Result<(), CoreError>;

    /// Write the row's four labels and its stored transaction.
    ///
    /// Every target is resolved before anything is written: if one label
    /// is gone the row is left exactly as it was.
    fn write_row(
        &self,
        row: &RowKey,
        labels: &[(RowField, &str); 4],
        data: &str,
    ) -> Result<(), CoreError>;

    fn set_cash(&self, text: &str) -> Result<(), CoreError>;

    /// Update the grand-total cell's text. Its data attribute, which is what
    /// the next request posts, keeps the server-rendered value.
    fn set_grand_total(&self, text: &str) -> Result<(), CoreError>;

    fn remove_row(&self, row: &RowKey) -> Result<(), CoreError>;

    /// Display a transient notice. Dismissal is the page's job.
    fn show_notice(&self, notice: &Notice);

    /// Write a successful step back to the row and the page totals.
    fn apply_update(&self, row: &RowKey, update: &RowUpdate) -> Result<(), CoreError> {
        let data = update.transaction.to_data_string()?;
        let quantity = update.quantity_label();
        self.write_row(
            row,
            &[
                (RowField::Quantity, quantity.as_str()),
                (RowField::Price, update.price.as_str()),
                (RowField::Variation, update.variation.as_str()),
                (RowField::Amount, update.amount.as_str()),
            ],
            &data,
        )?;
        self.set_cash(update.totals.cash.as_str())?;
        self.set_grand_total(update.totals.grand_total.as_str())
    }
}
