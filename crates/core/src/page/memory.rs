use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::traits::PortfolioPage;
use crate::errors::CoreError;
use crate::models::display::DisplayValue;
use crate::models::notice::Notice;
use crate::models::row::{RowField, RowKey};
use crate::models::transaction::RowTransaction;
use crate::services::alert_service::AlertBoard;

/// One table row as the page holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRow {
    pub key: RowKey,
    /// Serialized transaction (`data-transaction`)
    pub data: String,
    pub labels: HashMap<RowField, String>,
}

impl MemoryRow {
    pub fn label(&self, field: RowField) -> Option<&str> {
        self.labels.get(&field).map(String::as_str)
    }
}

/// Comparable copy of everything a step may change, notices excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub rows: Vec<MemoryRow>,
    pub cash: String,
    pub grand_total: String,
    pub grand_total_data: Option<String>,
}

#[derive(Debug)]
struct PageState {
    rows: Vec<MemoryRow>,
    cash: String,
    grand_total: String,
    grand_total_data: Option<String>,
    alerts: AlertBoard,
    clock_ms: u64,
    notices_posted: usize,
}

/// In-memory rendition of the portfolio table.
///
/// Behaves like the DOM page: rows keep their order, removed rows are gone
/// for good, and notices dismiss themselves as the manual clock advances.
#[derive(Debug)]
pub struct MemoryPage {
    state: Mutex<PageState>,
}

impl MemoryPage {
    /// A page with no rows. The grand-total data attribute starts equal to its text.
    pub fn new(cash: impl Into<String>, grand_total: impl Into<String>) -> Self {
        let grand_total = grand_total.into();
        Self {
            state: Mutex::new(PageState {
                rows: Vec::new(),
                cash: cash.into(),
                grand_total_data: Some(grand_total.clone()),
                grand_total,
                alerts: AlertBoard::new(),
                clock_ms: 0,
                notices_posted: 0,
            }),
        }
    }

    /// Add a row rendered from a transaction, the way the template would.
    pub fn with_row(self, key: impl Into<RowKey>, transaction: &RowTransaction) -> Self {
        let mut labels = HashMap::new();
        labels.insert(RowField::Quantity, transaction.quantity.to_string());
        for field in [RowField::Price, RowField::Variation, RowField::Amount] {
            let text = transaction
                .field(field.class_name())
                .and_then(DisplayValue::from_json)
                .map(|v| v.to_string())
                .unwrap_or_default();
            labels.insert(field, text);
        }
        let data = serde_json::to_string(transaction).unwrap_or_default();
        self.with_raw_row(key, data, labels)
    }

    /// Add a row with explicit data and labels.
    pub fn with_raw_row(
        self,
        key: impl Into<RowKey>,
        data: impl Into<String>,
        labels: HashMap<RowField, String>,
    ) -> Self {
        self.lock().rows.push(MemoryRow {
            key: key.into(),
            data: data.into(),
            labels,
        });
        self
    }

    /// Override the grand-total data attribute (or drop it with `None`).
    pub fn with_grand_total_data(self, data: Option<String>) -> Self {
        self.lock().grand_total_data = data;
        self
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn row(&self, key: &RowKey) -> Option<MemoryRow> {
        self.lock().rows.iter().find(|r| &r.key == key).cloned()
    }

    pub fn row_keys(&self) -> Vec<RowKey> {
        self.lock().rows.iter().map(|r| r.key.clone()).collect()
    }

    pub fn label(&self, key: &RowKey, field: RowField) -> Option<String> {
        self.row(key).and_then(|r| r.label(field).map(str::to_string))
    }

    pub fn cash(&self) -> String {
        self.lock().cash.clone()
    }

    pub fn grand_total(&self) -> String {
        self.lock().grand_total.clone()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let state = self.lock();
        PageSnapshot {
            rows: state.rows.clone(),
            cash: state.cash.clone(),
            grand_total: state.grand_total.clone(),
            grand_total_data: state.grand_total_data.clone(),
        }
    }

    // ── Notices ─────────────────────────────────────────────────────

    /// Move the page clock forward, closing notices whose time is up.
    pub fn advance_clock(&self, ms: u64) {
        let mut state = self.lock();
        state.clock_ms = state.clock_ms.saturating_add(ms);
        let now = state.clock_ms;
        state.alerts.sweep(now);
    }

    /// Messages of the notices currently on screen, oldest first.
    pub fn visible_notices(&self) -> Vec<String> {
        let state = self.lock();
        state
            .alerts
            .visible(state.clock_ms)
            .into_iter()
            .map(|(alert, _)| alert.notice.message.clone())
            .collect()
    }

    /// How many notices were ever shown.
    pub fn notices_posted(&self) -> usize {
        self.lock().notices_posted
    }

    fn with_row_mut<R>(
        &self,
        key: &RowKey,
        f: impl FnOnce(&mut MemoryRow) -> R,
    ) -> Result<R, CoreError> {
        let mut state = self.lock();
        let row = state
            .rows
            .iter_mut()
            .find(|r| &r.key == key)
            .ok_or_else(|| CoreError::RowNotFound(key.to_string()))?;
        Ok(f(row))
    }
}

impl PortfolioPage for MemoryPage {
    fn row_data(&self, row: &RowKey) -> Option<String> {
        self.row(row).map(|r| r.data)
    }

    fn grand_total_data(&self) -> Option<String> {
        self.lock().grand_total_data.clone()
    }

    fn check_row(&self, row: &RowKey) -> Result<(), CoreError> {
        let found = self
            .row(row)
            .ok_or_else(|| CoreError::RowNotFound(row.to_string()))?;
        match RowField::ALL.iter().find(|f| !found.labels.contains_key(f)) {
            Some(missing) => Err(CoreError::MissingElement(format!(
                "row {row} has no .{missing} label"
            ))),
            None => Ok(()),
        }
    }

    fn write_row(
        &self,
        row: &RowKey,
        labels: &[(RowField, &str); 4],
        data: &str,
    ) -> Result<(), CoreError> {
        self.with_row_mut(row, |r| {
            if let Some((field, _)) = labels.iter().find(|(f, _)| !r.labels.contains_key(f)) {
                return Err(CoreError::MissingElement(format!(
                    "row {} has no .{field} label",
                    r.key
                )));
            }
            for (field, text) in labels {
                r.labels.insert(*field, text.to_string());
            }
            r.data = data.to_string();
            Ok(())
        })?
    }

    fn set_cash(&self, text: &str) -> Result<(), CoreError> {
        self.lock().cash = text.to_string();
        Ok(())
    }

    fn set_grand_total(&self, text: &str) -> Result<(), CoreError> {
        self.lock().grand_total = text.to_string();
        Ok(())
    }

    fn remove_row(&self, row: &RowKey) -> Result<(), CoreError> {
        let mut state = self.lock();
        let idx = state
            .rows
            .iter()
            .position(|r| &r.key == row)
            .ok_or_else(|| CoreError::RowNotFound(row.to_string()))?;
        state.rows.remove(idx);
        Ok(())
    }

    fn show_notice(&self, notice: &Notice) {
        let mut state = self.lock();
        let now = state.clock_ms;
        state.alerts.post(notice.clone(), now);
        state.notices_posted += 1;
    }
}
