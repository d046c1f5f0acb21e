use std::cell::RefCell;
use std::collections::BTreeMap;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use trade_desk_core::errors::CoreError;
use trade_desk_core::models::notice::Notice;
use trade_desk_core::models::row::{RowField, RowKey};
use trade_desk_core::models::settings::{PageSelectors, Settings};
use trade_desk_core::page::traits::PortfolioPage;

use crate::{alerts, js_text};

/// The rendered portfolio table, captured once at bind time.
///
/// Rows are keyed `row-0`, `row-1`, … in document order; the key is also
/// written to `data-row-key` for debugging.
pub struct DomPage {
    document: Document,
    rows: RefCell<BTreeMap<RowKey, Element>>,
    cash_cell: Element,
    total_cell: Element,
    notice_container: Element,
    selectors: PageSelectors,
}

impl DomPage {
    /// Capture the rows and total cells. Fails if the page has no stepper table.
    pub fn bind(document: &Document, settings: &Settings) -> Result<Self, CoreError> {
        let selectors = settings.selectors.clone();
        let by_id = |id: &str| {
            document
                .get_element_by_id(id)
                .ok_or_else(|| CoreError::MissingElement(format!("#{id}")))
        };
        let cash_cell = by_id(&selectors.cash_cell_id)?;
        let total_cell = by_id(&selectors.total_cell_id)?;
        let notice_container = match document.get_element_by_id(&selectors.notice_container_id) {
            Some(el) => el,
            None => document
                .body()
                .map(Element::from)
                .ok_or_else(|| CoreError::MissingElement("<body>".into()))?,
        };

        let row_selector = format!("tr[data-{}]", selectors.row_data_attribute);
        let found = document
            .query_selector_all(&row_selector)
            .map_err(|e| CoreError::MissingElement(js_text(&e)))?;
        let mut rows = BTreeMap::new();
        for i in 0..found.length() {
            let Some(row) = found.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let key = RowKey::new(format!("row-{i}"));
            row.set_attribute("data-row-key", key.as_str())
                .map_err(|e| CoreError::MissingElement(js_text(&e)))?;
            rows.insert(key, row);
        }
        log::debug!("Bound {} stepper rows", rows.len());

        Ok(Self {
            document: document.clone(),
            rows: RefCell::new(rows),
            cash_cell,
            total_cell,
            notice_container,
            selectors,
        })
    }

    /// Bound rows still on the page, in key order.
    pub fn rows(&self) -> Vec<(RowKey, Element)> {
        self.rows
            .borrow()
            .iter()
            .map(|(k, el)| (k.clone(), el.clone()))
            .collect()
    }

    fn row(&self, row: &RowKey) -> Result<Element, CoreError> {
        self.rows
            .borrow()
            .get(row)
            .cloned()
            .ok_or_else(|| CoreError::RowNotFound(row.to_string()))
    }

    fn label(&self, row: &RowKey, field: RowField) -> Result<Element, CoreError> {
        self.row(row)?
            .query_selector(&format!(".{}", field.class_name()))
            .map_err(|e| CoreError::MissingElement(js_text(&e)))?
            .ok_or_else(|| CoreError::MissingElement(format!("row {row} has no .{field} label")))
    }

    fn row_attribute(&self) -> String {
        format!("data-{}", self.selectors.row_data_attribute)
    }

    fn total_attribute(&self) -> String {
        format!("data-{}", self.selectors.grand_total_data_attribute)
    }
}

impl PortfolioPage for DomPage {
    fn row_data(&self, row: &RowKey) -> Option<String> {
        self.row(row).ok()?.get_attribute(&self.row_attribute())
    }

    fn grand_total_data(&self) -> Option<String> {
        self.total_cell.get_attribute(&self.total_attribute())
    }

    fn check_row(&self, row: &RowKey) -> Result<(), CoreError> {
        for field in RowField::ALL {
            self.label(row, field)?;
        }
        Ok(())
    }

    fn write_row(
        &self,
        row: &RowKey,
        labels: &[(RowField, &str); 4],
        data: &str,
    ) -> Result<(), CoreError> {
        let element = self.row(row)?;
        let targets = labels
            .iter()
            .map(|(field, text)| Ok((self.label(row, *field)?, *text)))
            .collect::<Result<Vec<_>, CoreError>>()?;

        for (label, text) in targets {
            label.set_text_content(Some(text));
        }
        element
            .set_attribute(&self.row_attribute(), data)
            .map_err(|e| CoreError::MissingElement(js_text(&e)))
    }

    fn set_cash(&self, text: &str) -> Result<(), CoreError> {
        self.cash_cell.set_text_content(Some(text));
        Ok(())
    }

    fn set_grand_total(&self, text: &str) -> Result<(), CoreError> {
        self.total_cell.set_text_content(Some(text));
        Ok(())
    }

    fn remove_row(&self, row: &RowKey) -> Result<(), CoreError> {
        let element = self
            .rows
            .borrow_mut()
            .remove(row)
            .ok_or_else(|| CoreError::RowNotFound(row.to_string()))?;
        element.remove();
        Ok(())
    }

    fn show_notice(&self, notice: &Notice) {
        if let Err(e) = alerts::show_notice(&self.document, &self.notice_container, notice) {
            log::error!("Failed to show notice {:?}: {}", notice.message, js_text(&e));
        }
    }
}
