use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::errors::CoreError;
use crate::models::notice::Notice;
use crate::models::row::RowKey;
use crate::models::settings::Settings;
use crate::models::step::{Direction, StepOutcome, StepRequest, StepResponse};
use crate::page::traits::PortfolioPage;
use crate::transport::traits::{StepperTransport, TransportResponse};

/// What a stepper click ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Row labels and page totals now show the server's figures.
    Updated,
    /// Quantity hit zero and the row was removed.
    Removed,
    /// A request for this row was already outstanding; nothing was sent.
    Ignored,
    /// Nothing on the page changed; a notice with this message was shown.
    Failed(String),
}

/// Drives the buy/sell steppers of one page.
///
/// Owns its transport and page, so nothing is looked up globally. The
/// server is the only source of the displayed figures: the controller relays
/// them and never predicts them.
pub struct StepperController<T, P> {
    transport: T,
    page: P,
    settings: Settings,
    /// Rows with a request outstanding.
    in_flight: Mutex<HashSet<RowKey>>,
}

/// Holds a row's in-flight slot; releases it on drop, including cancellation.
struct InFlightGuard<'a> {
    rows: &'a Mutex<HashSet<RowKey>>,
    row: RowKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock_rows(self.rows).remove(&self.row);
    }
}

fn lock_rows(rows: &Mutex<HashSet<RowKey>>) -> MutexGuard<'_, HashSet<RowKey>> {
    rows.lock().unwrap_or_else(|e| e.into_inner())
}

impl<T: StepperTransport, P: PortfolioPage> StepperController<T, P> {
    pub fn new(transport: T, page: P, settings: Settings) -> Self {
        Self {
            transport,
            page,
            settings,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether a request for `row` is currently outstanding.
    pub fn is_in_flight(&self, row: &RowKey) -> bool {
        lock_rows(&self.in_flight).contains(row)
    }

    fn try_claim(&self, row: &RowKey) -> Option<InFlightGuard<'_>> {
        if !lock_rows(&self.in_flight).insert(row.clone()) {
            return None;
        }
        Some(InFlightGuard {
            rows: &self.in_flight,
            row: row.clone(),
        })
    }

    /// Entry point for a click on a `+`/`-` control in `row`.
    ///
    /// Every error is handled here and becomes an auto-dismissing notice.
    /// Repeat clicks on a row that is still waiting are dropped.
    pub async fn handle_click(&self, row: &RowKey, control_value: &str) -> ClickOutcome {
        let direction = match Direction::from_control_value(control_value) {
            Ok(direction) => direction,
            Err(e) => return self.report(row, e),
        };

        let Some(_guard) = self.try_claim(row) else {
            debug!("Ignoring {direction} on row {row}: request already in flight");
            return ClickOutcome::Ignored;
        };

        match self.step(row, direction).await {
            Ok(StepOutcome::Updated(_)) => ClickOutcome::Updated,
            Ok(StepOutcome::Removed) => ClickOutcome::Removed,
            Err(e) => self.report(row, e),
        }
    }

    /// One buy/sell round trip for `row`: request, decode, then apply.
    ///
    /// The page is written only once the response has decoded completely.
    /// Callers going through `handle_click` get the in-flight guard; this
    /// method does not take it.
    pub async fn step(&self, row: &RowKey, direction: Direction) -> Result<StepOutcome, CoreError> {
        let request = self.build_request(row, direction)?;
        let path = direction.endpoint(&self.settings);
        debug!(
            "{direction} one unit on row {row} via {} ({path})",
            self.transport.name()
        );

        let response = self
            .transport
            .post_form(path, &request.form_fields())
            .await?;
        let outcome = Self::decode(response)?;
        self.apply(row, &outcome)?;
        Ok(outcome)
    }

    fn build_request(&self, row: &RowKey, direction: Direction) -> Result<StepRequest, CoreError> {
        self.page.check_row(row)?;
        let transaction = self
            .page
            .row_data(row)
            .ok_or_else(|| CoreError::RowNotFound(row.to_string()))?;
        let grand_total = self.page.grand_total_data().ok_or_else(|| {
            CoreError::MissingElement(format!(
                "grand total data (data-{})",
                self.settings.selectors.grand_total_data_attribute
            ))
        })?;
        Ok(StepRequest {
            direction,
            transaction,
            grand_total,
        })
    }

    /// Decode a raw response. A body that isn't a step response is reported
    /// by HTTP status when the status is an error, otherwise as malformed.
    fn decode(response: TransportResponse) -> Result<StepOutcome, CoreError> {
        match StepResponse::parse(&response.body) {
            Ok(parsed) => parsed.into_outcome(),
            Err(_) if !response.is_success() => Err(CoreError::Http {
                status: response.status,
            }),
            Err(e) => Err(e),
        }
    }

    fn apply(&self, row: &RowKey, outcome: &StepOutcome) -> Result<(), CoreError> {
        match outcome {
            StepOutcome::Removed => {
                info!("Row {row} reached zero quantity; removing it");
                self.page.remove_row(row)
            }
            StepOutcome::Updated(update) => self.page.apply_update(row, update),
        }
    }

    fn report(&self, row: &RowKey, err: CoreError) -> ClickOutcome {
        match &err {
            CoreError::Rejected(message) => warn!("Step on row {row} rejected: {message}"),
            CoreError::InvalidDirection(_) => warn!("Stepper control on row {row}: {err}"),
            _ if err.is_transport() => error!(
                "Step on row {row} did not complete via {}: {err}",
                self.transport.name()
            ),
            _ => error!("Step on row {row} failed: {err}"),
        }
        let message = err.notice_message();
        self.page
            .show_notice(&Notice::error(message.clone(), self.settings.alerts));
        ClickOutcome::Failed(message)
    }
}
