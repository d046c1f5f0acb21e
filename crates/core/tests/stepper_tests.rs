// ═══════════════════════════════════════════════════════════════════
// Stepper Tests — request/update cycle, failures, in-flight guard
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use trade_desk_core::errors::CoreError;
use trade_desk_core::models::row::{RowField, RowKey};
use trade_desk_core::models::settings::Settings;
use trade_desk_core::models::step::{Direction, StepOutcome};
use trade_desk_core::models::transaction::RowTransaction;
use trade_desk_core::page::memory::MemoryPage;
use trade_desk_core::page::traits::PortfolioPage;
use trade_desk_core::services::stepper_service::{ClickOutcome, StepperController};
use trade_desk_core::transport::traits::{StepperTransport, TransportResponse};
use trade_desk_core::TradeDesk;

// ═══════════════════════════════════════════════════════════════════
// Mock Transports
// ═══════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
struct RecordedCall {
    path: String,
    fields: Vec<(String, String)>,
}

/// Replies with queued responses in order and records every request.
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<TransportResponse, CoreError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<TransportResponse, CoreError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn json(body: serde_json::Value) -> Self {
        Self::new(vec![Ok(TransportResponse::ok(body.to_string()))])
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StepperTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn post_form(
        &self,
        path: &str,
        fields: &[(&'static str, String)],
    ) -> Result<TransportResponse, CoreError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CoreError::Network("no scripted reply".into())))
    }
}

/// Holds every request until `gate` is notified, then replies with `body`.
struct GatedTransport {
    gate: Notify,
    body: String,
    calls: AtomicUsize,
}

impl GatedTransport {
    fn new(body: serde_json::Value) -> Self {
        Self {
            gate: Notify::new(),
            body: body.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StepperTransport for GatedTransport {
    fn name(&self) -> &str {
        "gated"
    }

    async fn post_form(
        &self,
        _path: &str,
        _fields: &[(&'static str, String)],
    ) -> Result<TransportResponse, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(TransportResponse::ok(self.body.clone()))
    }
}

// ═══════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════

fn holding(quantity: u64, price: i64) -> RowTransaction {
    RowTransaction::new(quantity)
        .with_field("price", price)
        .with_field("amount", price * quantity as i64)
}

/// Two rows: "mmm" at quantity 5 (the scenario row) and "abb" at quantity 1.
fn portfolio_page() -> MemoryPage {
    MemoryPage::new("1000", "2000")
        .with_row("mmm", &holding(5, 100).with_field("symbol", "MMM"))
        .with_row("abb", &holding(1, 30).with_field("symbol", "ABB"))
}

fn buy_reply() -> serde_json::Value {
    json!({
        "success": true,
        "transaction": {"quantity": 6, "symbol": "MMM", "price": 102, "amount": 612},
        "price": 102, "variation": 2, "amount": 612,
        "cash": 898, "grand_total": 2100
    })
}

fn controller<T: StepperTransport>(transport: T) -> StepperController<T, MemoryPage> {
    TradeDesk::new().stepper(transport, portfolio_page())
}

fn key(k: &str) -> RowKey {
    RowKey::from(k)
}

// ═══════════════════════════════════════════════════════════════════
// Successful steps
// ═══════════════════════════════════════════════════════════════════

mod success {
    use super::*;

    #[tokio::test]
    async fn buy_relays_every_field() {
        let c = controller(ScriptedTransport::json(buy_reply()));
        let row = key("mmm");

        assert_eq!(c.handle_click(&row, "+").await, ClickOutcome::Updated);

        let page = c.page();
        assert_eq!(page.label(&row, RowField::Quantity).unwrap(), "6");
        assert_eq!(page.label(&row, RowField::Price).unwrap(), "102");
        assert_eq!(page.label(&row, RowField::Variation).unwrap(), "2");
        assert_eq!(page.label(&row, RowField::Amount).unwrap(), "612");
        assert_eq!(page.cash(), "898");
        assert_eq!(page.grand_total(), "2100");
        assert!(page.row_keys().contains(&row));
        assert_eq!(page.notices_posted(), 0);
    }

    #[tokio::test]
    async fn stored_transaction_is_the_server_object() {
        let c = controller(ScriptedTransport::json(json!({
            "success": true,
            "transaction": {"quantity": 6, "lot": "b"},
            "price": 102, "variation": 2, "amount": 612, "cash": 898, "grand_total": 2100
        })));
        let row = key("mmm");
        c.handle_click(&row, "+").await;

        let stored = RowTransaction::parse(&c.page().row_data(&row).unwrap()).unwrap();
        assert_eq!(stored, RowTransaction::new(6).with_field("lot", "b"));
        // Replaced wholesale: fields the server didn't echo are gone.
        assert!(stored.field("symbol").is_none());
    }

    #[tokio::test]
    async fn quantity_comes_from_server_not_local_arithmetic() {
        let mut reply = buy_reply();
        reply["transaction"]["quantity"] = json!(9);
        let c = controller(ScriptedTransport::json(reply));
        let row = key("mmm");

        c.handle_click(&row, "+").await;
        assert_eq!(c.page().label(&row, RowField::Quantity).unwrap(), "9");
    }

    #[tokio::test]
    async fn preformatted_strings_are_shown_verbatim() {
        let c = controller(ScriptedTransport::json(json!({
            "success": true,
            "transaction": {"quantity": 4},
            "price": "$98.00", "variation": "-$2.00", "amount": "$392.00",
            "cash": "$1,098.00", "grand_total": "$1,900.00"
        })));
        let row = key("mmm");
        c.handle_click(&row, "-").await;

        assert_eq!(c.page().label(&row, RowField::Variation).unwrap(), "-$2.00");
        assert_eq!(c.page().cash(), "$1,098.00");
        assert_eq!(c.page().grand_total(), "$1,900.00");
    }

    #[tokio::test]
    async fn other_rows_are_untouched_by_an_update() {
        let c = controller(ScriptedTransport::json(buy_reply()));
        let before = c.page().row(&key("abb")).unwrap();
        c.handle_click(&key("mmm"), "+").await;
        assert_eq!(c.page().row(&key("abb")).unwrap(), before);
    }

    #[tokio::test]
    async fn displayed_grand_total_is_never_posted_back() {
        let mut first = buy_reply();
        first["grand_total"] = json!("$2,100.00");
        let mut second = buy_reply();
        second["transaction"]["quantity"] = json!(7);
        let c = controller(ScriptedTransport::new(vec![
            Ok(TransportResponse::ok(first.to_string())),
            Ok(TransportResponse::ok(second.to_string())),
        ]));
        let row = key("mmm");

        c.handle_click(&row, "+").await;
        assert_eq!(c.page().grand_total(), "$2,100.00");
        assert_eq!(c.page().grand_total_data().unwrap(), "2000");
        c.handle_click(&row, "+").await;

        let calls = c.transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].fields[1], ("grand_total".into(), "2000".into()));
        assert_eq!(calls[1].fields[1], ("grand_total".into(), "2000".into()));
        // The second request posts the transaction stored by the first.
        let sent = RowTransaction::parse(&calls[1].fields[0].1).unwrap();
        assert_eq!(sent.quantity, 6);
    }

    #[tokio::test]
    async fn step_returns_the_outcome() {
        let c = controller(ScriptedTransport::json(buy_reply()));
        let outcome = c.step(&key("mmm"), Direction::Buy).await.unwrap();
        let StepOutcome::Updated(update) = outcome else {
            panic!("expected update");
        };
        assert_eq!(update.totals.cash.as_str(), "898");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Row removal
// ═══════════════════════════════════════════════════════════════════

mod removal {
    use super::*;

    #[tokio::test]
    async fn zero_quantity_removes_only_that_row() {
        let c = controller(ScriptedTransport::json(json!({
            "success": true,
            "transaction": {"quantity": 0},
            "price": 30, "variation": 0, "amount": 0, "cash": 1030, "grand_total": 2000
        })));
        let before_other = c.page().row(&key("mmm")).unwrap();

        assert_eq!(c.handle_click(&key("abb"), "-").await, ClickOutcome::Removed);

        assert_eq!(c.page().row_keys(), vec![key("mmm")]);
        assert_eq!(c.page().row(&key("mmm")).unwrap(), before_other);
    }

    #[tokio::test]
    async fn removal_does_not_touch_totals() {
        let c = controller(ScriptedTransport::json(json!({
            "success": true,
            "transaction": {"quantity": 0}
        })));
        c.handle_click(&key("abb"), "-").await;
        assert_eq!(c.page().cash(), "1000");
        assert_eq!(c.page().grand_total(), "2000");
    }

    #[tokio::test]
    async fn clicking_a_removed_row_sends_nothing() {
        let c = controller(ScriptedTransport::json(json!({
            "success": true,
            "transaction": {"quantity": 0}
        })));
        c.handle_click(&key("abb"), "-").await;

        let outcome = c.handle_click(&key("abb"), "-").await;
        assert!(matches!(outcome, ClickOutcome::Failed(ref m) if m.contains("Row not found")));
        assert_eq!(c.transport().calls().len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Endpoint selection
// ═══════════════════════════════════════════════════════════════════

mod endpoints {
    use super::*;

    #[tokio::test]
    async fn plus_posts_to_buy_and_minus_to_sell() {
        let mut sell = buy_reply();
        sell["transaction"]["quantity"] = json!(5);
        let c = controller(ScriptedTransport::new(vec![
            Ok(TransportResponse::ok(buy_reply().to_string())),
            Ok(TransportResponse::ok(sell.to_string())),
        ]));
        let row = key("mmm");

        c.handle_click(&row, "+").await;
        c.handle_click(&row, "-").await;

        let paths: Vec<_> = c.transport().calls().into_iter().map(|c| c.path).collect();
        assert_eq!(paths, vec!["/buy_1", "/sell_1"]);
    }

    #[tokio::test]
    async fn form_carries_row_data_verbatim() {
        let raw = r#"{"quantity": 5,  "price": 100, "amount": 500}"#;
        let page = MemoryPage::new("1000", "2000").with_raw_row(
            "raw",
            raw,
            RowField::ALL.iter().map(|f| (*f, String::new())).collect(),
        );
        let c = TradeDesk::new().stepper(ScriptedTransport::json(buy_reply()), page);

        c.handle_click(&key("raw"), "+").await;

        let call = &c.transport().calls()[0];
        assert_eq!(
            call.fields,
            vec![
                ("transaction".to_string(), raw.to_string()),
                ("grand_total".to_string(), "2000".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn configured_endpoints_are_used() {
        let desk =
            TradeDesk::from_json(r#"{"buy_endpoint": "/api/buy", "sell_endpoint": "/api/sell"}"#)
                .unwrap();
        let c = desk.stepper(ScriptedTransport::json(buy_reply()), portfolio_page());
        c.handle_click(&key("mmm"), "+").await;
        assert_eq!(c.transport().calls()[0].path, "/api/buy");
    }

    #[tokio::test]
    async fn invalid_control_value_contacts_nothing() {
        let c = controller(ScriptedTransport::json(buy_reply()));
        let before = c.page().snapshot();

        let outcome = c.handle_click(&key("mmm"), "x").await;

        assert!(matches!(outcome, ClickOutcome::Failed(_)));
        assert!(c.transport().calls().is_empty());
        assert_eq!(c.page().snapshot(), before);
        assert_eq!(c.page().notices_posted(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Failures leave the page unchanged and surface a notice
// ═══════════════════════════════════════════════════════════════════

mod failures {
    use super::*;

    async fn assert_unchanged_with_notice(
        reply: Result<TransportResponse, CoreError>,
        expected_notice: &str,
    ) {
        let c = controller(ScriptedTransport::new(vec![reply]));
        let before = c.page().snapshot();

        let outcome = c.handle_click(&key("mmm"), "+").await;

        assert_eq!(outcome, ClickOutcome::Failed(expected_notice.to_string()));
        assert_eq!(c.page().snapshot(), before);
        assert_eq!(c.page().visible_notices(), vec![expected_notice.to_string()]);
        assert!(!c.is_in_flight(&key("mmm")));
    }

    #[tokio::test]
    async fn application_rejection() {
        assert_unchanged_with_notice(
            Ok(TransportResponse::ok(
                json!({"success": false, "message": "insufficient funds"}).to_string(),
            )),
            "insufficient funds",
        )
        .await;
    }

    #[tokio::test]
    async fn rejection_on_error_status_still_shows_server_message() {
        assert_unchanged_with_notice(
            Ok(TransportResponse::new(
                400,
                json!({"success": false, "message": "not enough shares"}).to_string(),
            )),
            "not enough shares",
        )
        .await;
    }

    #[tokio::test]
    async fn server_error_page() {
        assert_unchanged_with_notice(
            Ok(TransportResponse::new(500, "<h1>Internal Server Error</h1>")),
            "Server responded with HTTP 500",
        )
        .await;
    }

    #[tokio::test]
    async fn transport_failure() {
        assert_unchanged_with_notice(
            Err(CoreError::Network("connection reset".into())),
            "Network error: connection reset",
        )
        .await;
    }

    #[tokio::test]
    async fn garbage_body() {
        let c = controller(ScriptedTransport::new(vec![Ok(TransportResponse::ok("ok!"))]));
        let before = c.page().snapshot();
        let outcome = c.handle_click(&key("mmm"), "+").await;
        assert!(matches!(outcome, ClickOutcome::Failed(ref m) if m.starts_with("Malformed response")));
        assert_eq!(c.page().snapshot(), before);
    }

    #[tokio::test]
    async fn missing_field_changes_nothing() {
        let mut reply = buy_reply();
        reply.as_object_mut().unwrap().remove("cash");
        let c = controller(ScriptedTransport::json(reply));
        let before = c.page().snapshot();

        let outcome = c.handle_click(&key("mmm"), "+").await;

        assert!(matches!(outcome, ClickOutcome::Failed(ref m) if m.contains("cash")));
        assert_eq!(c.page().snapshot(), before);
    }

    #[tokio::test]
    async fn missing_grand_total_data_sends_nothing() {
        let page = portfolio_page().with_grand_total_data(None);
        let c = TradeDesk::new().stepper(ScriptedTransport::json(buy_reply()), page);

        let outcome = c.handle_click(&key("mmm"), "+").await;

        assert!(matches!(outcome, ClickOutcome::Failed(ref m) if m.contains("data-grand_total")));
        assert!(c.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn row_without_labels_sends_nothing() {
        let page = MemoryPage::new("0", "0").with_raw_row(
            "bare",
            r#"{"quantity":1}"#,
            Default::default(),
        );
        let c = TradeDesk::new().stepper(ScriptedTransport::json(buy_reply()), page);

        let err = c.step(&key("bare"), Direction::Buy).await.unwrap_err();
        assert!(matches!(err, CoreError::MissingElement(_)));
        assert!(c.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn notice_appears_then_disappears() {
        let c = controller(ScriptedTransport::json(
            json!({"success": false, "message": "insufficient funds"}),
        ));
        c.handle_click(&key("mmm"), "+").await;

        let page = c.page();
        assert_eq!(page.visible_notices(), vec!["insufficient funds".to_string()]);
        page.advance_clock(2_000);
        // Sliding away, still on screen.
        assert_eq!(page.visible_notices().len(), 1);
        page.advance_clock(500);
        assert!(page.visible_notices().is_empty());
    }

    #[tokio::test]
    async fn notice_uses_configured_timing() {
        let settings = Settings::from_json(r#"{"alerts": {"delay_ms": 10, "slide_ms": 5}}"#).unwrap();
        let c = StepperController::new(
            ScriptedTransport::json(json!({"success": false, "message": "nope"})),
            portfolio_page(),
            settings,
        );
        c.handle_click(&key("mmm"), "+").await;
        c.page().advance_clock(15);
        assert!(c.page().visible_notices().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Per-row in-flight guard
// ═══════════════════════════════════════════════════════════════════

mod in_flight {
    use super::*;

    #[tokio::test]
    async fn repeat_click_while_waiting_is_ignored() {
        let c = controller(GatedTransport::new(buy_reply()));
        let row = key("mmm");

        let mut first = Box::pin(c.handle_click(&row, "+"));
        assert!(futures::poll!(first.as_mut()).is_pending());
        assert!(c.is_in_flight(&row));

        assert_eq!(c.handle_click(&row, "+").await, ClickOutcome::Ignored);
        assert_eq!(c.handle_click(&row, "-").await, ClickOutcome::Ignored);
        assert_eq!(c.transport().calls(), 1);

        c.transport().gate.notify_one();
        assert_eq!(first.await, ClickOutcome::Updated);
        assert!(!c.is_in_flight(&row));
        assert_eq!(c.page().label(&row, RowField::Quantity).unwrap(), "6");
    }

    #[tokio::test]
    async fn guard_is_released_after_completion() {
        let c = controller(GatedTransport::new(buy_reply()));
        let row = key("mmm");

        c.transport().gate.notify_one();
        assert_eq!(c.handle_click(&row, "+").await, ClickOutcome::Updated);

        c.transport().gate.notify_one();
        assert_eq!(c.handle_click(&row, "+").await, ClickOutcome::Updated);
        assert_eq!(c.transport().calls(), 2);
    }

    #[tokio::test]
    async fn guard_is_released_after_failure() {
        let c = controller(ScriptedTransport::new(vec![
            Err(CoreError::Network("down".into())),
            Ok(TransportResponse::ok(buy_reply().to_string())),
        ]));
        let row = key("mmm");

        assert!(matches!(c.handle_click(&row, "+").await, ClickOutcome::Failed(_)));
        assert_eq!(c.handle_click(&row, "+").await, ClickOutcome::Updated);
    }

    #[tokio::test]
    async fn dropped_request_releases_the_row() {
        let c = controller(GatedTransport::new(buy_reply()));
        let row = key("mmm");
        {
            let mut pending = Box::pin(c.handle_click(&row, "+"));
            assert!(futures::poll!(pending.as_mut()).is_pending());
            assert!(c.is_in_flight(&row));
        }
        assert!(!c.is_in_flight(&row));
    }

    #[tokio::test]
    async fn different_rows_do_not_block_each_other() {
        let c = controller(GatedTransport::new(json!({
            "success": true,
            "transaction": {"quantity": 2},
            "price": 1, "variation": 0, "amount": 2, "cash": 1, "grand_total": 3
        })));

        let (ka, kb) = (key("mmm"), key("abb"));
        let mut a = Box::pin(c.handle_click(&ka, "+"));
        let mut b = Box::pin(c.handle_click(&kb, "+"));
        assert!(futures::poll!(a.as_mut()).is_pending());
        assert!(futures::poll!(b.as_mut()).is_pending());
        assert_eq!(c.transport().calls(), 2);

        c.transport().gate.notify_waiters();
        let (ra, rb) = tokio::join!(a, b);
        assert_eq!(ra, ClickOutcome::Updated);
        assert_eq!(rb, ClickOutcome::Updated);
    }
}
