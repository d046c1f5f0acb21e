//! Browser bindings for the trade desk page.
//!
//! `install` is the single entry point: it reads the page configuration,
//! binds the stepper table, and wires the typeahead, validated forms and
//! alert dismissal. Everything here is wasm32-only; the behavior itself
//! lives in `trade_desk_core`.

#[cfg(target_arch = "wasm32")]
pub mod alerts;
#[cfg(target_arch = "wasm32")]
pub mod dom_page;
#[cfg(target_arch = "wasm32")]
pub mod fetch;
#[cfg(target_arch = "wasm32")]
pub mod logger;
#[cfg(target_arch = "wasm32")]
pub mod stepper;
#[cfg(target_arch = "wasm32")]
pub mod typeahead;
#[cfg(target_arch = "wasm32")]
pub mod validation;

#[cfg(target_arch = "wasm32")]
pub use wasm::install;

#[cfg(target_arch = "wasm32")]
pub(crate) use wasm::js_text;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;

    use trade_desk_core::TradeDesk;

    use crate::dom_page::DomPage;
    use crate::fetch::FetchTransport;
    use crate::{alerts, logger, stepper, typeahead, validation};

    /// Readable text for a thrown JS value.
    pub(crate) fn js_text(value: &JsValue) -> String {
        value.as_string().unwrap_or_else(|| format!("{value:?}"))
    }

    fn to_js(err: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    /// Wire every page behavior. `config_json` overrides the defaults;
    /// absent keys keep them.
    #[wasm_bindgen]
    pub fn install(config_json: Option<String>) -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let desk = match config_json.as_deref() {
            Some(json) if !json.trim().is_empty() => TradeDesk::from_json(json).map_err(to_js)?,
            _ => TradeDesk::new(),
        };
        let settings = desk.settings();
        logger::init(settings.level_filter().map_err(to_js)?);
        log::debug!("Installing {desk:?}");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // Pages without the portfolio table still get the other behaviors.
        match DomPage::bind(&document, settings) {
            Ok(page) => {
                let controller = desk.stepper(FetchTransport::new(settings), page);
                stepper::bind_steppers(Rc::new(controller))?;
            }
            Err(e) => log::debug!("No stepper table on this page: {e}"),
        }

        typeahead::bind_typeahead(
            &document,
            &settings.selectors.typeahead_selector,
            desk.typeahead(),
        )?;
        validation::bind_validation(
            &document,
            &settings.selectors.validated_form_class,
            &settings.selectors.was_validated_class,
        )?;
        alerts::dismiss_on_load(
            &window,
            &document,
            settings.selectors.alert_selector.clone(),
            settings.alerts,
        )?;

        log::info!("Trade desk page installed");
        Ok(())
    }
}
