use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event};

use trade_desk_core::models::row::RowKey;
use trade_desk_core::services::stepper_service::StepperController;

use crate::dom_page::DomPage;
use crate::fetch::FetchTransport;

pub type Controller = StepperController<FetchTransport, DomPage>;

/// Attach a click handler to every stepper button of every bound row.
pub fn bind_steppers(controller: Rc<Controller>) -> Result<(), JsValue> {
    let selector = controller.settings().selectors.button_selector.clone();
    let mut bound = 0;

    for (row, element) in controller.page().rows() {
        let buttons = element.query_selector_all(&selector)?;
        for i in 0..buttons.length() {
            let Some(button) = buttons.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            bind_button(&controller, row.clone(), &button)?;
            bound += 1;
        }
    }

    log::debug!("Bound {bound} stepper buttons");
    Ok(())
}

fn bind_button(controller: &Rc<Controller>, row: RowKey, button: &Element) -> Result<(), JsValue> {
    let controller = Rc::clone(controller);
    let source = button.clone();

    let on_click = Closure::wrap(Box::new(move |event: Event| {
        event.prevent_default();
        let value = source.get_attribute("value").unwrap_or_default();
        let controller = Rc::clone(&controller);
        let row = row.clone();
        spawn_local(async move {
            let outcome = controller.handle_click(&row, &value).await;
            log::debug!("Stepper {value:?} on row {row}: {outcome:?}");
        });
    }) as Box<dyn FnMut(Event)>);

    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    // The page owns the buttons for its whole lifetime.
    on_click.forget();
    Ok(())
}
