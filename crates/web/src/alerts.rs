use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement, Window};

use trade_desk_core::models::notice::{DismissTiming, Notice};

fn timeout(ms: u64) -> TimeoutFuture {
    TimeoutFuture::new(u32::try_from(ms).unwrap_or(u32::MAX))
}

/// Fade `element` out after `timing.delay_ms`, then remove it.
pub fn schedule_dismiss(element: &HtmlElement, timing: DismissTiming) {
    let el = element.clone();
    spawn_local(async move {
        timeout(timing.delay_ms).await;

        let style = el.style();
        let fade = format!("opacity {}ms ease-in-out", timing.slide_ms);
        if let Err(e) = style
            .set_property("transition", &fade)
            .and_then(|_| style.set_property("opacity", "0"))
        {
            log::warn!("Alert fade not applied: {}", crate::js_text(&e));
        }

        timeout(timing.slide_ms).await;
        el.remove();
    });
}

/// Put a notice on screen inside `container` and schedule its dismissal.
pub fn show_notice(document: &Document, container: &Element, notice: &Notice) -> Result<(), JsValue> {
    let alert = document
        .create_element("div")?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str("alert is not HTMLElement"))?;
    alert.set_class_name(&format!("alert {}", notice.level.css_class()));
    alert.set_attribute("role", "alert")?;
    alert.set_text_content(Some(&notice.message));
    container.append_child(&alert)?;
    schedule_dismiss(&alert, notice.timing);
    Ok(())
}

/// Dismiss every server-rendered alert matching `selector`.
pub fn dismiss_rendered(document: &Document, selector: &str, timing: DismissTiming) -> Result<(), JsValue> {
    let alerts = document.query_selector_all(selector)?;
    for i in 0..alerts.length() {
        if let Some(alert) = alerts.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
            schedule_dismiss(&alert, timing);
        }
    }
    Ok(())
}

/// Run `dismiss_rendered` once the window has loaded (or now, if it already has).
pub fn dismiss_on_load(
    window: &Window,
    document: &Document,
    selector: String,
    timing: DismissTiming,
) -> Result<(), JsValue> {
    if document.ready_state() == "complete" {
        return dismiss_rendered(document, &selector, timing);
    }

    let doc = document.clone();
    let on_load = Closure::once_into_js(move || {
        if let Err(e) = dismiss_rendered(&doc, &selector, timing) {
            log::error!("Failed to dismiss alerts: {}", crate::js_text(&e));
        }
    });
    window.add_event_listener_with_callback("load", on_load.unchecked_ref())
}
