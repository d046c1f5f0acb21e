use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlInputElement, KeyboardEvent};

use trade_desk_core::services::typeahead_service::{SubstringMatcher, Suggestion};

const MENU_CLASS: &str = "typeahead-menu";
const HINT_CLASS: &str = "typeahead-hint";

/// Attach a suggestion menu to every input matching `selector`.
pub fn bind_typeahead(
    document: &Document,
    selector: &str,
    matcher: SubstringMatcher,
) -> Result<(), JsValue> {
    let matcher = Rc::new(matcher);
    let inputs = document.query_selector_all(selector)?;
    for i in 0..inputs.length() {
        let Some(input) = inputs
            .item(i)
            .and_then(|n| n.dyn_into::<HtmlInputElement>().ok())
        else {
            continue;
        };
        bind_input(document, input, Rc::clone(&matcher))?;
    }
    log::debug!("Bound typeahead to {} inputs", inputs.length());
    Ok(())
}

fn bind_input(
    document: &Document,
    input: HtmlInputElement,
    matcher: Rc<SubstringMatcher>,
) -> Result<(), JsValue> {
    let hint = document.create_element("span")?;
    hint.set_class_name(HINT_CLASS);
    hint.set_attribute("aria-hidden", "true")?;
    let menu = document.create_element("ul")?;
    menu.set_class_name(MENU_CLASS);
    input.after_with_node_2(&hint, &menu)?;

    let doc = document.clone();
    let list = menu.clone();
    let shown_hint = hint.clone();
    let source = input.clone();
    let on_input = Closure::wrap(Box::new(move |_event: Event| {
        let query = source.value();
        shown_hint.set_text_content(matcher.hint(&query).as_deref());
        if let Err(e) = render(&doc, &list, &matcher.find_matches(&query)) {
            log::error!("Failed to render suggestions: {}", crate::js_text(&e));
        }
    }) as Box<dyn FnMut(Event)>);
    input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;
    on_input.forget();

    // Tab or ArrowRight accepts the hint.
    let shown_hint = hint.clone();
    let list = menu.clone();
    let target_input = input.clone();
    let on_key = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if !matches!(event.key().as_str(), "Tab" | "ArrowRight") {
            return;
        }
        let completion = shown_hint.text_content().unwrap_or_default();
        if completion.is_empty() {
            return;
        }
        event.prevent_default();
        target_input.set_value(&completion);
        shown_hint.set_text_content(None);
        list.set_inner_html("");
    }) as Box<dyn FnMut(KeyboardEvent)>);
    input.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    on_key.forget();

    // mousedown fires before the input loses focus.
    let list = menu.clone();
    let picked_hint = hint;
    let target_input = input.clone();
    let on_pick = Closure::wrap(Box::new(move |event: Event| {
        let item = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("li").ok().flatten());
        if let Some(item) = item {
            event.prevent_default();
            target_input.set_value(&item.text_content().unwrap_or_default());
            picked_hint.set_text_content(None);
            list.set_inner_html("");
        }
    }) as Box<dyn FnMut(Event)>);
    menu.add_event_listener_with_callback("mousedown", on_pick.as_ref().unchecked_ref())?;
    on_pick.forget();

    Ok(())
}

fn render(document: &Document, menu: &Element, suggestions: &[Suggestion]) -> Result<(), JsValue> {
    menu.set_inner_html("");
    for suggestion in suggestions {
        let item = document.create_element("li")?;
        let (before, matched, after) = suggestion.parts();
        item.append_child(&document.create_text_node(before))?;
        if !matched.is_empty() {
            let strong = document.create_element("strong")?;
            strong.set_text_content(Some(matched));
            item.append_child(&strong)?;
        }
        item.append_child(&document.create_text_node(after))?;
        menu.append_child(&item)?;
    }
    Ok(())
}
