use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlFormElement, HtmlInputElement};

use trade_desk_core::services::validation_service::{
    FieldConstraints, FieldInput, FormSnapshot, FormValidator, InputKind, SubmitDecision,
};

/// Gate submission of every `form.{form_class}` on its field constraints.
pub fn bind_validation(
    document: &Document,
    form_class: &str,
    was_validated_class: &str,
) -> Result<(), JsValue> {
    let forms = document.query_selector_all(&format!("form.{form_class}"))?;
    for i in 0..forms.length() {
        let Some(form) = forms
            .item(i)
            .and_then(|n| n.dyn_into::<HtmlFormElement>().ok())
        else {
            continue;
        };
        bind_form(form, was_validated_class.to_string())?;
    }
    log::debug!("Bound validation to {} forms", forms.length());
    Ok(())
}

fn bind_form(form: HtmlFormElement, was_validated_class: String) -> Result<(), JsValue> {
    let validator = FormValidator::new();
    let source = form.clone();

    let on_submit = Closure::wrap(Box::new(move |event: Event| {
        let inputs = match collect_inputs(&source) {
            Ok(inputs) => inputs,
            Err(e) => {
                log::error!("Failed to read form inputs: {}", crate::js_text(&e));
                return;
            }
        };
        let mut snapshot = FormSnapshot::new(inputs.iter().map(snapshot_field).collect());

        let decision = validator.gate_submission(&mut snapshot);
        let report = match &decision {
            SubmitDecision::Allow => None,
            SubmitDecision::Block(report) => Some(report),
        };
        for input in &inputs {
            let message = report
                .and_then(|r| r.for_field(&input.name()))
                .map(|v| v.message())
                .unwrap_or("");
            input.set_custom_validity(message);
        }

        if decision.is_blocked() {
            event.prevent_default();
            event.stop_propagation();
        }
        if snapshot.was_validated {
            if let Err(e) = source.class_list().add_1(&was_validated_class) {
                log::error!("Failed to mark form validated: {}", crate::js_text(&e));
            }
        }
    }) as Box<dyn FnMut(Event)>);

    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();
    Ok(())
}

fn collect_inputs(form: &HtmlFormElement) -> Result<Vec<HtmlInputElement>, JsValue> {
    let nodes = form.query_selector_all("input[name]")?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|n| n.dyn_into::<HtmlInputElement>().ok())
        .collect())
}

fn snapshot_field(input: &HtmlInputElement) -> FieldInput {
    let constraints = FieldConstraints {
        kind: InputKind::from_html_type(&input.type_()),
        required: input.required(),
        min: parse_number(&input.min()),
        max: parse_number(&input.max()),
        step: parse_number(&input.step()),
        min_length: parse_length(input.min_length()),
        max_length: parse_length(input.max_length()),
    };
    FieldInput::new(input.name(), input.value(), constraints)
}

/// Numeric attribute value; empty, `any` and garbage all mean "unset".
fn parse_number(attr: &str) -> Option<f64> {
    attr.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// The DOM reports an absent length limit as -1.
fn parse_length(len: i32) -> Option<usize> {
    usize::try_from(len).ok()
}
