pub mod alert_service;
pub mod stepper_service;
pub mod typeahead_service;
pub mod validation_service;
