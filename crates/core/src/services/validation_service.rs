use serde::{Deserialize, Serialize};

/// The input `type` attributes the forms use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Number,
    Email,
    Password,
}

impl InputKind {
    /// Map an HTML `type` attribute; unknown types validate as text.
    pub fn from_html_type(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "number" => InputKind::Number,
            "email" => InputKind::Email,
            "password" => InputKind::Password,
            _ => InputKind::Text,
        }
    }
}

/// Constraint attributes of one input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldConstraints {
    pub kind: InputKind,
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Allowed increment from `min` (or zero); non-positive means "any".
    pub step: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

/// One input's name, current value and constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInput {
    pub name: String,
    pub value: String,
    pub constraints: FieldConstraints,
}

impl FieldInput {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        constraints: FieldConstraints,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            constraints,
        }
    }
}

/// A form at the moment the user tried to submit it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub fields: Vec<FieldInput>,
    /// Set after the first submit attempt; drives the invalid-field styling.
    pub was_validated: bool,
}

impl FormSnapshot {
    pub fn new(fields: Vec<FieldInput>) -> Self {
        Self {
            fields,
            was_validated: false,
        }
    }
}

/// Why a field is invalid. Mirrors the browser's `ValidityState` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Violation {
    ValueMissing,
    TypeMismatch,
    RangeUnderflow,
    RangeOverflow,
    StepMismatch,
    TooShort,
    TooLong,
}

impl Violation {
    pub fn message(self) -> &'static str {
        match self {
            Violation::ValueMissing => "Please fill out this field.",
            Violation::TypeMismatch => "Please enter a valid value.",
            Violation::RangeUnderflow => "Value is too small.",
            Violation::RangeOverflow => "Value is too large.",
            Violation::StepMismatch => "Please enter a valid increment.",
            Violation::TooShort => "Value is too short.",
            Violation::TooLong => "Value is too long.",
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub name: String,
    pub violation: Violation,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<FieldViolation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn for_field(&self, name: &str) -> Option<Violation> {
        self.violations
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.violation)
    }
}

/// Whether a submit event may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    Allow,
    /// Cancel the submit and stop propagation.
    Block(ValidationReport),
}

impl SubmitDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, SubmitDecision::Block(_))
    }
}

/// Client-side constraint checks, reported the way the browser would.
///
/// Pure logic, no DOM access.
#[derive(Debug, Default)]
pub struct FormValidator;

impl FormValidator {
    pub fn new() -> Self {
        Self
    }

    /// First violated constraint of one field, in browser precedence order.
    pub fn check_field(&self, field: &FieldInput) -> Option<Violation> {
        let c = &field.constraints;
        let value = field.value.as_str();

        if value.trim().is_empty() {
            return c.required.then_some(Violation::ValueMissing);
        }

        match c.kind {
            InputKind::Number => Self::check_number(value, c),
            InputKind::Email if !is_plausible_email(value) => Some(Violation::TypeMismatch),
            _ => Self::check_length(value, c),
        }
    }

    fn check_number(value: &str, c: &FieldConstraints) -> Option<Violation> {
        let number = match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => return Some(Violation::TypeMismatch),
        };
        if c.min.is_some_and(|min| number < min) {
            return Some(Violation::RangeUnderflow);
        }
        if c.max.is_some_and(|max| number > max) {
            return Some(Violation::RangeOverflow);
        }
        if let Some(step) = c.step.filter(|s| *s > 0.0) {
            let steps = (number - c.min.unwrap_or(0.0)) / step;
            if (steps - steps.round()).abs() > 1e-9 {
                return Some(Violation::StepMismatch);
            }
        }
        None
    }

    fn check_length(value: &str, c: &FieldConstraints) -> Option<Violation> {
        let len = value.chars().count();
        if c.min_length.is_some_and(|min| len < min) {
            return Some(Violation::TooShort);
        }
        if c.max_length.is_some_and(|max| len > max) {
            return Some(Violation::TooLong);
        }
        None
    }

    pub fn check(&self, form: &FormSnapshot) -> ValidationReport {
        ValidationReport {
            violations: form
                .fields
                .iter()
                .filter_map(|field| {
                    self.check_field(field).map(|violation| FieldViolation {
                        name: field.name.clone(),
                        violation,
                    })
                })
                .collect(),
        }
    }

    /// Decide a submit attempt. The form is marked validated either way.
    pub fn gate_submission(&self, form: &mut FormSnapshot) -> SubmitDecision {
        let report = self.check(form);
        form.was_validated = true;
        if report.is_valid() {
            SubmitDecision::Allow
        } else {
            SubmitDecision::Block(report)
        }
    }
}

fn is_plausible_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
