// Validation engine - field and form level checks driven by the schema

use tracing::debug;

use super::rules::{evaluate, RuleOutcome};
use crate::schema::{
    FieldDefinition, FieldErrors, FieldType, FieldValue, FormValues, RuleKind, ValidationRule,
};

fn is_empty(value: Option<&FieldValue>) -> bool {
    value.map(FieldValue::is_blank).unwrap_or(true)
}

/// Checks a field's type implies when no authored rule already covers them.
/// They run after the authored rules.
fn implied_rules(field: &FieldDefinition) -> Vec<ValidationRule> {
    let has = |kinds: &[RuleKind]| field.validations.iter().any(|rule| kinds.contains(&rule.kind));

    match field.field_type {
        FieldType::Email if !has(&[RuleKind::Email, RuleKind::Pattern]) => {
            vec![ValidationRule::email("Please enter a valid email address")]
        }
        FieldType::Phone if !has(&[RuleKind::Phone, RuleKind::Pattern]) => {
            vec![ValidationRule::phone("Please enter a valid phone number")]
        }
        _ => Vec::new(),
    }
}

/// Validate one value against its field definition.
///
/// Returns the message of the first failing check, or `None`.
pub fn validate_field(field: &FieldDefinition, value: Option<&FieldValue>) -> Option<String> {
    if is_empty(value) {
        if !field.required {
            return None;
        }
        let message = field
            .required_rule()
            .map(|rule| rule.message.clone())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("{} is required", field.label));
        return Some(message);
    }

    let implied = implied_rules(field);
    let failed = field
        .validations
        .iter()
        .chain(implied.iter())
        .find(|rule| evaluate(rule, value) == RuleOutcome::Fail);
    if let Some(rule) = failed {
        return Some(rule.message.clone());
    }

    if field.field_type == FieldType::Number && value.and_then(FieldValue::as_number).is_none() {
        return Some(format!("{} must be a number", field.label));
    }
    None
}

/// Outcome of validating a whole form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: FieldErrors,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }
}

/// Validate every field of `fields` against `data`
pub fn validate_form(fields: &[FieldDefinition], data: &FormValues) -> ValidationReport {
    let errors: FieldErrors = fields
        .iter()
        .filter_map(|field| {
            validate_field(field, data.get(&field.name)).map(|message| (field.name.clone(), message))
        })
        .collect();

    debug!(checked = fields.len(), failed = errors.len(), "Validated form");
    ValidationReport { errors }
}

/// Owns the error map a form currently displays.
///
/// `validate_form` replaces the map wholesale; the other methods edit it.
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    errors: FieldErrors,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn validate_field(&self, field: &FieldDefinition, value: Option<&FieldValue>) -> Option<String> {
        validate_field(field, value)
    }

    pub fn validate_form(&mut self, fields: &[FieldDefinition], data: &FormValues) -> bool {
        let report = validate_form(fields, data);
        let valid = report.is_valid();
        self.errors = report.errors;
        valid
    }

    pub fn clear_field_error(&mut self, name: &str) {
        self.errors.remove(name);
    }

    pub fn clear_all_errors(&mut self) {
        self.errors.clear();
    }

    pub fn set_field_error(&mut self, name: &str, message: &str) {
        self.errors.insert(name.to_string(), message.to_string());
    }
}
