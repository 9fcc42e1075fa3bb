// Employee records as exchanged with the employee backend

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{FieldValue, FormValues};

/// Names that map to dedicated employee columns; everything else travels in
/// `additional_fields`
pub const KNOWN_FIELD_NAMES: [&str; 8] = [
    "firstName",
    "lastName",
    "email",
    "phone",
    "joiningDate",
    "role",
    "managerName",
    "laptopRequired",
];

pub fn is_known_field(name: &str) -> bool {
    KNOWN_FIELD_NAMES.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laptop_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_fields: Option<FormValues>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Values used to seed the edit form.
    ///
    /// Additional fields are copied verbatim, including ones whose field has
    /// since been removed from the schema, so they survive a re-submit.
    pub fn form_values(&self) -> FormValues {
        let mut values = FormValues::new();
        values.insert("firstName".into(), FieldValue::text(&self.first_name));
        values.insert("lastName".into(), FieldValue::text(&self.last_name));
        values.insert("email".into(), FieldValue::text(&self.email));
        values.insert("phone".into(), FieldValue::text(&self.phone));
        values.insert(
            "joiningDate".into(),
            FieldValue::Text(format_date_for_input(self.joining_date.as_deref())),
        );
        values.insert(
            "role".into(),
            FieldValue::text(self.role.clone().unwrap_or_default()),
        );
        values.insert(
            "managerName".into(),
            FieldValue::text(self.manager_name.clone().unwrap_or_default()),
        );
        values.insert(
            "laptopRequired".into(),
            FieldValue::Bool(self.laptop_required.unwrap_or(true)),
        );

        if let Some(additional) = &self.additional_fields {
            for (name, value) in additional {
                values.insert(name.clone(), value.clone());
            }
        }
        values
    }
}

/// Payload for creating or updating an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    pub laptop_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_fields: Option<FormValues>,
}

fn text_of(values: &FormValues, name: &str) -> String {
    values
        .get(name)
        .map(FieldValue::to_display_string)
        .unwrap_or_default()
}

fn optional_text_of(values: &FormValues, name: &str) -> Option<String> {
    values
        .get(name)
        .filter(|value| value.as_bool())
        .map(FieldValue::to_display_string)
}

impl EmployeeInput {
    /// Split a validated value map into dedicated columns and additional fields
    pub fn from_form_values(values: &FormValues) -> Self {
        let additional: FormValues = values
            .iter()
            .filter(|(name, _)| !is_known_field(name))
            .filter(|(_, value)| !matches!(value, FieldValue::Text(text) if text.is_empty()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Self {
            first_name: text_of(values, "firstName"),
            last_name: text_of(values, "lastName"),
            email: text_of(values, "email"),
            phone: text_of(values, "phone"),
            joining_date: optional_text_of(values, "joiningDate"),
            role: optional_text_of(values, "role"),
            manager_name: optional_text_of(values, "managerName"),
            laptop_required: values
                .get("laptopRequired")
                .map(FieldValue::as_bool)
                .unwrap_or(false),
            additional_fields: (!additional.is_empty()).then_some(additional),
        }
    }
}

/// Normalize a stored date or timestamp to `YYYY-MM-DD`; empty when unparseable
pub fn format_date_for_input(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return String::new(),
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
