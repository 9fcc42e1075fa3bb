// Field Definition Model - the data shape shared by the store, renderer,
// validator and builder

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Values entered into a form, keyed by field name
pub type FormValues = BTreeMap<String, FieldValue>;

/// Per-field error text, keyed by field name
pub type FieldErrors = BTreeMap<String, String>;

/// Field types offered to the builder.
///
/// The set is closed; `Other` only exists so that a tag written by a newer
/// build survives a load/save cycle and still renders (as plain text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Email,
    Phone,
    Date,
    Number,
    Textarea,
    Select,
    Boolean,
    Other(String),
}

impl FieldType {
    /// Every known type, in catalog order
    pub const ALL: [FieldType; 8] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Date,
        FieldType::Number,
        FieldType::Select,
        FieldType::Textarea,
        FieldType::Boolean,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Boolean => "boolean",
            FieldType::Other(tag) => tag,
        }
    }

    /// Display label used by the builder's type picker
    pub fn display_label(&self) -> &str {
        match self {
            FieldType::Text => "Text",
            FieldType::Email => "Email",
            FieldType::Phone => "Phone",
            FieldType::Date => "Date",
            FieldType::Number => "Number",
            FieldType::Textarea => "Multi-line Text",
            FieldType::Select => "Dropdown",
            FieldType::Boolean => "Yes/No Toggle",
            FieldType::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldType::Other(_))
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => FieldType::Text,
            "email" => FieldType::Email,
            "phone" => FieldType::Phone,
            "date" => FieldType::Date,
            "number" => FieldType::Number,
            "textarea" => FieldType::Textarea,
            "select" => FieldType::Select,
            "boolean" => FieldType::Boolean,
            _ => FieldType::Other(tag),
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        FieldType::from(tag.to_string())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value held by one form field.
///
/// Variant order matters for untagged deserialization: JSON booleans and
/// numbers must not be captured as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Empty for validation purposes.
    ///
    /// Blank text and an unset toggle count as empty, so a required boolean
    /// field must be switched on. Numbers are never empty.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Bool(b) => !b,
            FieldValue::Number(n) => n.is_nan(),
        }
    }

    /// String form used by text controls and string-based rules
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            FieldValue::Number(n) => n.to_string(),
        }
    }

    /// Truthiness coercion used by toggle controls
    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
        }
    }

    /// Numeric reading of the value, if it has one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// Rule kinds understood by the validation engine.
///
/// As with `FieldType`, `Other` keeps a rule tag from a newer build intact;
/// the engine treats it as passing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    Required,
    Email,
    Phone,
    MinLength,
    MaxLength,
    Pattern,
    Min,
    Max,
    Other(String),
}

impl RuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Email => "email",
            RuleKind::Phone => "phone",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Pattern => "pattern",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::Other(tag) => tag,
        }
    }
}

impl From<String> for RuleKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "required" => RuleKind::Required,
            "email" => RuleKind::Email,
            "phone" => RuleKind::Phone,
            "minLength" => RuleKind::MinLength,
            "maxLength" => RuleKind::MaxLength,
            "pattern" => RuleKind::Pattern,
            "min" => RuleKind::Min,
            "max" => RuleKind::Max,
            _ => RuleKind::Other(tag),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// Parameter carried by a rule (numeric bound or regex source)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleParam {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RuleParam {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RuleParam::Number(n) => Some(*n),
            RuleParam::Text(s) => s.trim().parse().ok(),
            RuleParam::Bool(_) => None,
        }
    }

    pub fn as_source(&self) -> String {
        match self {
            RuleParam::Text(s) => s.clone(),
            RuleParam::Number(n) => n.to_string(),
            RuleParam::Bool(b) => b.to_string(),
        }
    }
}

/// One named check with its parameter and authored message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleParam>,
    pub message: String,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, value: Option<RuleParam>, message: &str) -> Self {
        Self {
            kind,
            value,
            message: message.to_string(),
        }
    }

    pub fn required(message: &str) -> Self {
        Self::new(RuleKind::Required, None, message)
    }

    pub fn email(message: &str) -> Self {
        Self::new(RuleKind::Email, None, message)
    }

    pub fn phone(message: &str) -> Self {
        Self::new(RuleKind::Phone, None, message)
    }

    pub fn min_length(length: usize, message: &str) -> Self {
        Self::new(RuleKind::MinLength, Some(RuleParam::Number(length as f64)), message)
    }

    pub fn max_length(length: usize, message: &str) -> Self {
        Self::new(RuleKind::MaxLength, Some(RuleParam::Number(length as f64)), message)
    }

    pub fn pattern(source: &str, message: &str) -> Self {
        Self::new(RuleKind::Pattern, Some(RuleParam::Text(source.to_string())), message)
    }

    pub fn min(bound: f64, message: &str) -> Self {
        Self::new(RuleKind::Min, Some(RuleParam::Number(bound)), message)
    }

    pub fn max(bound: f64, message: &str) -> Self {
        Self::new(RuleKind::Max, Some(RuleParam::Number(bound)), message)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One entry of a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

impl FieldOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            disabled: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.value.is_empty() && !self.label.is_empty()
    }
}

/// The unit of schema: everything needed to draw and check one form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(default)]
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub validations: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default)]
    pub is_core: bool,
}

impl FieldDefinition {
    pub fn new(name: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field_type,
            placeholder: None,
            default_value: None,
            required: false,
            validations: Vec::new(),
            options: None,
            order: 0,
            group: None,
            visible: None,
            disabled: None,
            help_text: None,
            is_core: false,
        }
    }

    /// Mark field as required, backed by a `required` rule with this message
    pub fn required(mut self, message: &str) -> Self {
        self.required = true;
        self.validations.insert(0, ValidationRule::required(message));
        self
    }

    /// Append a validation rule (evaluated in insertion order)
    pub fn validate(mut self, rule: ValidationRule) -> Self {
        self.validations.push(rule);
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn help_text(mut self, help_text: &str) -> Self {
        self.help_text = Some(help_text.to_string());
        self
    }

    pub fn options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Mark as one of the compiled-in mandatory fields
    pub fn core(mut self) -> Self {
        self.is_core = true;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled == Some(true)
    }

    /// Group id, with unset groups landing in the "other" bucket
    pub fn group_id(&self) -> &str {
        self.group.as_deref().unwrap_or(super::catalog::OTHER_GROUP_ID)
    }

    pub fn required_rule(&self) -> Option<&ValidationRule> {
        self.validations.iter().find(|rule| rule.kind == RuleKind::Required)
    }
}
