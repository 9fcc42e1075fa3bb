// Field Builder - guided add/edit of a single custom field definition

use serde::Serialize;
use std::fmt;

use super::slug::{is_valid_field_name, slugify};
use crate::error::{AppError, AppResult};
use crate::schema::{
    FieldDefinition, FieldOption, FieldType, FieldValue, ValidationRule, OTHER_GROUP_ID,
};

pub const MIN_SELECT_OPTIONS: usize = 2;

/// Builder-level problems, one slot per offending input.
/// Every check runs on each validation pass so all slots can be filled at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuilderErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl BuilderErrors {
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.name.is_none() && self.options.is_none()
    }

    /// (input, message) pairs for every reported problem
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("label", self.label.as_deref()),
            ("name", self.name.as_deref()),
            ("options", self.options.as_deref()),
        ]
        .into_iter()
        .filter_map(|(input, message)| message.map(|message| (input, message)))
        .collect()
    }
}

impl fmt::Display for BuilderErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .entries()
            .into_iter()
            .map(|(input, message)| format!("{}: {}", input, message))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Why a builder submit did not store anything
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderError {
    Invalid(BuilderErrors),
    /// The edited field disappeared from the store before submit
    Missing(String),
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::Invalid(errors) => write!(f, "Invalid field: {}", errors),
            BuilderError::Missing(name) => write!(f, "Field '{}' no longer exists", name),
        }
    }
}

impl std::error::Error for BuilderError {}

impl From<BuilderError> for AppError {
    fn from(err: BuilderError) -> Self {
        match err {
            BuilderError::Invalid(errors) => AppError::Validation(errors.to_string()),
            BuilderError::Missing(name) => AppError::NotFound(format!("Field '{}' not found", name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuilderMode {
    Create { existing_field_count: usize },
    Edit { original: FieldDefinition },
}

/// Editable state behind the "Add Field" / "Edit Field" dialog
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBuilder {
    mode: BuilderMode,
    name: String,
    label: String,
    field_type: FieldType,
    placeholder: String,
    help_text: String,
    group: String,
    required: bool,
    options: Vec<FieldOption>,
    errors: BuilderErrors,
}

impl FieldBuilder {
    /// Empty builder for a brand-new field
    pub fn new_field(existing_field_count: usize) -> Self {
        Self {
            mode: BuilderMode::Create {
                existing_field_count,
            },
            name: String::new(),
            label: String::new(),
            field_type: FieldType::Text,
            placeholder: String::new(),
            help_text: String::new(),
            group: OTHER_GROUP_ID.to_string(),
            required: false,
            options: Vec::new(),
            errors: BuilderErrors::default(),
        }
    }

    /// Builder pre-populated from an existing custom field.
    /// Core fields are refused before any state is created.
    pub fn edit(field: &FieldDefinition) -> AppResult<Self> {
        if field.is_core {
            return Err(AppError::Forbidden("Core fields cannot be edited".to_string()));
        }
        Ok(Self {
            mode: BuilderMode::Edit {
                original: field.clone(),
            },
            name: field.name.clone(),
            label: field.label.clone(),
            field_type: field.field_type.clone(),
            placeholder: field.placeholder.clone().unwrap_or_default(),
            help_text: field.help_text.clone().unwrap_or_default(),
            group: field.group_id().to_string(),
            required: field.required,
            options: field.options.clone().unwrap_or_default(),
            errors: BuilderErrors::default(),
        })
    }

    pub fn mode(&self) -> &BuilderMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, BuilderMode::Edit { .. })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn options(&self) -> &[FieldOption] {
        &self.options
    }

    pub fn errors(&self) -> &BuilderErrors {
        &self.errors
    }

    /// Set the label; while creating, the name follows it
    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
        if !self.is_editing() {
            self.name = slugify(label);
        }
    }

    /// Override the derived name. Frozen while editing; returns whether it applied.
    pub fn set_name(&mut self, name: &str) -> bool {
        if self.is_editing() {
            return false;
        }
        self.name = name.to_string();
        true
    }

    /// Frozen while editing; returns whether it applied
    pub fn set_field_type(&mut self, field_type: FieldType) -> bool {
        if self.is_editing() {
            return false;
        }
        self.field_type = field_type;
        true
    }

    pub fn set_placeholder(&mut self, placeholder: &str) {
        self.placeholder = placeholder.to_string();
    }

    pub fn set_help_text(&mut self, help_text: &str) {
        self.help_text = help_text.to_string();
    }

    pub fn set_group(&mut self, group: &str) {
        self.group = group.to_string();
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub fn add_option(&mut self) {
        self.options.push(FieldOption::new("", ""));
    }

    /// Relabel an option; its value is re-derived from the label
    pub fn set_option_label(&mut self, index: usize, label: &str) -> bool {
        match self.options.get_mut(index) {
            Some(option) => {
                option.label = label.to_string();
                option.value = slugify(label);
                true
            }
            None => false,
        }
    }

    pub fn remove_option(&mut self, index: usize) -> bool {
        if index < self.options.len() {
            self.options.remove(index);
            true
        } else {
            false
        }
    }

    /// Run every builder check and keep the result for display.
    ///
    /// `taken_names` are names already in the effective schema; they only
    /// matter while creating.
    pub fn validate(&mut self, taken_names: &[&str]) -> bool {
        let mut errors = BuilderErrors::default();

        if self.label.trim().is_empty() {
            errors.label = Some("Field label is required".to_string());
        }

        if self.name.trim().is_empty() {
            errors.name = Some("Field name is required".to_string());
        } else if !is_valid_field_name(&self.name) {
            errors.name = Some(
                "Name must start with a letter and contain only letters, numbers, and underscores"
                    .to_string(),
            );
        } else if !self.is_editing() && taken_names.contains(&self.name.as_str()) {
            errors.name = Some(format!("A field named '{}' already exists", self.name));
        }

        if self.field_type == FieldType::Select
            && self.options.iter().filter(|option| option.is_complete()).count()
                < MIN_SELECT_OPTIONS
        {
            errors.options = Some("Dropdown fields need at least 2 options".to_string());
        }

        let valid = errors.is_empty();
        self.errors = errors;
        valid
    }

    /// Assemble the definition this builder describes. Does not validate.
    pub fn build(&self) -> FieldDefinition {
        let label = self.label.trim().to_string();
        let mut field = FieldDefinition::new(&self.name, &label, self.field_type.clone());

        field.placeholder = Some(if self.placeholder.trim().is_empty() {
            format!("Enter {}", label.to_lowercase())
        } else {
            self.placeholder.clone()
        });
        field.help_text = Some(self.help_text.clone()).filter(|text| !text.trim().is_empty());
        field.group = Some(self.group.clone()).filter(|group| !group.is_empty());
        field.required = self.required;
        if self.required {
            field.validations = vec![ValidationRule::required(&format!("{} is required", label))];
        }

        if self.field_type == FieldType::Select {
            field.options = Some(
                self.options
                    .iter()
                    .filter(|option| option.is_complete())
                    .cloned()
                    .collect(),
            );
        }

        match &self.mode {
            BuilderMode::Create {
                existing_field_count,
            } => {
                field.order = *existing_field_count as i32 + 1;
                if self.field_type == FieldType::Boolean {
                    field.default_value = Some(FieldValue::Bool(false));
                }
            }
            BuilderMode::Edit { original } => {
                field.order = original.order;
                field.visible = original.visible;
                field.disabled = original.disabled;
                if self.field_type == FieldType::Boolean {
                    let kept = match &original.default_value {
                        Some(FieldValue::Bool(value)) => *value,
                        _ => false,
                    };
                    field.default_value = Some(FieldValue::Bool(kept));
                } else {
                    field.default_value = original.default_value.clone();
                }
                if self.field_type != FieldType::Select {
                    field.options = original.options.clone();
                }
            }
        }

        field.is_core = false;
        field
    }
}
