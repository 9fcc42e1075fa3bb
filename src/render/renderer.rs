// Schema-driven renderer - maps each field definition to a control descriptor

use serde::Serialize;

use crate::schema::{
    resolve_group, FieldDefinition, FieldErrors, FieldOption, FieldType, FieldValue, FormValues,
};

pub const SELECT_PLACEHOLDER: &str = "Select an option";
pub const TEXTAREA_ROWS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Text,
    Email,
    Tel,
}

/// Concrete control chosen for a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Control {
    #[serde(rename_all = "camelCase")]
    TextInput { input_mode: InputMode },
    DatePicker,
    NumberInput,
    TextArea { rows: u8 },
    Select {
        options: Vec<FieldOption>,
        placeholder: String,
    },
    Switch { checked: bool },
}

/// A value change emitted by a control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub name: String,
    pub value: FieldValue,
}

/// Everything a view needs to draw one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub name: String,
    pub label: String,
    pub control: Control,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub group: String,
}

impl RenderedField {
    /// Emit a change for this field; disabled controls emit nothing
    pub fn change(&self, value: impl Into<FieldValue>) -> Option<FieldChange> {
        if self.disabled {
            return None;
        }
        Some(FieldChange {
            name: self.name.clone(),
            value: value.into(),
        })
    }

    /// Flip a switch control
    pub fn toggle(&self) -> Option<FieldChange> {
        match self.control {
            Control::Switch { checked } => self.change(FieldValue::Bool(!checked)),
            _ => None,
        }
    }

    /// Error text if present, otherwise the help text
    pub fn caption(&self) -> Option<&str> {
        self.error.as_deref().or(self.help_text.as_deref())
    }
}

fn control_for(field: &FieldDefinition, value: Option<&FieldValue>) -> Control {
    match &field.field_type {
        FieldType::Text => Control::TextInput {
            input_mode: InputMode::Text,
        },
        FieldType::Email => Control::TextInput {
            input_mode: InputMode::Email,
        },
        FieldType::Phone => Control::TextInput {
            input_mode: InputMode::Tel,
        },
        FieldType::Date => Control::DatePicker,
        FieldType::Number => Control::NumberInput,
        FieldType::Textarea => Control::TextArea {
            rows: TEXTAREA_ROWS,
        },
        FieldType::Select => Control::Select {
            options: field.options.clone().unwrap_or_default(),
            placeholder: field
                .placeholder
                .clone()
                .filter(|placeholder| !placeholder.is_empty())
                .unwrap_or_else(|| SELECT_PLACEHOLDER.to_string()),
        },
        FieldType::Boolean => Control::Switch {
            checked: value
                .or(field.default_value.as_ref())
                .map(FieldValue::as_bool)
                .unwrap_or(false),
        },
        // Tags from newer data render as plain text rather than failing
        FieldType::Other(_) => Control::TextInput {
            input_mode: InputMode::Text,
        },
    }
}

/// Render one field. Pure: output depends only on the arguments.
pub fn render_field(
    field: &FieldDefinition,
    value: Option<&FieldValue>,
    error: Option<&str>,
    form_disabled: bool,
) -> RenderedField {
    let control = control_for(field, value);
    let value = match &control {
        Control::Switch { checked } => checked.to_string(),
        _ => value.map(FieldValue::to_display_string).unwrap_or_default(),
    };

    RenderedField {
        name: field.name.clone(),
        label: field.label.clone(),
        control,
        value,
        placeholder: field.placeholder.clone(),
        help_text: field.help_text.clone(),
        error: error.map(str::to_string),
        required: field.required,
        disabled: form_disabled || field.is_disabled(),
        group: field.group_id().to_string(),
    }
}

/// Fields of one group after rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSection {
    pub group_id: &'static str,
    pub title: &'static str,
    pub fields: Vec<RenderedField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedForm {
    pub fields: Vec<RenderedField>,
}

impl RenderedForm {
    pub fn field(&self, name: &str) -> Option<&RenderedField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields bucketed by group in first-seen order; unknown groups share
    /// the "other" section
    pub fn sections(&self) -> Vec<RenderedSection> {
        let mut sections: Vec<RenderedSection> = Vec::new();
        for field in &self.fields {
            let group = resolve_group(&field.group);
            match sections.iter_mut().find(|section| section.group_id == group.id) {
                Some(section) => section.fields.push(field.clone()),
                None => sections.push(RenderedSection {
                    group_id: group.id,
                    title: group.name,
                    fields: vec![field.clone()],
                }),
            }
        }
        sections
    }
}

/// Render every field of `fields` with its value and error
pub fn render_form(
    fields: &[FieldDefinition],
    values: &FormValues,
    errors: &FieldErrors,
    disabled: bool,
) -> RenderedForm {
    RenderedForm {
        fields: fields
            .iter()
            .map(|field| {
                render_field(
                    field,
                    values.get(&field.name),
                    errors.get(&field.name).map(String::as_str),
                    disabled,
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{default_custom_fields, mandatory_fields, EffectiveSchema};

    fn schema() -> EffectiveSchema {
        EffectiveSchema::merge(mandatory_fields(), default_custom_fields())
    }

    #[test]
    fn test_dispatch_by_type() {
        let form = render_form(schema().fields(), &FormValues::new(), &FieldErrors::new(), false);

        assert_eq!(
            form.field("phone").unwrap().control,
            Control::TextInput {
                input_mode: InputMode::Tel
            }
        );
        assert_eq!(form.field("joiningDate").unwrap().control, Control::DatePicker);
        match &form.field("role").unwrap().control {
            Control::Select {
                options,
                placeholder,
            } => {
                assert_eq!(options.len(), 8);
                assert_eq!(placeholder, "Select role");
            }
            other => panic!("unexpected control {:?}", other),
        }
    }

    #[test]
    fn test_switch_uses_default_when_unset() {
        let form = render_form(schema().fields(), &FormValues::new(), &FieldErrors::new(), false);
        let laptop = form.field("laptopRequired").unwrap();
        assert_eq!(laptop.control, Control::Switch { checked: true });
        assert_eq!(laptop.value, "true");

        let mut values = FormValues::new();
        values.insert("laptopRequired".into(), FieldValue::Bool(false));
        let form = render_form(schema().fields(), &values, &FieldErrors::new(), false);
        let laptop = form.field("laptopRequired").unwrap();
        assert_eq!(laptop.control, Control::Switch { checked: false });
        assert_eq!(
            laptop.toggle(),
            Some(FieldChange {
                name: "laptopRequired".into(),
                value: FieldValue::Bool(true)
            })
        );
    }

    #[test]
    fn test_unknown_type_falls_back_to_text() {
        let field = FieldDefinition::new("stars", "Stars", FieldType::from("rating"));
        let rendered = render_field(&field, None, None, false);
        assert_eq!(
            rendered.control,
            Control::TextInput {
                input_mode: InputMode::Text
            }
        );
        assert_eq!(rendered.value, "");
    }

    #[test]
    fn test_errors_and_disabled_flow_through() {
        let mut errors = FieldErrors::new();
        errors.insert("email".into(), "Email is required".into());
        let form = render_form(schema().fields(), &FormValues::new(), &errors, true);

        let email = form.field("email").unwrap();
        assert_eq!(email.caption(), Some("Email is required"));
        assert!(email.disabled);
        assert!(email.required);
        assert_eq!(email.change("x@y.z"), None);
    }

    #[test]
    fn test_sections_follow_field_order() {
        let form = render_form(schema().fields(), &FormValues::new(), &FieldErrors::new(), false);
        let ids: Vec<_> = form.sections().iter().map(|s| s.group_id).collect();
        assert_eq!(ids, vec!["personal", "contact", "employment", "equipment"]);
    }
}
