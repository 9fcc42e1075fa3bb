// Employee form session - ties one effective schema snapshot to the values,
// errors and submit of a single create/edit dialog

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Employee, EmployeeInput};
use crate::render::{render_form, FieldChange, RenderedForm};
use crate::schema::{EffectiveSchema, FieldErrors, FieldType, FieldValue, FormValues};
use crate::store::FieldSchemaStore;
use crate::validation::FormValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Create,
    Edit,
    View,
    Delete,
}

impl FormMode {
    /// Modes that show the editable form
    pub fn shows_form(self) -> bool {
        matches!(self, FormMode::Create | FormMode::Edit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalState {
    pub is_open: bool,
    pub mode: FormMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
}

impl ModalState {
    pub fn closed() -> Self {
        Self {
            is_open: false,
            mode: FormMode::Create,
            employee_id: None,
        }
    }

    pub fn open(mode: FormMode, employee_id: Option<String>) -> Self {
        Self {
            is_open: true,
            mode,
            employee_id,
        }
    }
}

/// Edge-triggered open detector: fires once per closed -> open transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenEdge {
    was_open: bool,
}

impl OpenEdge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, is_open: bool) -> bool {
        let opened = is_open && !self.was_open;
        self.was_open = is_open;
        opened
    }
}

/// What a successful submit asks the employee backend to do
#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeSubmission {
    Create(EmployeeInput),
    Update { id: String, input: EmployeeInput },
}

/// Initial values for a new record, taken from the schema
pub fn initial_values(schema: &EffectiveSchema) -> FormValues {
    schema
        .fields()
        .iter()
        .map(|field| {
            let value = match (&field.default_value, &field.field_type) {
                (Some(default), _) => default.clone(),
                (None, FieldType::Boolean) => FieldValue::Bool(true),
                (None, _) => FieldValue::text(""),
            };
            (field.name.clone(), value)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct EmployeeFormSession {
    edge: OpenEdge,
    mode: Option<FormMode>,
    editing_id: Option<String>,
    schema: EffectiveSchema,
    values: FormValues,
    validator: FormValidator,
}

impl EmployeeFormSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current modal state. On the open edge the session snapshots
    /// the schema, seeds values and clears errors; otherwise it is a no-op.
    /// Returns whether a reset happened.
    pub fn observe(
        &mut self,
        modal: &ModalState,
        store: &FieldSchemaStore,
        selected: Option<&Employee>,
    ) -> bool {
        if !self.edge.observe(modal.is_open) {
            if !modal.is_open {
                self.mode = None;
            }
            return false;
        }
        if !modal.mode.shows_form() {
            self.mode = None;
            return false;
        }

        self.schema = store.effective_schema();
        self.values = match (modal.mode, selected) {
            (FormMode::Edit, Some(employee)) => {
                self.editing_id = Some(employee.id.clone());
                employee.form_values()
            }
            _ => {
                self.editing_id = None;
                initial_values(&self.schema)
            }
        };
        self.mode = Some(modal.mode);
        self.validator.clear_all_errors();
        debug!(fields = self.schema.len(), mode = ?modal.mode, "Employee form opened");
        true
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }

    pub fn is_edit(&self) -> bool {
        self.mode == Some(FormMode::Edit) && self.editing_id.is_some()
    }

    pub fn schema(&self) -> &EffectiveSchema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        self.validator.errors()
    }

    /// Record a value. Any displayed errors are cleared once the user edits
    /// a field that had one.
    pub fn set_value(&mut self, name: &str, value: FieldValue) {
        self.values.insert(name.to_string(), value);
        if self.validator.error(name).is_some() {
            self.validator.clear_all_errors();
        }
    }

    pub fn apply(&mut self, change: FieldChange) {
        self.set_value(&change.name, change.value);
    }

    pub fn render(&self, disabled: bool) -> RenderedForm {
        render_form(
            &self.schema.visible_fields(),
            &self.values,
            self.validator.errors(),
            disabled,
        )
    }

    /// Validate against the snapshot taken at open and build the payload
    pub fn submit(&mut self) -> Result<EmployeeSubmission, FieldErrors> {
        if !self
            .validator
            .validate_form(&self.schema.visible_fields(), &self.values)
        {
            return Err(self.validator.errors().clone());
        }

        let input = EmployeeInput::from_form_values(&self.values);
        Ok(match (&self.mode, &self.editing_id) {
            (Some(FormMode::Edit), Some(id)) => EmployeeSubmission::Update {
                id: id.clone(),
                input,
            },
            _ => EmployeeSubmission::Create(input),
        })
    }
}
