// Schema editor - the settings workflow boundary between the builder and the
// store. Core-field protection lives here, not in storage.

use tracing::{info, instrument};

use super::field_builder::{BuilderError, BuilderMode, FieldBuilder};
use crate::error::{AppError, AppResult};
use crate::schema::{is_mandatory_name, EffectiveSchema, FieldDefinition};
use crate::store::{FieldPatch, FieldSchemaStore};

pub struct SchemaEditor<'a> {
    store: &'a FieldSchemaStore,
}

impl<'a> SchemaEditor<'a> {
    pub fn new(store: &'a FieldSchemaStore) -> Self {
        Self { store }
    }

    pub fn schema(&self) -> EffectiveSchema {
        self.store.effective_schema()
    }

    /// Fresh builder for a new field
    pub fn begin_add(&self) -> FieldBuilder {
        FieldBuilder::new_field(self.store.effective_schema().len())
    }

    /// Builder for an existing custom field; core fields are rejected
    pub fn begin_edit(&self, name: &str) -> AppResult<FieldBuilder> {
        let schema = self.store.effective_schema();
        let field = schema
            .get(name)
            .ok_or_else(|| AppError::NotFound(format!("Field '{}' not found", name)))?;
        FieldBuilder::edit(field)
    }

    /// Validate the builder and hand its definition to the store
    #[instrument(skip(self, builder), fields(name = builder.name()))]
    pub fn save(&self, builder: &mut FieldBuilder) -> Result<FieldDefinition, BuilderError> {
        let schema = self.store.effective_schema();
        if !builder.validate(&schema.names()) {
            return Err(BuilderError::Invalid(builder.errors().clone()));
        }

        let definition = builder.build();
        match builder.mode() {
            BuilderMode::Create { .. } => {
                let stored = self.store.add(definition);
                info!("Added custom field '{}'", stored.name);
                Ok(stored)
            }
            BuilderMode::Edit { original } => {
                let patch = FieldPatch::replace_with(&definition);
                let updated = self
                    .store
                    .update(&original.name, patch)
                    .ok_or_else(|| BuilderError::Missing(original.name.clone()))?;
                info!("Updated custom field '{}'", updated.name);
                Ok(updated)
            }
        }
    }

    /// Remove a custom field. `Ok(false)` when nothing matched.
    #[instrument(skip(self))]
    pub fn delete(&self, name: &str) -> AppResult<bool> {
        if is_mandatory_name(name) {
            return Err(AppError::Forbidden("Core fields cannot be deleted".to_string()));
        }
        let removed = self.store.remove(name);
        if removed {
            info!("Deleted custom field '{}'", name);
        }
        Ok(removed)
    }

    pub fn reset(&self) {
        self.store.reset_to_defaults();
        info!("Custom fields reset to defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use crate::store::MemoryStorage;
    use std::sync::Arc;

    fn store() -> FieldSchemaStore {
        FieldSchemaStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_add_through_builder() {
        let store = store();
        let editor = SchemaEditor::new(&store);

        let mut builder = editor.begin_add();
        builder.set_label("Start City");
        builder.set_required(true);
        let stored = editor.save(&mut builder).unwrap();

        assert_eq!(stored.name, "start_city");
        assert_eq!(stored.order, 9);
        assert_eq!(editor.schema().len(), 9);
    }

    #[test]
    fn test_edit_keeps_name_and_position() {
        let store = store();
        let editor = SchemaEditor::new(&store);

        let mut builder = editor.begin_edit("managerName").unwrap();
        builder.set_label("Line Manager");
        builder.set_help_text("Direct reporting line");
        let updated = editor.save(&mut builder).unwrap();

        assert_eq!(updated.name, "managerName");
        assert_eq!(updated.label, "Line Manager");
        assert_eq!(updated.order, 7);
        assert_eq!(store.load().len(), 4);
    }

    #[test]
    fn test_core_fields_are_protected() {
        let store = store();
        let editor = SchemaEditor::new(&store);

        assert!(matches!(editor.begin_edit("email"), Err(AppError::Forbidden(_))));
        assert!(matches!(editor.delete("phone"), Err(AppError::Forbidden(_))));
        assert!(matches!(editor.begin_edit("nope"), Err(AppError::NotFound(_))));
        assert_eq!(editor.delete("nope").unwrap(), false);
    }

    #[test]
    fn test_invalid_builder_stores_nothing() {
        let store = store();
        let editor = SchemaEditor::new(&store);

        let mut builder = editor.begin_add();
        builder.set_field_type(FieldType::Select);
        match editor.save(&mut builder) {
            Err(BuilderError::Invalid(errors)) => {
                assert!(errors.label.is_some());
                assert!(errors.name.is_some());
                assert!(errors.options.is_some());
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(store.load().len(), 4);
    }

    #[test]
    fn test_edit_of_vanished_field() {
        let store = store();
        let editor = SchemaEditor::new(&store);

        let mut builder = editor.begin_edit("role").unwrap();
        assert!(editor.delete("role").unwrap());
        assert_eq!(
            editor.save(&mut builder),
            Err(BuilderError::Missing("role".to_string()))
        );
    }
}
