// Field Schema Store - owns the custom field catalog and merges it with the
// compiled-in mandatory set

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::storage::KeyValueStorage;
use crate::schema::{
    default_custom_fields, disambiguate, is_mandatory_name, mandatory_fields, EffectiveSchema,
    FieldDefinition, FieldOption, FieldType, FieldValue, ValidationRule,
};

/// Storage key holding the serialized custom field list
pub const STORAGE_KEY: &str = "onboarding_custom_fields";

/// Rename stored fields whose names collide with a mandatory field or an
/// earlier custom field, the same way `add` would have. Returns whether any
/// name changed.
fn repair_names(fields: &mut [FieldDefinition]) -> bool {
    let mut seen: HashSet<String> = mandatory_fields()
        .iter()
        .map(|field| field.name.clone())
        .collect();
    let mut changed = false;

    for field in fields.iter_mut() {
        if seen.contains(&field.name) {
            let renamed = disambiguate(&field.name, |candidate| seen.contains(candidate));
            warn!("Stored field name '{}' collides, renaming to '{}'", field.name, renamed);
            field.name = renamed;
            changed = true;
        }
        seen.insert(field.name.clone());
    }
    changed
}

/// Partial update for a stored custom field.
///
/// `None` leaves a property untouched. For optional properties the inner
/// `Option` is the new value, so `Some(None)` clears it. Name and core flag
/// are not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub field_type: Option<FieldType>,
    pub placeholder: Option<Option<String>>,
    pub default_value: Option<Option<FieldValue>>,
    pub required: Option<bool>,
    pub validations: Option<Vec<ValidationRule>>,
    pub options: Option<Option<Vec<FieldOption>>>,
    pub order: Option<i32>,
    pub group: Option<Option<String>>,
    pub visible: Option<Option<bool>>,
    pub disabled: Option<Option<bool>>,
    pub help_text: Option<Option<String>>,
}

impl FieldPatch {
    /// Patch that overwrites every patchable property with `definition`'s
    pub fn replace_with(definition: &FieldDefinition) -> Self {
        Self {
            label: Some(definition.label.clone()),
            field_type: Some(definition.field_type.clone()),
            placeholder: Some(definition.placeholder.clone()),
            default_value: Some(definition.default_value.clone()),
            required: Some(definition.required),
            validations: Some(definition.validations.clone()),
            options: Some(definition.options.clone()),
            order: Some(definition.order),
            group: Some(definition.group.clone()),
            visible: Some(definition.visible),
            disabled: Some(definition.disabled),
            help_text: Some(definition.help_text.clone()),
        }
    }

    pub fn apply(self, field: &mut FieldDefinition) {
        if let Some(label) = self.label {
            field.label = label;
        }
        if let Some(field_type) = self.field_type {
            field.field_type = field_type;
        }
        if let Some(placeholder) = self.placeholder {
            field.placeholder = placeholder;
        }
        if let Some(default_value) = self.default_value {
            field.default_value = default_value;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(validations) = self.validations {
            field.validations = validations;
        }
        if let Some(options) = self.options {
            field.options = options;
        }
        if let Some(order) = self.order {
            field.order = order;
        }
        if let Some(group) = self.group {
            field.group = group;
        }
        if let Some(visible) = self.visible {
            field.visible = visible;
        }
        if let Some(disabled) = self.disabled {
            field.disabled = disabled;
        }
        if let Some(help_text) = self.help_text {
            field.help_text = help_text;
        }
    }
}

/// Custom field catalog persisted through a [`KeyValueStorage`].
///
/// Reads never fail: missing or corrupt data yields the built-in defaults.
/// Writes never fail either; a storage error is logged and remembered in
/// [`FieldSchemaStore::persistence_degraded`].
pub struct FieldSchemaStore {
    storage: Arc<dyn KeyValueStorage>,
    degraded: AtomicBool,
}

impl std::fmt::Debug for FieldSchemaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSchemaStore")
            .field("key", &STORAGE_KEY)
            .field("degraded", &self.persistence_degraded())
            .finish()
    }
}

impl FieldSchemaStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            degraded: AtomicBool::new(false),
        }
    }

    /// True while the most recent write attempt failed
    pub fn persistence_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Current custom fields, in stored order
    #[instrument(skip(self))]
    pub fn load(&self) -> Vec<FieldDefinition> {
        match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<FieldDefinition>>(&raw) {
                Ok(mut fields) => {
                    if repair_names(&mut fields) {
                        self.save(&fields);
                    }
                    fields
                }
                Err(err) => {
                    warn!("Stored custom fields are unreadable, using defaults: {}", err);
                    default_custom_fields()
                }
            },
            Ok(None) => {
                info!("No stored custom fields, initializing with defaults");
                let defaults = default_custom_fields();
                self.save(&defaults);
                defaults
            }
            Err(err) => {
                warn!("Custom field storage unavailable, using defaults: {}", err);
                default_custom_fields()
            }
        }
    }

    /// Replace the persisted custom field list
    #[instrument(skip(self, fields), fields(count = fields.len()))]
    pub fn save(&self, fields: &[FieldDefinition]) {
        let result = serde_json::to_string(fields)
            .map_err(crate::error::AppError::from)
            .and_then(|raw| self.storage.set(STORAGE_KEY, &raw));

        match result {
            Ok(()) => self.degraded.store(false, Ordering::Relaxed),
            Err(err) => {
                error!("Failed to save custom fields: {}", err);
                self.degraded.store(true, Ordering::Relaxed);
            }
        }
    }

    /// Mandatory fields followed by the custom set, sorted by `order`
    pub fn effective_schema(&self) -> EffectiveSchema {
        EffectiveSchema::merge(mandatory_fields(), self.load())
    }

    /// Store a new custom field and return it as stored.
    ///
    /// A missing name is generated; a name already used by a mandatory or
    /// custom field gets a numeric suffix instead of overwriting.
    #[instrument(skip(self, definition), fields(name = %definition.name))]
    pub fn add(&self, definition: FieldDefinition) -> FieldDefinition {
        let mut fields = self.load();
        let mut field = definition;
        field.is_core = false;

        if field.name.trim().is_empty() {
            field.name = format!("custom_{}", chrono::Utc::now().timestamp_millis());
        }

        let requested = field.name.clone();
        field.name = disambiguate(&requested, |candidate| {
            is_mandatory_name(candidate) || fields.iter().any(|f| f.name == candidate)
        });
        if field.name != requested {
            info!("Field name '{}' is taken, storing as '{}'", requested, field.name);
        }

        fields.push(field.clone());
        self.save(&fields);
        field
    }

    /// Apply `patch` to the custom field named `name`; `None` if no such field
    #[instrument(skip(self, patch))]
    pub fn update(&self, name: &str, patch: FieldPatch) -> Option<FieldDefinition> {
        let mut fields = self.load();
        let field = fields.iter_mut().find(|field| field.name == name)?;
        patch.apply(field);
        let updated = field.clone();
        self.save(&fields);
        Some(updated)
    }

    /// Drop the custom field named `name`; reports whether anything was removed
    #[instrument(skip(self))]
    pub fn remove(&self, name: &str) -> bool {
        let fields = self.load();
        let before = fields.len();
        let remaining: Vec<FieldDefinition> =
            fields.into_iter().filter(|field| field.name != name).collect();

        if remaining.len() == before {
            return false;
        }
        self.save(&remaining);
        true
    }

    #[instrument(skip(self))]
    pub fn reset_to_defaults(&self) {
        self.save(&default_custom_fields());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::store::storage::MemoryStorage;

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::Storage("unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(AppError::Storage("quota exceeded".to_string()))
        }
    }

    fn memory_store() -> (Arc<MemoryStorage>, FieldSchemaStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = FieldSchemaStore::new(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_first_load_initializes_storage() {
        let (storage, store) = memory_store();
        let fields = store.load();
        assert_eq!(fields, default_custom_fields());
        assert!(storage.get(STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_corrupt_data_falls_back_without_writing() {
        let (storage, store) = memory_store();
        storage.set(STORAGE_KEY, "{not json").unwrap();

        assert_eq!(store.load(), default_custom_fields());
        assert_eq!(storage.get(STORAGE_KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_broken_storage_never_blocks() {
        let store = FieldSchemaStore::new(Arc::new(BrokenStorage));

        assert_eq!(store.load(), default_custom_fields());
        let stored = store.add(FieldDefinition::new("", "Badge", FieldType::Text));
        assert!(stored.name.starts_with("custom_"));
        assert!(store.persistence_degraded());
        assert_eq!(store.effective_schema().len(), 8);
    }

    #[test]
    fn test_update_and_remove_report_no_match() {
        let (_, store) = memory_store();
        assert!(store.update("missing", FieldPatch::default()).is_none());
        assert!(!store.remove("missing"));
        assert!(!store.remove("firstName"));
    }

    #[test]
    fn test_update_patches_in_place() {
        let (_, store) = memory_store();
        let patch = FieldPatch {
            label: Some("Reporting Manager".to_string()),
            help_text: Some(Some("Who they report to".to_string())),
            ..FieldPatch::default()
        };
        let updated = store.update("managerName", patch).unwrap();
        assert_eq!(updated.label, "Reporting Manager");
        assert_eq!(updated.placeholder.as_deref(), Some("Enter reporting manager name"));

        let position = store
            .load()
            .iter()
            .position(|field| field.name == "managerName");
        assert_eq!(position, Some(2));
    }

    #[test]
    fn test_add_suffixes_custom_collision() {
        let (_, store) = memory_store();
        let stored = store.add(FieldDefinition::new("role", "Role", FieldType::Text));
        assert_eq!(stored.name, "role_2");
        assert!(!stored.is_core);
    }

    #[test]
    fn test_colliding_stored_names_are_repaired() {
        let (storage, store) = memory_store();
        storage
            .set(
                STORAGE_KEY,
                r#"[{"name":"email","label":"Work Email","type":"email","order":9},
                    {"name":"badge","label":"Badge","type":"text","order":10},
                    {"name":"badge","label":"Badge Two","type":"text","order":11}]"#,
            )
            .unwrap();

        let names: Vec<String> = store.load().into_iter().map(|field| field.name).collect();
        assert_eq!(names, vec!["email_2", "badge", "badge_2"]);
        assert!(storage.get(STORAGE_KEY).unwrap().unwrap().contains("email_2"));

        assert!(store.effective_schema().contains("email_2"));
        let patch = FieldPatch {
            label: Some("Personal Email".to_string()),
            ..FieldPatch::default()
        };
        assert_eq!(store.update("email_2", patch).unwrap().label, "Personal Email");
        assert!(store.remove("badge_2"));
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn test_recovered_write_clears_degraded_flag() {
        let (_, store) = memory_store();
        store.reset_to_defaults();
        assert!(!store.persistence_degraded());
    }
}
