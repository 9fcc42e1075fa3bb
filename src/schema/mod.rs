// Schema module - field definitions, catalogs and the effective schema

pub mod catalog;
pub mod effective;
pub mod field_definition;

pub use catalog::{
    default_custom_fields, field_type_catalog, group_display_name, is_mandatory_name,
    mandatory_fields, resolve_group, FieldGroup, FieldTypeEntry, FIELD_GROUPS, OTHER_GROUP_ID,
};
pub use effective::{disambiguate, EffectiveSchema, FormSchema, GroupSection};
pub use field_definition::{
    FieldDefinition, FieldErrors, FieldOption, FieldType, FieldValue, FormValues, RuleKind,
    RuleParam, ValidationRule,
};
