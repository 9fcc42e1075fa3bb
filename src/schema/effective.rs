// Effective schema - the merged, order-sorted field list that the renderer
// and the validator both consume

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use super::catalog::{resolve_group, FieldGroup, FIELD_GROUPS};
use super::field_definition::FieldDefinition;

/// Append `_2`, `_3`, ... to `base` until `is_taken` no longer matches
pub fn disambiguate(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    let mut suffix = 2u32;
    loop {
        let candidate = format!("{}_{}", base, suffix);
        if !is_taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Immutable snapshot of mandatory + custom fields.
///
/// Cloning is cheap; a render/validate cycle hands the same snapshot to both
/// sides so they can never disagree about a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveSchema {
    fields: Arc<Vec<FieldDefinition>>,
}

/// Fields of one catalog group, in display order
#[derive(Debug, Clone, Serialize)]
pub struct GroupSection {
    pub group: FieldGroup,
    pub fields: Vec<FieldDefinition>,
}

impl EffectiveSchema {
    /// Concatenate both sets, keep names unique and sort by `order`.
    ///
    /// The sort is stable, so ties keep mandatory-then-custom insertion order.
    pub fn merge(mandatory: &[FieldDefinition], custom: Vec<FieldDefinition>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut fields = Vec::with_capacity(mandatory.len() + custom.len());

        for field in mandatory.iter().cloned().chain(custom) {
            let mut field = field;
            if seen.contains(&field.name) {
                let renamed = disambiguate(&field.name, |candidate| seen.contains(candidate));
                info!(
                    "Field name '{}' collides in effective schema, exposing it as '{}'",
                    field.name, renamed
                );
                field.name = renamed;
            }
            seen.insert(field.name.clone());
            fields.push(field);
        }

        fields.sort_by_key(|field| field.order);
        Self {
            fields: Arc::new(fields),
        }
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// The fields a form shows. Rendering and validation both use this list,
    /// so a hidden field can never block a submit.
    pub fn visible_fields(&self) -> Vec<FieldDefinition> {
        self.fields
            .iter()
            .filter(|field| field.is_visible())
            .cloned()
            .collect()
    }

    pub fn fields_by_group(&self, group_id: &str) -> Vec<FieldDefinition> {
        self.fields
            .iter()
            .filter(|field| field.group.as_deref() == Some(group_id))
            .cloned()
            .collect()
    }

    pub fn required_field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.clone())
            .collect()
    }

    pub fn mandatory_fields(&self) -> Vec<&FieldDefinition> {
        self.fields.iter().filter(|field| field.is_core).collect()
    }

    pub fn custom_fields(&self) -> Vec<&FieldDefinition> {
        self.fields.iter().filter(|field| !field.is_core).collect()
    }

    /// Visible fields bucketed by catalog group, in catalog order.
    /// Empty groups are omitted.
    pub fn sections(&self) -> Vec<GroupSection> {
        FIELD_GROUPS
            .iter()
            .filter_map(|group| {
                let fields: Vec<FieldDefinition> = self
                    .fields
                    .iter()
                    .filter(|field| field.is_visible())
                    .filter(|field| resolve_group(field.group_id()).id == group.id)
                    .cloned()
                    .collect();
                (!fields.is_empty()).then(|| GroupSection {
                    group: group.clone(),
                    fields,
                })
            })
            .collect()
    }
}

/// Whole-form descriptor served to clients
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub fields: Vec<FieldDefinition>,
    pub groups: Vec<FieldGroup>,
}

impl FormSchema {
    pub fn from_effective(schema: &EffectiveSchema) -> Self {
        Self {
            id: "employee-onboarding-form",
            name: "Employee Onboarding Form",
            description: "Form for onboarding new employees to the organization",
            version: "2.0.0",
            fields: schema.fields().to_vec(),
            groups: FIELD_GROUPS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::{default_custom_fields, mandatory_fields};
    use crate::schema::field_definition::FieldType;

    #[test]
    fn test_merge_sorts_by_order() {
        let schema = EffectiveSchema::merge(mandatory_fields(), default_custom_fields());
        let orders: Vec<i32> = schema.fields().iter().map(|f| f.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let custom = vec![
            FieldDefinition::new("b", "B", FieldType::Text).order(1),
            FieldDefinition::new("a", "A", FieldType::Text).order(1),
        ];
        let schema = EffectiveSchema::merge(mandatory_fields(), custom);
        let names = schema.names();
        assert_eq!(&names[..3], &["firstName", "b", "a"]);
    }

    #[test]
    fn test_merge_renames_collisions() {
        let custom = vec![FieldDefinition::new("email", "Work Email", FieldType::Email).order(9)];
        let schema = EffectiveSchema::merge(mandatory_fields(), custom);
        assert_eq!(schema.len(), 5);
        assert!(schema.contains("email_2"));
        assert_eq!(schema.get("email").map(|f| f.is_core), Some(true));
    }

    #[test]
    fn test_disambiguate_skips_taken_suffixes() {
        let taken = ["role", "role_2"];
        assert_eq!(disambiguate("role", |c| taken.contains(&c)), "role_3");
        assert_eq!(disambiguate("team", |c| taken.contains(&c)), "team");
    }

    #[test]
    fn test_sections_fall_back_to_other() {
        let custom = vec![
            FieldDefinition::new("badge", "Badge", FieldType::Text)
                .order(9)
                .group("security"),
        ];
        let schema = EffectiveSchema::merge(mandatory_fields(), custom);
        let sections = schema.sections();
        let other = sections.iter().find(|s| s.group.id == "other").unwrap();
        assert_eq!(other.fields[0].name, "badge");
        assert_eq!(sections[0].group.id, "personal");
    }
}
