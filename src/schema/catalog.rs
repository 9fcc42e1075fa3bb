// Compiled-in catalogs: field types, groups, the mandatory field set and the
// built-in default custom set

use once_cell::sync::Lazy;
use serde::Serialize;

use super::field_definition::{
    FieldDefinition, FieldOption, FieldType, FieldValue, ValidationRule,
};

pub const OTHER_GROUP_ID: &str = "other";

/// One entry of the group catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGroup {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub order: u32,
}

pub static FIELD_GROUPS: [FieldGroup; 5] = [
    FieldGroup {
        id: "personal",
        name: "Personal Information",
        description: "Basic personal details",
        order: 1,
    },
    FieldGroup {
        id: "contact",
        name: "Contact Details",
        description: "Contact information",
        order: 2,
    },
    FieldGroup {
        id: "employment",
        name: "Employment Details",
        description: "Job-related information",
        order: 3,
    },
    FieldGroup {
        id: "equipment",
        name: "Equipment & Assets",
        description: "Required equipment",
        order: 4,
    },
    FieldGroup {
        id: OTHER_GROUP_ID,
        name: "Other Information",
        description: "Additional information",
        order: 5,
    },
];

/// Resolve a group id against the catalog, falling back to the "other" bucket
pub fn resolve_group(group_id: &str) -> &'static FieldGroup {
    FIELD_GROUPS
        .iter()
        .find(|group| group.id == group_id)
        .unwrap_or(&FIELD_GROUPS[FIELD_GROUPS.len() - 1])
}

pub fn group_display_name(group_id: &str) -> &'static str {
    resolve_group(group_id).name
}

/// (type, display label) pair offered to the builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldTypeEntry {
    pub value: String,
    pub label: String,
}

pub fn field_type_catalog() -> Vec<FieldTypeEntry> {
    FieldType::ALL
        .iter()
        .map(|field_type| FieldTypeEntry {
            value: field_type.as_str().to_string(),
            label: field_type.display_label().to_string(),
        })
        .collect()
}

static MANDATORY_FIELDS: Lazy<Vec<FieldDefinition>> = Lazy::new(|| {
    vec![
        FieldDefinition::new("firstName", "First Name", FieldType::Text)
            .placeholder("Enter first name")
            .required("First name is required")
            .validate(ValidationRule::min_length(
                2,
                "First name must be at least 2 characters",
            ))
            .order(1)
            .group("personal")
            .core(),
        FieldDefinition::new("lastName", "Last Name", FieldType::Text)
            .placeholder("Enter last name")
            .required("Last name is required")
            .validate(ValidationRule::min_length(
                2,
                "Last name must be at least 2 characters",
            ))
            .order(2)
            .group("personal")
            .core(),
        FieldDefinition::new("email", "Email Address", FieldType::Email)
            .placeholder("Enter email address")
            .required("Email is required")
            .validate(ValidationRule::email("Please enter a valid email address"))
            .order(3)
            .group("contact")
            .core(),
        FieldDefinition::new("phone", "Phone Number", FieldType::Phone)
            .placeholder("Enter phone number")
            .required("Phone number is required")
            .validate(ValidationRule::pattern(
                "^[+]?[0-9]{10,15}$",
                "Phone must be 10-15 digits",
            ))
            .order(4)
            .group("contact")
            .core(),
    ]
});

/// The four fixed fields every employee record carries
pub fn mandatory_fields() -> &'static [FieldDefinition] {
    &MANDATORY_FIELDS
}

pub fn is_mandatory_name(name: &str) -> bool {
    MANDATORY_FIELDS.iter().any(|field| field.name == name)
}

/// Built-in custom set used on first load and by reset
pub fn default_custom_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("joiningDate", "Joining Date", FieldType::Date)
            .placeholder("Select joining date")
            .order(5)
            .group("employment")
            .help_text("Expected date of joining"),
        FieldDefinition::new("role", "Role", FieldType::Select)
            .placeholder("Select role")
            .order(6)
            .group("employment")
            .options(vec![
                FieldOption::new("engineer", "Software Engineer"),
                FieldOption::new("designer", "UI/UX Designer"),
                FieldOption::new("manager", "Project Manager"),
                FieldOption::new("analyst", "Business Analyst"),
                FieldOption::new("hr", "HR Executive"),
                FieldOption::new("marketing", "Marketing Specialist"),
                FieldOption::new("sales", "Sales Representative"),
                FieldOption::new("other", "Other"),
            ]),
        FieldDefinition::new("managerName", "Manager Name", FieldType::Text)
            .placeholder("Enter reporting manager name")
            .order(7)
            .group("employment"),
        FieldDefinition::new("laptopRequired", "Laptop Required", FieldType::Boolean)
            .default_value(FieldValue::Bool(true))
            .order(8)
            .group("equipment")
            .help_text("Does the employee need a laptop?"),
    ]
}
