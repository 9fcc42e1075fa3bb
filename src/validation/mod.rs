// Validation module - rule interpreter and form validation

pub mod engine;
pub mod rules;

pub use engine::{validate_field, validate_form, FormValidator, ValidationReport};
pub use rules::{
    evaluate, init_pattern_cache, is_valid_email, is_valid_phone, pattern_cache, PatternCache,
    RuleOutcome,
};
