// Builder module - field authoring workflow

pub mod editor;
pub mod field_builder;
pub mod slug;

pub use editor::SchemaEditor;
pub use field_builder::{BuilderError, BuilderErrors, BuilderMode, FieldBuilder, MIN_SELECT_OPTIONS};
pub use slug::{is_valid_field_name, slugify};
