// Store module - persistence collaborator and the custom field catalog

pub mod field_store;
pub mod storage;

pub use field_store::{FieldPatch, FieldSchemaStore, STORAGE_KEY};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
