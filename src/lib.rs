// Onboarding Forms - schema-driven employee onboarding form builder

// Field definitions, catalogs and the effective schema
pub mod schema;

// Custom field persistence
pub mod store;

// Rule interpreter and form validation
pub mod validation;

// Control descriptors for the form UI
pub mod render;

// Field authoring workflow
pub mod builder;

// Per-dialog employee form state
pub mod session;

// Employee records
pub mod models;

// HTTP surface
pub mod api;
pub mod app_state;

// Common utilities
pub mod config;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
