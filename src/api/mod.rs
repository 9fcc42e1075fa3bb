// HTTP surface - schema administration and form evaluation endpoints

pub mod envelope;
pub mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::app_state::AppState;

pub use envelope::{ApiErrorBody, ApiResponse, FieldError};
pub use handlers::FieldDraft;

/// Routes for schema administration and form evaluation
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Schema reads
        .route("/api/schema", get(handlers::get_form_schema))
        .route("/api/schema/catalog", get(handlers::get_catalog))
        .route("/api/schema/groups/{group_id}", get(handlers::get_group_fields))
        // Field builder
        .route(
            "/api/schema/fields",
            get(handlers::get_fields).post(handlers::create_field),
        )
        .route(
            "/api/schema/fields/{name}",
            put(handlers::update_field).delete(handlers::delete_field),
        )
        .route("/api/schema/reset", post(handlers::reset_fields))
        // Forms
        .route("/api/forms/validate", post(handlers::validate_values))
        .route("/api/forms/render", post(handlers::render_values))
        .with_state(state)
}
