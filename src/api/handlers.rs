// HTTP handlers over the schema store, builder, validator and renderer

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use super::envelope::{builder_details, form_details, ApiResponse};
use crate::app_state::AppState;
use crate::builder::{BuilderError, FieldBuilder, SchemaEditor};
use crate::error::{AppError, AppResult};
use crate::render::{render_form, RenderedField, RenderedSection};
use crate::schema::{
    field_type_catalog, FieldDefinition, FieldErrors, FieldGroup, FieldType, FieldTypeEntry,
    FormSchema, FormValues, FIELD_GROUPS,
};
use crate::store::FieldSchemaStore;
use crate::validation::validate_form;

/// Builder inputs as sent by a client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDraft {
    pub label: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Option labels; values are derived from them
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl FieldDraft {
    fn apply_to(&self, builder: &mut FieldBuilder) {
        if let Some(field_type) = &self.field_type {
            builder.set_field_type(field_type.clone());
        }
        builder.set_label(&self.label);
        if let Some(name) = &self.name {
            builder.set_name(name);
        }
        if let Some(placeholder) = &self.placeholder {
            builder.set_placeholder(placeholder);
        }
        if let Some(help_text) = &self.help_text {
            builder.set_help_text(help_text);
        }
        if let Some(group) = &self.group {
            builder.set_group(group);
        }
        builder.set_required(self.required);
        if let Some(labels) = &self.options {
            while builder.remove_option(0) {}
            for (index, label) in labels.iter().enumerate() {
                builder.add_option();
                builder.set_option_label(index, label);
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub values: FormValues,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub values: FormValues,
    #[serde(default)]
    pub errors: FieldErrors,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderResponse {
    pub fields: Vec<RenderedField>,
    pub sections: Vec<RenderedSection>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub field_types: Vec<FieldTypeEntry>,
    pub groups: Vec<FieldGroup>,
}

/// Run synchronous store work on the blocking pool while holding the store
/// lock, so file I/O never stalls the async workers
async fn with_store<T, F>(state: &AppState, work: F) -> AppResult<T>
where
    F: FnOnce(&FieldSchemaStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone().lock_owned().await;
    tokio::task::spawn_blocking(move || work(&store))
        .await
        .map_err(|err| AppError::Internal(format!("store task failed: {}", err)))
}

fn save_response(
    result: Result<FieldDefinition, BuilderError>,
    degraded: bool,
    created: bool,
) -> AppResult<Response> {
    match result {
        Ok(field) => {
            let status = if created { StatusCode::CREATED } else { StatusCode::OK };
            Ok((status, Json(ApiResponse::written(field, degraded))).into_response())
        }
        Err(BuilderError::Invalid(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::invalid(
                "Field definition is invalid",
                builder_details(&errors),
            )),
        )
            .into_response()),
        Err(missing) => Err(missing.into()),
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_form_schema(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<FormSchema>>> {
    let schema = with_store(&state, |store| store.effective_schema()).await?;
    Ok(Json(ApiResponse::ok(FormSchema::from_effective(&schema))))
}

pub async fn get_fields(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<FieldDefinition>>>> {
    let schema = with_store(&state, |store| store.effective_schema()).await?;
    Ok(Json(ApiResponse::ok(schema.visible_fields())))
}

pub async fn get_group_fields(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<FieldDefinition>>>> {
    let schema = with_store(&state, |store| store.effective_schema()).await?;
    Ok(Json(ApiResponse::ok(schema.fields_by_group(&group_id))))
}

pub async fn get_catalog() -> Json<ApiResponse<CatalogResponse>> {
    Json(ApiResponse::ok(CatalogResponse {
        field_types: field_type_catalog(),
        groups: FIELD_GROUPS.to_vec(),
    }))
}

#[instrument(skip(state, draft), fields(label = %draft.label))]
pub async fn create_field(
    State(state): State<AppState>,
    Json(draft): Json<FieldDraft>,
) -> AppResult<Response> {
    let (result, degraded) = with_store(&state, move |store| {
        let editor = SchemaEditor::new(store);
        let mut builder = editor.begin_add();
        draft.apply_to(&mut builder);
        (editor.save(&mut builder), store.persistence_degraded())
    })
    .await?;
    save_response(result, degraded, true)
}

#[instrument(skip(state, draft))]
pub async fn update_field(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(draft): Json<FieldDraft>,
) -> AppResult<Response> {
    let (result, degraded) = with_store(&state, move |store| {
        let editor = SchemaEditor::new(store);
        let mut builder = editor.begin_edit(&name)?;
        draft.apply_to(&mut builder);
        Ok::<_, AppError>((editor.save(&mut builder), store.persistence_degraded()))
    })
    .await??;
    save_response(result, degraded, false)
}

#[instrument(skip(state))]
pub async fn delete_field(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let target = name.clone();
    let (removed, degraded) = with_store(&state, move |store| {
        let removed = SchemaEditor::new(store).delete(&target)?;
        Ok::<_, AppError>((removed, store.persistence_degraded()))
    })
    .await??;

    if !removed {
        return Err(AppError::NotFound(format!("Field '{}' not found", name)));
    }
    Ok(Json(ApiResponse::written(
        json!({ "name": name, "deleted": true }),
        degraded,
    )))
}

#[instrument(skip(state))]
pub async fn reset_fields(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<FieldDefinition>>>> {
    let (fields, degraded) = with_store(&state, |store| {
        SchemaEditor::new(store).reset();
        (
            store.effective_schema().fields().to_vec(),
            store.persistence_degraded(),
        )
    })
    .await?;
    Ok(Json(ApiResponse::written(fields, degraded)))
}

pub async fn validate_values(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> AppResult<Response> {
    let schema = with_store(&state, |store| store.effective_schema()).await?;
    let report = validate_form(&schema.visible_fields(), &request.values);

    if report.is_valid() {
        return Ok(Json(ApiResponse::ok(ValidateResponse {
            valid: true,
            errors: FieldErrors::new(),
        }))
        .into_response());
    }
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::<()>::invalid(
            "Please fix the validation errors",
            form_details(&report.errors),
        )),
    )
        .into_response())
}

pub async fn render_values(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> AppResult<Json<ApiResponse<RenderResponse>>> {
    let schema = with_store(&state, |store| store.effective_schema()).await?;
    let form = render_form(
        &schema.visible_fields(),
        &request.values,
        &request.errors,
        request.disabled,
    );
    let sections = form.sections();
    Ok(Json(ApiResponse::ok(RenderResponse {
        fields: form.fields,
        sections,
    })))
}
