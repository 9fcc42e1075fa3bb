// JSON response envelope shared by every endpoint

use serde::Serialize;

use crate::builder::BuilderErrors;
use crate::schema::FieldErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
    /// Set when the last schema write could not be persisted
    #[serde(skip_serializing_if = "is_false")]
    pub persistence_degraded: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            persistence_degraded: false,
        }
    }

    pub fn written(data: T, persistence_degraded: bool) -> Self {
        Self {
            persistence_degraded,
            ..Self::ok(data)
        }
    }

    pub fn invalid(message: &str, details: Vec<FieldError>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiErrorBody {
                code: "VALIDATION_ERROR",
                message: message.to_string(),
                details: Some(details),
            }),
            persistence_degraded: false,
        }
    }
}

pub fn builder_details(errors: &BuilderErrors) -> Vec<FieldError> {
    errors
        .entries()
        .into_iter()
        .map(|(field, message)| FieldError {
            field: field.to_string(),
            message: message.to_string(),
        })
        .collect()
}

pub fn form_details(errors: &FieldErrors) -> Vec<FieldError> {
    errors
        .iter()
        .map(|(field, message)| FieldError {
            field: field.clone(),
            message: message.clone(),
        })
        .collect()
}
