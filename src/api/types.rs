use serde::Serialize;

use crate::domain::{EntityKind, FieldErrors};
use crate::services::{CatalogRecord, SignupFormValues};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-field messages for rejected forms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            errors: None,
        }
    }

    pub fn invalid(message: impl Into<String>, errors: FieldErrors, data: Option<T>) -> Self {
        Self {
            success: false,
            data,
            error: Some(message.into()),
            errors: Some(errors),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogListDto {
    pub kind: EntityKind,
    pub count: usize,
    pub records: Vec<CatalogRecord>,
}

/// The signup form as the client should render it.
#[derive(Debug, Serialize)]
pub struct SignupFormDto {
    pub fields: [&'static str; 5],
    pub values: SignupFormValues,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
