//! Read-only catalog endpoints: the index page counts plus list and detail
//! views for every entity kind.

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use crate::api::validation::parse_kind;
use crate::api::{ApiError, ApiResponse, AppState, CatalogListDto};
use crate::services::{CatalogError, CatalogRecord, IndexCounts};

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { kind, id } => Self::not_found(kind.label(), id),
            CatalogError::ConstraintViolation { field, message } => Self::Conflict {
                field: Some(field),
                message,
            },
            CatalogError::ReferentialIntegrity(message) => Self::Conflict {
                field: None,
                message,
            },
            CatalogError::Validation(errors) => Self::InvalidFields(errors),
            CatalogError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// `GET /api/catalog`
pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<IndexCounts>>, ApiError> {
    let counts = state.catalog().index_counts().await?;
    Ok(Json(ApiResponse::success(counts)))
}

/// `GET /api/catalog/{kind}`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<ApiResponse<CatalogListDto>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let records = state.catalog().list_all(kind).await?;

    Ok(Json(ApiResponse::success(CatalogListDto {
        kind,
        count: records.len(),
        records,
    })))
}

/// `GET /api/catalog/{kind}/{id}`
///
/// Authors come with their books; books with author, language, genres and
/// copies.
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<CatalogRecord>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let record = state.catalog().get_by_id(kind, &id).await?;
    Ok(Json(ApiResponse::success(record)))
}
