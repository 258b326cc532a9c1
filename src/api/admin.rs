//! Staff-only write endpoints over every catalog entity.
//!
//! All handlers sit behind [`super::auth::require_staff`]. Field problems come
//! back as `400`, unique and delete conflicts as `409`.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::api::validation::{parse_instance_id, validate_record_id};
use crate::api::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::domain::InstanceFilter;
use crate::models::catalog::{AuthorInput, BookInput, BookInstanceInput, NameInput};
use crate::services::{AuthorDto, BookDetailDto, BookInstanceDto, GenreDto, LanguageDto};

type Created<T> = (StatusCode, Json<ApiResponse<T>>);
type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn created<T>(data: T) -> Created<T> {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

fn deleted(what: &str, id: impl std::fmt::Display) -> Json<ApiResponse<MessageResponse>> {
    Json(ApiResponse::success(MessageResponse {
        message: format!("{what} {id} deleted"),
    }))
}

// ============================================================================
// Genres
// ============================================================================

pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NameInput>,
) -> Result<Created<GenreDto>, ApiError> {
    Ok(created(state.catalog().create_genre(&input).await?))
}

pub async fn update_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(input): Json<NameInput>,
) -> ApiResult<GenreDto> {
    let id = validate_record_id("Genre", id)?;
    let genre = state.catalog().rename_genre(id, &input).await?;
    Ok(Json(ApiResponse::success(genre)))
}

pub async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<MessageResponse> {
    let id = validate_record_id("Genre", id)?;
    state.catalog().delete_genre(id).await?;
    Ok(deleted("Genre", id))
}

// ============================================================================
// Languages
// ============================================================================

pub async fn create_language(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NameInput>,
) -> Result<Created<LanguageDto>, ApiError> {
    Ok(created(state.catalog().create_language(&input).await?))
}

pub async fn update_language(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(input): Json<NameInput>,
) -> ApiResult<LanguageDto> {
    let id = validate_record_id("Language", id)?;
    let language = state.catalog().rename_language(id, &input).await?;
    Ok(Json(ApiResponse::success(language)))
}

pub async fn delete_language(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<MessageResponse> {
    let id = validate_record_id("Language", id)?;
    state.catalog().delete_language(id).await?;
    Ok(deleted("Language", id))
}

// ============================================================================
// Authors
// ============================================================================

pub async fn create_author(
    State(state): State<Arc<AppState>>,
    Json(input): Json<AuthorInput>,
) -> Result<Created<AuthorDto>, ApiError> {
    Ok(created(state.catalog().create_author(&input).await?))
}

pub async fn update_author(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(input): Json<AuthorInput>,
) -> ApiResult<AuthorDto> {
    let id = validate_record_id("Author", id)?;
    let author = state.catalog().update_author(id, &input).await?;
    Ok(Json(ApiResponse::success(author)))
}

pub async fn delete_author(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<MessageResponse> {
    let id = validate_record_id("Author", id)?;
    state.catalog().delete_author(id).await?;
    Ok(deleted("Author", id))
}

// ============================================================================
// Books
// ============================================================================

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(input): Json<BookInput>,
) -> Result<Created<BookDetailDto>, ApiError> {
    Ok(created(state.catalog().create_book(&input).await?))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(input): Json<BookInput>,
) -> ApiResult<BookDetailDto> {
    let id = validate_record_id("Book", id)?;
    let book = state.catalog().update_book(id, &input).await?;
    Ok(Json(ApiResponse::success(book)))
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<MessageResponse> {
    let id = validate_record_id("Book", id)?;
    state.catalog().delete_book(id).await?;
    Ok(deleted("Book", id))
}

// ============================================================================
// Book instances
// ============================================================================

/// `GET /api/admin/bookinstances?status=a&due_back=this_month`
pub async fn list_instances(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<InstanceFilter>,
) -> ApiResult<Vec<BookInstanceDto>> {
    let instances = state.catalog().list_instances(&filter).await?;
    Ok(Json(ApiResponse::success(instances)))
}

pub async fn create_instance(
    State(state): State<Arc<AppState>>,
    Json(input): Json<BookInstanceInput>,
) -> Result<Created<BookInstanceDto>, ApiError> {
    Ok(created(state.catalog().create_instance(&input).await?))
}

pub async fn update_instance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<BookInstanceInput>,
) -> ApiResult<BookInstanceDto> {
    let id = parse_instance_id(&id)?;
    let instance = state.catalog().update_instance(id, &input).await?;
    Ok(Json(ApiResponse::success(instance)))
}

pub async fn delete_instance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    let id = parse_instance_id(&id)?;
    state.catalog().delete_instance(id).await?;
    Ok(deleted("Book instance", id))
}
