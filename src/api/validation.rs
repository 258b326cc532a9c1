use uuid::Uuid;

use super::ApiError;
use crate::domain::EntityKind;

/// Resolves the `{kind}` path segment. An unknown kind is a missing page.
pub fn parse_kind(raw: &str) -> Result<EntityKind, ApiError> {
    raw.parse::<EntityKind>()
        .map_err(|e| ApiError::NotFound(e.to_string()))
}

pub fn validate_record_id(resource: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::not_found(resource, id));
    }
    Ok(id)
}

pub fn parse_instance_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found("Book instance", raw))
}
