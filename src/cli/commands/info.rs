//! Info command handler

use crate::config::Config;
use crate::domain::EntityKind;
use crate::services::{CatalogError, CatalogRecord};
use crate::state::SharedState;

pub async fn cmd_info(config: &Config, kind: &str, id: &str) -> anyhow::Result<()> {
    let Ok(kind) = kind.parse::<EntityKind>() else {
        println!("Unknown kind: {kind}");
        return Ok(());
    };

    let state = SharedState::new(config.clone()).await?;
    let record = match state.catalog_service.get_by_id(kind, id).await {
        Ok(record) => record,
        Err(CatalogError::NotFound { .. }) => {
            println!("{} with ID {id} not found.", kind.label());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", render_record(&record)?);
    Ok(())
}

/// Pretty JSON, the same shape the detail endpoint returns as `data`.
fn render_record(record: &CatalogRecord) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::GenreDto;

    #[test]
    fn test_render_record_is_json() {
        let record = CatalogRecord::Genre(GenreDto {
            id: 7,
            name: "Fantasy".to_string(),
        });

        let rendered = render_record(&record).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, serde_json::json!({"id": 7, "name": "Fantasy"}));
        assert!(rendered.contains('\n'));
    }
}
