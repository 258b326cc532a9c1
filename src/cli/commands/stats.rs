//! Stats command handler

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_stats(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let counts = state.catalog_service.index_counts().await?;

    println!("Local Library");
    println!("{:-<40}", "");
    println!("Books:            {}", counts.num_books);
    println!("Copies:           {}", counts.num_instances);
    println!("Copies available: {}", counts.num_instances_available);
    println!("Authors:          {}", counts.num_authors);

    Ok(())
}
