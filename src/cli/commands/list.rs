//! List command handler

use crate::config::Config;
use crate::domain::EntityKind;
use crate::services::CatalogRecord;
use crate::state::SharedState;

pub async fn cmd_list(config: &Config, kind: &str) -> anyhow::Result<()> {
    let kind: EntityKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            println!("{e}");
            println!("Known kinds: books, authors, genres, languages, bookinstances");
            return Ok(());
        }
    };

    let state = SharedState::new(config.clone()).await?;
    let records = state.catalog_service.list_all(kind).await?;

    if records.is_empty() {
        println!("No {} in the catalog.", kind.slug());
        return Ok(());
    }

    println!("{} ({} total)", kind.label(), records.len());
    println!("{:-<70}", "");

    for record in &records {
        println!("{}", summary_line(record));
    }

    Ok(())
}

/// One line per record, the way the list pages show them.
fn summary_line(record: &CatalogRecord) -> String {
    match record {
        CatalogRecord::Genre(g) => format!("{:>4}  {}", g.id, g.name),
        CatalogRecord::Language(l) => format!("{:>4}  {}", l.id, l.name),
        CatalogRecord::Author(a) => {
            let lifespan = match (a.date_of_birth, a.date_of_death) {
                (Some(born), Some(died)) => format!(" ({born} - {died})"),
                (Some(born), None) => format!(" ({born} - )"),
                _ => String::new(),
            };
            format!("{:>4}  {}{lifespan}", a.id, a.display_name)
        }
        CatalogRecord::AuthorDetail(a) => format!("{:>4}  {}", a.author.id, a.author.display_name),
        CatalogRecord::Book(b) => format!(
            "{:>4}  {} ({})",
            b.id,
            b.title,
            b.author_name.as_deref().unwrap_or("unknown author")
        ),
        CatalogRecord::BookDetail(b) => format!("{:>4}  {}", b.id, b.title),
        CatalogRecord::BookInstance(i) => {
            let due = i
                .due_back
                .map(|d| format!(" due {d}"))
                .unwrap_or_default();
            let overdue = if i.is_due { " OVERDUE" } else { "" };
            format!("{} [{}]{due}{overdue}", i.display_name, i.status_label)
        }
    }
}
