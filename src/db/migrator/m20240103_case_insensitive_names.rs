use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS genre_name_case_insensitive_unique ON genre (lower(name))",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS language_name_case_insensitive_unique ON language (lower(name))",
        )
        .await?;

        // Default orderings: authors by name, copies by due date
        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_author_name ON author (last_name, first_name)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_book_instance_due_back ON book_instance (due_back)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_book_instance_due_back")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_author_name")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS language_name_case_insensitive_unique")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS genre_name_case_insensitive_unique")
            .await?;

        Ok(())
    }
}
