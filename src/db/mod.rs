use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::path::Path;
use std::time::Duration;
use tower_sessions_sqlx_store::SqliteStore;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::user::{NewUser, User};

/// Integrity rule that rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
}

/// Finds the constraint violation behind a repository error, looking through
/// any `anyhow` context.
#[must_use]
pub fn constraint_violation(err: &anyhow::Error) -> Option<ConstraintKind> {
    let db_err = err.chain().find_map(|e| e.downcast_ref::<DbErr>())?;

    match db_err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Some(ConstraintKind::Unique),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => Some(ConstraintKind::ForeignKey),
        _ => {
            let message = db_err.to_string();
            if message.contains("UNIQUE constraint failed") {
                Some(ConstraintKind::Unique)
            } else if message.contains("FOREIGN KEY constraint failed") {
                Some(ConstraintKind::ForeignKey)
            } else {
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Login sessions, kept in the catalog database so they survive restarts
    /// and can be swept when they expire.
    pub async fn session_store(&self) -> Result<SqliteStore> {
        let sessions = SqliteStore::new(self.conn.get_sqlite_connection_pool().clone());
        sessions
            .migrate()
            .await
            .context("Failed to create session table")?;
        Ok(sessions)
    }

    #[must_use]
    pub fn genres(&self) -> repositories::genre::GenreRepository {
        repositories::genre::GenreRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn languages(&self) -> repositories::language::LanguageRepository {
        repositories::language::LanguageRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn authors(&self) -> repositories::author::AuthorRepository {
        repositories::author::AuthorRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn books(&self) -> repositories::book::BookRepository {
        repositories::book::BookRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn book_instances(&self) -> repositories::book_instance::BookInstanceRepository {
        repositories::book_instance::BookInstanceRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn create_user(&self, new_user: NewUser, config: &SecurityConfig) -> Result<User> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn user_count(&self) -> Result<u64> {
        self.user_repo().count().await
    }
}
