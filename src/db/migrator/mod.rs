use sea_orm_migration::prelude::*;

mod m20240101_add_users;
mod m20240102_catalog;
mod m20240103_case_insensitive_names;
mod m20240104_case_insensitive_usernames;

pub use m20240101_add_users::DEFAULT_API_KEY;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_add_users::Migration),
            Box::new(m20240102_catalog::Migration),
            Box::new(m20240103_case_insensitive_names::Migration),
            Box::new(m20240104_case_insensitive_usernames::Migration),
        ]
    }
}
