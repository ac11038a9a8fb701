use sea_orm_migration::prelude::*;

mod m20240301_000001_directory;
mod m20240412_000001_drink;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_directory::Migration),
            Box::new(m20240412_000001_drink::Migration),
        ]
    }
}
