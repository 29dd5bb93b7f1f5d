pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_seo_schema;
mod m20261019_000002_add_content_publication_tracking;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_seo_schema::Migration),
            Box::new(m20261019_000002_add_content_publication_tracking::Migration),
        ]
    }
}
