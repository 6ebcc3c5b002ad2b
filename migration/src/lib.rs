pub use sea_orm_migration::prelude::*;

mod m20260712_000001_create_orders;
mod m20260712_000002_create_addresses;
mod m20260712_000003_create_rates;
mod m20260712_000004_create_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260712_000001_create_orders::Migration),
            Box::new(m20260712_000002_create_addresses::Migration),
            Box::new(m20260712_000003_create_rates::Migration),
            Box::new(m20260712_000004_create_settings::Migration),
        ]
    }
}
