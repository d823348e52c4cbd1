pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_reference_tables;
mod m20250301_000002_create_flights;
mod m20250301_000003_create_flight_statuses;
mod m20250301_000004_create_delay_predictions;
mod m20250301_000005_create_weather_events;
mod m20250301_000006_install_routines;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_reference_tables::Migration),
            Box::new(m20250301_000002_create_flights::Migration),
            Box::new(m20250301_000003_create_flight_statuses::Migration),
            Box::new(m20250301_000004_create_delay_predictions::Migration),
            Box::new(m20250301_000005_create_weather_events::Migration),
            Box::new(m20250301_000006_install_routines::Migration),
        ]
    }
}
