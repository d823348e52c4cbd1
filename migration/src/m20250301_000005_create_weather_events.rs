use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_reference_tables::Airport;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WeatherEvent::Table)
                    .if_not_exists()
                    .col(string_len(WeatherEvent::EventId, 36).primary_key())
                    .col(string_len(WeatherEvent::AirportCode, 10).not_null())
                    .col(string_len(WeatherEvent::Type, 50).not_null())
                    .col(string_len_null(WeatherEvent::Severity, 20))
                    .col(date_time(WeatherEvent::StartTime).not_null())
                    .col(date_time(WeatherEvent::EndTime).not_null())
                    .col(double_null(WeatherEvent::Precipitation))
                    .col(double_null(WeatherEvent::LocationLat))
                    .col(double_null(WeatherEvent::LocationLng))
                    .col(string_len_null(WeatherEvent::City, 100))
                    .col(string_len_null(WeatherEvent::Country, 50))
                    .col(string_len_null(WeatherEvent::ZipCode, 10))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_weather_event_airport")
                            .from(WeatherEvent::Table, WeatherEvent::AirportCode)
                            .to(Airport::Table, Airport::AirportCode)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_weather_event_start")
                    .table(WeatherEvent::Table)
                    .col(WeatherEvent::StartTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WeatherEvent::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum WeatherEvent {
    #[sea_orm(iden = "Weather_Event")]
    Table,
    #[sea_orm(iden = "eventId")]
    EventId,
    #[sea_orm(iden = "airportCode")]
    AirportCode,
    #[sea_orm(iden = "type")]
    Type,
    #[sea_orm(iden = "severity")]
    Severity,
    #[sea_orm(iden = "startTime")]
    StartTime,
    #[sea_orm(iden = "endTime")]
    EndTime,
    #[sea_orm(iden = "precipitation")]
    Precipitation,
    #[sea_orm(iden = "locationLat")]
    LocationLat,
    #[sea_orm(iden = "locationLng")]
    LocationLng,
    #[sea_orm(iden = "city")]
    City,
    #[sea_orm(iden = "country")]
    Country,
    #[sea_orm(iden = "zipCode")]
    ZipCode,
}
