use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000002_create_flights::Flight;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FlightStatus::Table)
                    .if_not_exists()
                    .col(string_len(FlightStatus::StatusId, 36).primary_key())
                    .col(string_len(FlightStatus::FlightId, 36).not_null())
                    .col(date(FlightStatus::FlightDate).not_null())
                    .col(date_time_null(FlightStatus::ActualDepartureTime))
                    .col(date_time_null(FlightStatus::ActualArrivalTime))
                    .col(double_null(FlightStatus::DepartureDelay))
                    .col(double_null(FlightStatus::ArrivalDelay))
                    .col(double_null(FlightStatus::TaxiOut))
                    .col(double_null(FlightStatus::TaxiIn))
                    .col(double_null(FlightStatus::ActualElapsedTime))
                    .col(double_null(FlightStatus::AirTime))
                    .col(boolean(FlightStatus::Cancelled).not_null().default(false))
                    .col(string_len_null(FlightStatus::CancellationCode, 1))
                    .col(boolean(FlightStatus::Diverted).not_null().default(false))
                    .col(double_null(FlightStatus::CarrierDelay))
                    .col(double_null(FlightStatus::WeatherDelay))
                    .col(double_null(FlightStatus::NasDelay))
                    .col(double_null(FlightStatus::SecurityDelay))
                    .col(double_null(FlightStatus::LateAircraftDelay))
                    // Deleting a flight requires removing its statuses first
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flight_status_flight")
                            .from(FlightStatus::Table, FlightStatus::FlightId)
                            .to(Flight::Table, Flight::FlightId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_flight_status_date")
                    .table(FlightStatus::Table)
                    .col(FlightStatus::FlightDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FlightStatus::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum FlightStatus {
    #[sea_orm(iden = "Flight_Status")]
    Table,
    #[sea_orm(iden = "statusId")]
    StatusId,
    #[sea_orm(iden = "flightId")]
    FlightId,
    #[sea_orm(iden = "flightDate")]
    FlightDate,
    #[sea_orm(iden = "actualDepartureTime")]
    ActualDepartureTime,
    #[sea_orm(iden = "actualArrivalTime")]
    ActualArrivalTime,
    #[sea_orm(iden = "departureDelay")]
    DepartureDelay,
    #[sea_orm(iden = "arrivalDelay")]
    ArrivalDelay,
    #[sea_orm(iden = "taxiOut")]
    TaxiOut,
    #[sea_orm(iden = "taxiIn")]
    TaxiIn,
    #[sea_orm(iden = "actualElapsedTime")]
    ActualElapsedTime,
    #[sea_orm(iden = "airTime")]
    AirTime,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
    #[sea_orm(iden = "cancellationCode")]
    CancellationCode,
    #[sea_orm(iden = "diverted")]
    Diverted,
    #[sea_orm(iden = "carrierDelay")]
    CarrierDelay,
    #[sea_orm(iden = "weatherDelay")]
    WeatherDelay,
    #[sea_orm(iden = "nasDelay")]
    NasDelay,
    #[sea_orm(iden = "securityDelay")]
    SecurityDelay,
    #[sea_orm(iden = "lateAircraftDelay")]
    LateAircraftDelay,
}
