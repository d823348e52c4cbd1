use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_reference_tables::{Airline, Airport};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Flight::Table)
                    .if_not_exists()
                    .col(string_len(Flight::FlightId, 36).primary_key())
                    .col(string_len(Flight::AirlineCode, 10).not_null())
                    .col(integer(Flight::FlightNumber).not_null())
                    .col(string_len(Flight::OriginAirport, 10).not_null())
                    .col(string_len(Flight::DestAirport, 10).not_null())
                    .col(date_time(Flight::ScheduledDepartureTime).not_null())
                    .col(date_time(Flight::ScheduledArrivalTime).not_null())
                    .col(integer_null(Flight::ElapsedTime))
                    .col(integer_null(Flight::Distance))
                    .check(Expr::col(Flight::OriginAirport).ne(Expr::col(Flight::DestAirport)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flight_airline")
                            .from(Flight::Table, Flight::AirlineCode)
                            .to(Airline::Table, Airline::AirlineCode)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flight_origin_airport")
                            .from(Flight::Table, Flight::OriginAirport)
                            .to(Airport::Table, Airport::AirportCode)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flight_dest_airport")
                            .from(Flight::Table, Flight::DestAirport)
                            .to(Airport::Table, Airport::AirportCode)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Designator lookups and the default listing order
        manager
            .create_index(
                Index::create()
                    .name("idx_flight_designator")
                    .table(Flight::Table)
                    .col(Flight::AirlineCode)
                    .col(Flight::FlightNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_flight_scheduled_departure")
                    .table(Flight::Table)
                    .col(Flight::ScheduledDepartureTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Flight::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Flight {
    #[sea_orm(iden = "Flight")]
    Table,
    #[sea_orm(iden = "flightId")]
    FlightId,
    #[sea_orm(iden = "airlineCode")]
    AirlineCode,
    #[sea_orm(iden = "flightNumber")]
    FlightNumber,
    #[sea_orm(iden = "originAirport")]
    OriginAirport,
    #[sea_orm(iden = "destAirport")]
    DestAirport,
    #[sea_orm(iden = "scheduledDepartureTime")]
    ScheduledDepartureTime,
    #[sea_orm(iden = "scheduledArrivalTime")]
    ScheduledArrivalTime,
    #[sea_orm(iden = "elapsedTime")]
    ElapsedTime,
    #[sea_orm(iden = "distance")]
    Distance,
}
