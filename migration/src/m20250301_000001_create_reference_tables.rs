use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Airline::Table)
                    .if_not_exists()
                    .col(string_len(Airline::AirlineCode, 10).primary_key())
                    .col(integer_null(Airline::DotCode))
                    .col(string_len(Airline::Name, 100).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Airport::Table)
                    .if_not_exists()
                    .col(string_len(Airport::AirportCode, 10).primary_key())
                    .col(string_len(Airport::Name, 100).not_null())
                    .col(string_len(Airport::City, 100).not_null())
                    .col(string_len_null(Airport::State, 50))
                    .col(double_null(Airport::LocationLat))
                    .col(double_null(Airport::LocationLng))
                    .col(string_len_null(Airport::TimeZone, 50))
                    .col(string_len_null(Airport::ZipCode, 10))
                    .to_owned(),
            )
            .await?;

        // Seed reference data
        let airlines = Query::insert()
            .into_table(Airline::Table)
            .columns([Airline::AirlineCode, Airline::DotCode, Airline::Name])
            .values_panic(["AA".into(), 19805.into(), "American Airlines Inc.".into()])
            .values_panic(["DL".into(), 19790.into(), "Delta Air Lines Inc.".into()])
            .values_panic(["UA".into(), 19977.into(), "United Air Lines Inc.".into()])
            .values_panic(["WN".into(), 19393.into(), "Southwest Airlines Co.".into()])
            .to_owned();

        manager.exec_stmt(airlines).await?;

        let airports = Query::insert()
            .into_table(Airport::Table)
            .columns([
                Airport::AirportCode,
                Airport::Name,
                Airport::City,
                Airport::State,
                Airport::LocationLat,
                Airport::LocationLng,
                Airport::TimeZone,
            ])
            .values_panic([
                "ORD".into(),
                "Chicago O'Hare International".into(),
                "Chicago".into(),
                "IL".into(),
                (41.9786).into(),
                (-87.9048).into(),
                "America/Chicago".into(),
            ])
            .values_panic([
                "JFK".into(),
                "John F. Kennedy International".into(),
                "New York".into(),
                "NY".into(),
                (40.6398).into(),
                (-73.7789).into(),
                "America/New_York".into(),
            ])
            .values_panic([
                "LAX".into(),
                "Los Angeles International".into(),
                "Los Angeles".into(),
                "CA".into(),
                (33.9425).into(),
                (-118.4081).into(),
                "America/Los_Angeles".into(),
            ])
            .values_panic([
                "ATL".into(),
                "Hartsfield-Jackson Atlanta International".into(),
                "Atlanta".into(),
                "GA".into(),
                (33.6367).into(),
                (-84.4281).into(),
                "America/New_York".into(),
            ])
            .to_owned();

        manager.exec_stmt(airports).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Airport::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Airline::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Airline {
    #[sea_orm(iden = "Airline")]
    Table,
    #[sea_orm(iden = "airlineCode")]
    AirlineCode,
    #[sea_orm(iden = "dotCode")]
    DotCode,
    #[sea_orm(iden = "name")]
    Name,
}

#[derive(DeriveIden)]
pub enum Airport {
    #[sea_orm(iden = "Airport")]
    Table,
    #[sea_orm(iden = "airportCode")]
    AirportCode,
    #[sea_orm(iden = "name")]
    Name,
    #[sea_orm(iden = "city")]
    City,
    #[sea_orm(iden = "state")]
    State,
    #[sea_orm(iden = "locationLat")]
    LocationLat,
    #[sea_orm(iden = "locationLng")]
    LocationLng,
    #[sea_orm(iden = "timeZone")]
    TimeZone,
    #[sea_orm(iden = "zipCode")]
    ZipCode,
}
