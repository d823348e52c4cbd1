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
                    .table(DelayPrediction::Table)
                    .if_not_exists()
                    .col(string_len(DelayPrediction::PredictionId, 36).primary_key())
                    .col(string_len(DelayPrediction::FlightId, 36).not_null())
                    .col(
                        date_time(DelayPrediction::PredictionTime)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(double_null(DelayPrediction::PredictedDepartureDelay))
                    .col(double_null(DelayPrediction::PredictedArrivalDelay))
                    .col(boolean(DelayPrediction::NotificationSent).not_null().default(false))
                    .col(string_len_null(DelayPrediction::PredictionReason, 255))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_delay_prediction_flight")
                            .from(DelayPrediction::Table, DelayPrediction::FlightId)
                            .to(Flight::Table, Flight::FlightId)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DelayPrediction::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DelayPrediction {
    #[sea_orm(iden = "Delay_Prediction")]
    Table,
    #[sea_orm(iden = "predictionId")]
    PredictionId,
    #[sea_orm(iden = "flightId")]
    FlightId,
    #[sea_orm(iden = "predictionTime")]
    PredictionTime,
    #[sea_orm(iden = "predictedDepartureDelay")]
    PredictedDepartureDelay,
    #[sea_orm(iden = "predictedArrivalDelay")]
    PredictedArrivalDelay,
    #[sea_orm(iden = "notificationSent")]
    NotificationSent,
    #[sea_orm(iden = "predictionReason")]
    PredictionReason,
}
