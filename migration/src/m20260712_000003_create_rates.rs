//! Migration to create the buy-rate table
//!
//! Multiple historical rows may exist per (asset, network, fiat); the most
//! recently updated one wins.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rates::Table)
                    .if_not_exists()
                    .col(string(Rates::Id).primary_key())
                    .col(string(Rates::AssetSymbol).not_null())
                    .col(string(Rates::Network).not_null())
                    .col(string(Rates::FiatCurrency).not_null())
                    .col(double(Rates::BuyRate).not_null())
                    .col(double_null(Rates::FeePct))
                    .col(double_null(Rates::FeeFlat))
                    .col(timestamp_with_time_zone(Rates::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rates_lookup")
                    .table(Rates::Table)
                    .col(Rates::AssetSymbol)
                    .col(Rates::Network)
                    .col(Rates::FiatCurrency)
                    .col(Rates::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rates {
    Table,
    Id,
    AssetSymbol,
    Network,
    FiatCurrency,
    BuyRate,
    FeePct,
    FeeFlat,
    UpdatedAt,
}
