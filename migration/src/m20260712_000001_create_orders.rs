//! Migration to create the orders table for the crypto-to-fiat settlement flow

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(string(Orders::Id).primary_key())
                    .col(string(Orders::PublicId).not_null())
                    .col(string(Orders::TokenSecret).not_null())
                    .col(string(Orders::AssetSymbol).not_null())
                    .col(string(Orders::Network).not_null())
                    .col(double(Orders::AmountCrypto).not_null())
                    .col(string(Orders::FiatCurrency).not_null())
                    .col(double(Orders::BuyRate).not_null())
                    .col(double(Orders::FeePct).default(0.0))
                    .col(double(Orders::FeeFlat).default(0.0))
                    .col(string(Orders::PayoutMethod).not_null())
                    .col(string(Orders::PayoutDetailsJson).not_null())
                    .col(string(Orders::DepositAddress).not_null())
                    .col(string(Orders::DepositSource).not_null())
                    .col(string_null(Orders::DepositPoolAddressId))
                    .col(string_null(Orders::Txid))
                    .col(string(Orders::Status).not_null())
                    .col(integer(Orders::ConfirmationsRequired).default(1))
                    .col(integer(Orders::ConfirmationsCurrent).default(0))
                    .col(string_null(Orders::PayoutReference))
                    .col(string_null(Orders::AdminNote))
                    .col(string_null(Orders::IpAddress))
                    .col(timestamp_with_time_zone(Orders::CreatedAt))
                    .col(timestamp_with_time_zone(Orders::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Customer lookups resolve the short public id, never the internal one
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_public_id")
                    .table(Orders::Table)
                    .col(Orders::PublicId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index for the admin status filter
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_status")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await?;

        // Admin order list is newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_created_at")
                    .table(Orders::Table)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    PublicId,
    TokenSecret,
    AssetSymbol,
    Network,
    AmountCrypto,
    FiatCurrency,
    BuyRate,
    FeePct,
    FeeFlat,
    PayoutMethod,
    PayoutDetailsJson,
    DepositAddress,
    DepositSource,
    DepositPoolAddressId,
    Txid,
    Status,
    ConfirmationsRequired,
    ConfirmationsCurrent,
    PayoutReference,
    AdminNote,
    IpAddress,
    CreatedAt,
    UpdatedAt,
}
