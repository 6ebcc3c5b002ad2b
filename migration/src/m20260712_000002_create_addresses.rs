//! Migration to create the deposit address pool table

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(string(Addresses::Id).primary_key())
                    .col(string(Addresses::Network).not_null())
                    .col(string(Addresses::Address).not_null())
                    .col(string(Addresses::Status).not_null())
                    .col(string_null(Addresses::AssignedOrderId))
                    .col(timestamp_with_time_zone(Addresses::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Re-uploading an address must not create a second pool entry
        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_address")
                    .table(Addresses::Table)
                    .col(Addresses::Address)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // The allocator scans (network, status) for the oldest unused row
        manager
            .create_index(
                Index::create()
                    .name("idx_addresses_network_status")
                    .table(Addresses::Table)
                    .col(Addresses::Network)
                    .col(Addresses::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    Network,
    Address,
    Status,
    AssignedOrderId,
    CreatedAt,
}
