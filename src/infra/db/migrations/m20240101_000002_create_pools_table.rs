//! Migration: Create pools table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pools::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pools::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Pools::ContractAddress).string().not_null())
                    .col(ColumnDef::new(Pools::ManagerAddress).string().not_null())
                    .col(ColumnDef::new(Pools::EscrowAddress).string().not_null())
                    .col(ColumnDef::new(Pools::Name).string().not_null())
                    .col(ColumnDef::new(Pools::Symbol).string().null())
                    .col(ColumnDef::new(Pools::Asset).string().null())
                    .col(ColumnDef::new(Pools::Issuer).string().null())
                    .col(ColumnDef::new(Pools::Description).text().null())
                    .col(ColumnDef::new(Pools::RiskLevel).string().null())
                    .col(ColumnDef::new(Pools::InstrumentType).string().not_null())
                    // Amounts are decimal strings
                    .col(ColumnDef::new(Pools::TargetRaise).string().not_null())
                    .col(ColumnDef::new(Pools::TotalRaised).string().not_null())
                    .col(ColumnDef::new(Pools::ActualInvested).string().null())
                    .col(ColumnDef::new(Pools::MinInvestment).string().null())
                    .col(ColumnDef::new(Pools::DiscountRate).integer().null())
                    .col(ColumnDef::new(Pools::CouponRates).json_binary().not_null())
                    .col(ColumnDef::new(Pools::CouponDates).json_binary().not_null())
                    .col(
                        ColumnDef::new(Pools::EpochEndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pools::MaturityDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Pools::Status).string().not_null())
                    .col(ColumnDef::new(Pools::ApprovalStatus).string().not_null())
                    // No foreign key: pools outlive a deleted creator
                    .col(ColumnDef::new(Pools::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Pools::ApprovedBy).uuid().null())
                    .col(ColumnDef::new(Pools::RejectionReason).text().null())
                    .col(ColumnDef::new(Pools::IsActive).boolean().not_null())
                    .col(
                        ColumnDef::new(Pools::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pools::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pools_contract_address")
                    .table(Pools::Table)
                    .col(Pools::ContractAddress)
                    .unique()
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_pools_status", Pools::Status),
            ("idx_pools_approval_status", Pools::ApprovalStatus),
            ("idx_pools_created_by", Pools::CreatedBy),
            ("idx_pools_maturity_date", Pools::MaturityDate),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Pools::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pools::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Pools {
    Table,
    Id,
    ContractAddress,
    ManagerAddress,
    EscrowAddress,
    Name,
    Symbol,
    Asset,
    Issuer,
    Description,
    RiskLevel,
    InstrumentType,
    TargetRaise,
    TotalRaised,
    ActualInvested,
    MinInvestment,
    DiscountRate,
    CouponRates,
    CouponDates,
    EpochEndTime,
    MaturityDate,
    Status,
    ApprovalStatus,
    CreatedBy,
    ApprovedBy,
    RejectionReason,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
