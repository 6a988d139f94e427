//! Migration: Create admin_actions table (append-only audit log).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminActions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdminActions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AdminActions::AdminId).uuid().not_null())
                    .col(ColumnDef::new(AdminActions::Action).string().not_null())
                    .col(ColumnDef::new(AdminActions::TargetId).string().not_null())
                    .col(ColumnDef::new(AdminActions::TargetType).string().not_null())
                    .col(ColumnDef::new(AdminActions::Details).json_binary().not_null())
                    .col(
                        ColumnDef::new(AdminActions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_actions_admin_id")
                    .table(AdminActions::Table)
                    .col(AdminActions::AdminId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_actions_action")
                    .table(AdminActions::Table)
                    .col(AdminActions::Action)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_actions_target")
                    .table(AdminActions::Table)
                    .col(AdminActions::TargetType)
                    .col(AdminActions::TargetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_actions_created_at")
                    .table(AdminActions::Table)
                    .col(AdminActions::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminActions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AdminActions {
    Table,
    Id,
    AdminId,
    Action,
    TargetId,
    TargetType,
    Details,
    CreatedAt,
}
