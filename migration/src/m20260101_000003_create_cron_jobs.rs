use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CronJobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CronJobs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CronJobs::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(CronJobs::TimeSlot).string_len(5).not_null())
                    .col(
                        ColumnDef::new(CronJobs::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(CronJobs::LastRun).timestamp_with_time_zone())
                    .col(ColumnDef::new(CronJobs::NextRun).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(CronJobs::RunCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CronJobs::ErrorCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CronJobs::LastError).text())
                    .col(
                        ColumnDef::new(CronJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CronJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个用户的时间槽唯一
        manager
            .create_index(
                Index::create()
                    .name("idx_cron_jobs_owner_slot")
                    .table(CronJobs::Table)
                    .col(CronJobs::OwnerId)
                    .col(CronJobs::TimeSlot)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CronJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CronJobs {
    Table,
    Id,
    OwnerId,
    TimeSlot,
    IsActive,
    LastRun,
    NextRun,
    RunCount,
    ErrorCount,
    LastError,
    CreatedAt,
    UpdatedAt,
}
