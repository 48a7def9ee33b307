use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Executions outlive their cron job, so no foreign key here
        manager
            .create_table(
                Table::create()
                    .table(CronExecutions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CronExecutions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CronExecutions::CronJobId).uuid().not_null())
                    .col(ColumnDef::new(CronExecutions::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(CronExecutions::Status).string().not_null())
                    .col(
                        ColumnDef::new(CronExecutions::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CronExecutions::FinishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(CronExecutions::JobsFound)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CronExecutions::JobsAdded)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CronExecutions::DurationMs).big_integer())
                    .col(ColumnDef::new(CronExecutions::ProxyUsed).string())
                    .col(ColumnDef::new(CronExecutions::ErrorMessage).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cron_executions_owner_started")
                    .table(CronExecutions::Table)
                    .col(CronExecutions::OwnerId)
                    .col(CronExecutions::StartedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CronExecutions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CronExecutions {
    Table,
    Id,
    CronJobId,
    OwnerId,
    Status,
    StartedAt,
    FinishedAt,
    JobsFound,
    JobsAdded,
    DurationMs,
    ProxyUsed,
    ErrorMessage,
}
