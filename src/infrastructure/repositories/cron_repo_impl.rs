// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::cron::{CronExecution, CronJob, TimeSlot};
use crate::domain::repositories::cron_repository::CronRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::{cron_execution, cron_job};
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use std::sync::Arc;
use uuid::Uuid;

/// 定时任务仓库实现
#[derive(Clone)]
pub struct CronRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl CronRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<cron_job::Model> for CronJob {
    type Error = RepositoryError;

    fn try_from(model: cron_job::Model) -> Result<Self, Self::Error> {
        let time_slot: TimeSlot = model.time_slot.parse().map_err(|_| {
            RepositoryError::Corrupted(format!(
                "cron job {} time slot '{}'",
                model.id, model.time_slot
            ))
        })?;

        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            time_slot,
            is_active: model.is_active,
            last_run: model.last_run,
            next_run: model.next_run,
            run_count: model.run_count,
            error_count: model.error_count,
            last_error: model.last_error,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&CronJob> for cron_job::ActiveModel {
    fn from(job: &CronJob) -> Self {
        Self {
            id: Set(job.id),
            owner_id: Set(job.owner_id),
            time_slot: Set(job.time_slot.to_string()),
            is_active: Set(job.is_active),
            last_run: Set(job.last_run),
            next_run: Set(job.next_run),
            run_count: Set(job.run_count),
            error_count: Set(job.error_count),
            last_error: Set(job.last_error.clone()),
            created_at: Set(job.created_at),
            updated_at: Set(job.updated_at),
        }
    }
}

impl TryFrom<cron_execution::Model> for CronExecution {
    type Error = RepositoryError;

    fn try_from(model: cron_execution::Model) -> Result<Self, Self::Error> {
        let status = model.status.parse().map_err(|_| {
            RepositoryError::Corrupted(format!(
                "cron execution {} status '{}'",
                model.id, model.status
            ))
        })?;

        Ok(Self {
            id: model.id,
            cron_job_id: model.cron_job_id,
            owner_id: model.owner_id,
            status,
            started_at: model.started_at,
            finished_at: model.finished_at,
            jobs_found: model.jobs_found,
            jobs_added: model.jobs_added,
            duration_ms: model.duration_ms,
            proxy_used: model.proxy_used,
            error_message: model.error_message,
        })
    }
}

impl From<&CronExecution> for cron_execution::ActiveModel {
    fn from(execution: &CronExecution) -> Self {
        Self {
            id: Set(execution.id),
            cron_job_id: Set(execution.cron_job_id),
            owner_id: Set(execution.owner_id),
            status: Set(execution.status.to_string()),
            started_at: Set(execution.started_at),
            finished_at: Set(execution.finished_at),
            jobs_found: Set(execution.jobs_found),
            jobs_added: Set(execution.jobs_added),
            duration_ms: Set(execution.duration_ms),
            proxy_used: Set(execution.proxy_used.clone()),
            error_message: Set(execution.error_message.clone()),
        }
    }
}

fn map_unique_violation(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepositoryError::Conflict(detail),
        _ => RepositoryError::Database(err),
    }
}

fn into_jobs(models: Vec<cron_job::Model>) -> Result<Vec<CronJob>, RepositoryError> {
    models.into_iter().map(CronJob::try_from).collect()
}

#[async_trait]
impl CronRepository for CronRepositoryImpl {
    async fn create_job(&self, job: &CronJob) -> Result<CronJob, RepositoryError> {
        let model: cron_job::ActiveModel = job.into();
        model
            .insert(self.db.as_ref())
            .await
            .map_err(map_unique_violation)?;
        Ok(job.clone())
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<CronJob>, RepositoryError> {
        cron_job::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(CronJob::try_from)
            .transpose()
    }

    async fn update_job(&self, job: &CronJob) -> Result<CronJob, RepositoryError> {
        let mut model: cron_job::ActiveModel = job.into();
        model.owner_id = NotSet;
        model.created_at = NotSet;

        let updated = model
            .update(self.db.as_ref())
            .await
            .map_err(map_unique_violation)?;
        updated.try_into()
    }

    async fn record_run(&self, job: &CronJob) -> Result<bool, RepositoryError> {
        let result = cron_job::Entity::update_many()
            .col_expr(cron_job::Column::RunCount, Expr::value(job.run_count))
            .col_expr(cron_job::Column::ErrorCount, Expr::value(job.error_count))
            .col_expr(cron_job::Column::LastError, Expr::value(job.last_error.clone()))
            .col_expr(cron_job::Column::LastRun, Expr::value(job.last_run))
            .col_expr(cron_job::Column::NextRun, Expr::value(job.next_run))
            .col_expr(cron_job::Column::UpdatedAt, Expr::value(job.updated_at))
            .filter(cron_job::Column::Id.eq(job.id))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = cron_job::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_jobs_by_owner(&self, owner_id: Uuid) -> Result<Vec<CronJob>, RepositoryError> {
        let models = cron_job::Entity::find()
            .filter(cron_job::Column::OwnerId.eq(owner_id))
            .order_by_asc(cron_job::Column::TimeSlot)
            .all(self.db.as_ref())
            .await?;
        into_jobs(models)
    }

    async fn find_active_jobs(&self) -> Result<Vec<CronJob>, RepositoryError> {
        let models = cron_job::Entity::find()
            .filter(cron_job::Column::IsActive.eq(true))
            .order_by_asc(cron_job::Column::TimeSlot)
            .all(self.db.as_ref())
            .await?;
        into_jobs(models)
    }

    async fn count_jobs_by_owner(&self, owner_id: Uuid) -> Result<u64, RepositoryError> {
        let count = cron_job::Entity::find()
            .filter(cron_job::Column::OwnerId.eq(owner_id))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    async fn find_job_by_owner_and_slot(
        &self,
        owner_id: Uuid,
        slot: TimeSlot,
    ) -> Result<Option<CronJob>, RepositoryError> {
        cron_job::Entity::find()
            .filter(cron_job::Column::OwnerId.eq(owner_id))
            .filter(cron_job::Column::TimeSlot.eq(slot.to_string()))
            .one(self.db.as_ref())
            .await?
            .map(CronJob::try_from)
            .transpose()
    }

    async fn create_execution(
        &self,
        execution: &CronExecution,
    ) -> Result<CronExecution, RepositoryError> {
        let model: cron_execution::ActiveModel = execution.into();
        model.insert(self.db.as_ref()).await?;
        Ok(execution.clone())
    }

    async fn update_execution(
        &self,
        execution: &CronExecution,
    ) -> Result<CronExecution, RepositoryError> {
        let mut model: cron_execution::ActiveModel = execution.into();
        model.cron_job_id = NotSet;
        model.owner_id = NotSet;

        let updated = model.update(self.db.as_ref()).await?;
        updated.try_into()
    }

    async fn list_executions(
        &self,
        owner_id: Uuid,
        limit: u64,
    ) -> Result<Vec<CronExecution>, RepositoryError> {
        let models = cron_execution::Entity::find()
            .filter(cron_execution::Column::OwnerId.eq(owner_id))
            .order_by_desc(cron_execution::Column::StartedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        models.into_iter().map(CronExecution::try_from).collect()
    }
}
