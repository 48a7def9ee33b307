// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::task::{ScrapeSummary, SearchParams, Task, TaskStatus};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::infrastructure::database::entities::task as task_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 任务仓库实现
///
/// 基于SeaORM实现的任务数据访问层
#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<task_entity::Model> for Task {
    type Error = RepositoryError;

    fn try_from(model: task_entity::Model) -> Result<Self, Self::Error> {
        let params: SearchParams = serde_json::from_value(model.params).map_err(|e| {
            RepositoryError::Corrupted(format!("task {} params: {}", model.id, e))
        })?;
        let result: Option<ScrapeSummary> = model
            .result
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| RepositoryError::Corrupted(format!("task {} result: {}", model.id, e)))?;
        let status: TaskStatus = model.status.parse().map_err(|_| {
            RepositoryError::Corrupted(format!("task {} status '{}'", model.id, model.status))
        })?;

        Ok(Self {
            id: model.id,
            owner_id: model.owner_id,
            params,
            status,
            created_at: model.created_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            error_message: model.error_message,
            result,
            updated_at: model.updated_at,
        })
    }
}

fn to_active_model(task: &Task) -> Result<task_entity::ActiveModel, RepositoryError> {
    let params = serde_json::to_value(&task.params)
        .map_err(|e| RepositoryError::Corrupted(e.to_string()))?;
    let result = task
        .result
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| RepositoryError::Corrupted(e.to_string()))?;

    Ok(task_entity::ActiveModel {
        id: Set(task.id),
        owner_id: Set(task.owner_id),
        params: Set(params),
        status: Set(task.status.to_string()),
        error_message: Set(task.error_message.clone()),
        result: Set(result),
        created_at: Set(task.created_at),
        started_at: Set(task.started_at),
        completed_at: Set(task.completed_at),
        updated_at: Set(task.updated_at),
    })
}

fn into_tasks(models: Vec<task_entity::Model>) -> Result<Vec<Task>, RepositoryError> {
    models.into_iter().map(Task::try_from).collect()
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    async fn create(&self, task: &Task) -> Result<Task, RepositoryError> {
        let model = to_active_model(task)?;

        model.insert(self.db.as_ref()).await?;
        Ok(task.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError> {
        let model = task_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(Task::try_from).transpose()
    }

    async fn update(&self, task: &Task) -> Result<Task, RepositoryError> {
        let mut model = to_active_model(task)?;
        // 主键与归属不随更新变化
        model.owner_id = sea_orm::ActiveValue::NotSet;
        model.created_at = sea_orm::ActiveValue::NotSet;

        let updated_model = model.update(self.db.as_ref()).await?;
        updated_model.try_into()
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, RepositoryError> {
        let models = task_entity::Entity::find()
            .filter(task_entity::Column::OwnerId.eq(owner_id))
            .order_by_desc(task_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        into_tasks(models)
    }

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, RepositoryError> {
        let models = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(status.to_string()))
            .order_by_asc(task_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        into_tasks(models)
    }
}
