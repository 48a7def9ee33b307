// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::task_service::TaskService;
use crate::engines::proxy_router::ProxyRouter;
use crate::presentation::handlers::{cron_handler, proxy_handler, task_handler};
use crate::queue::scheduler::CronScheduler;
use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 参数
///
/// * `task_service` - 任务服务
/// * `scheduler` - 定时任务调度器
/// * `proxy_router` - 代理路由器
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(
    task_service: Arc<TaskService>,
    scheduler: Arc<CronScheduler>,
    proxy_router: Arc<ProxyRouter>,
) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let owner_routes = Router::new()
        .route(
            "/v1/tasks",
            post(task_handler::create_task).get(task_handler::list_tasks),
        )
        .route("/v1/tasks/{id}", get(task_handler::get_task))
        .route(
            "/v1/cron-jobs",
            post(cron_handler::create_cron_job).get(cron_handler::list_cron_jobs),
        )
        .route(
            "/v1/cron-jobs/{id}",
            delete(cron_handler::delete_cron_job).patch(cron_handler::set_cron_job_active),
        )
        .route(
            "/v1/cron-executions",
            get(cron_handler::list_cron_executions),
        )
        .route("/v1/proxy/stats", get(proxy_handler::get_proxy_stats))
        .route(
            "/v1/proxy/stats/reset",
            post(proxy_handler::reset_proxy_stats),
        );

    Router::new()
        .merge(public_routes)
        .merge(owner_routes)
        .layer(Extension(task_service))
        .layer(Extension(scheduler))
        .layer(Extension(proxy_router))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
