// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::proxy_router::{ProxyRouter, ProxyStats};
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// 代理统计响应
#[derive(Debug, Serialize)]
pub struct ProxyStatsResponse {
    #[serde(flatten)]
    pub stats: ProxyStats,
    pub proxy_configured: bool,
    /// 按流量估算的代理费用
    pub estimated_cost: f64,
}

pub async fn get_proxy_stats(
    Extension(router): Extension<Arc<ProxyRouter>>,
) -> Json<ProxyStatsResponse> {
    Json(ProxyStatsResponse {
        stats: router.stats(),
        proxy_configured: router.has_proxy(),
        estimated_cost: router.estimated_cost(),
    })
}

pub async fn reset_proxy_stats(Extension(router): Extension<Arc<ProxyRouter>>) -> StatusCode {
    router.reset_stats();
    StatusCode::NO_CONTENT
}
