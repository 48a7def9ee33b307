// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册指标说明。地址被占用时只记录警告。
pub fn init_metrics(addr: SocketAddr) {
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!("proxy_requests_total", "Fetch attempts by transport");
    describe_counter!(
        "proxy_fallbacks_total",
        "Proxied requests retried through the direct transport"
    );
    describe_counter!("proxy_failures_total", "Requests that failed on every path");
    describe_counter!("proxy_bytes_total", "Response bytes received by transport");
    describe_counter!("scrape_tasks_total", "Scrape tasks processed by outcome");
    describe_histogram!(
        "scrape_task_duration_seconds",
        "Duration of scrape tasks in seconds"
    );
    describe_counter!("listings_inserted_total", "New listings persisted");
    describe_counter!("cron_executions_total", "Cron executions by outcome");
}
