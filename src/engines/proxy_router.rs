// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{FetchRequest, FetchResponse, HttpTransport, TransportError};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

const BYTES_PER_GB: f64 = 1_000_000_000.0;

/// 代理使用统计快照
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProxyStats {
    /// 请求总数（每次调用计一次，与最终走哪条通道无关）
    pub total_requests: u64,
    /// 最终失败的请求数
    pub failed_requests: u64,
    /// 经由代理发出的尝试数
    pub proxied_requests: u64,
    /// 直连发出的尝试数
    pub direct_requests: u64,
    /// 代理失败后改走直连的次数
    pub fallbacks: u64,
    /// 成功响应的字节数
    pub bytes_transferred: u64,
    pub last_used: Option<DateTime<Utc>>,
    /// 成功率 (0.0 - 1.0)
    pub success_rate: f64,
}

#[derive(Default)]
struct Counters {
    total_requests: AtomicU64,
    failed_requests: AtomicU64,
    proxied_requests: AtomicU64,
    direct_requests: AtomicU64,
    fallbacks: AtomicU64,
    bytes_transferred: AtomicU64,
    last_used: parking_lot::Mutex<Option<DateTime<Utc>>>,
}

/// 代理路由器
///
/// 优先经由代理发出请求，遇到代理层错误时透明地改走直连，
/// 调用方看到的接口与结果完全一致。同时负责用量计量。
pub struct ProxyRouter {
    /// 代理传输，未配置代理时为 None
    proxy: Option<Arc<dyn HttpTransport>>,
    /// 直连传输
    direct: Arc<dyn HttpTransport>,
    /// 每 GB 流量价格
    price_per_gb: f64,
    counters: Counters,
}

impl ProxyRouter {
    /// 创建新的代理路由器
    ///
    /// # 参数
    ///
    /// * `proxy` - 代理传输，None 表示只使用直连
    /// * `direct` - 直连传输
    /// * `price_per_gb` - 每 GB 流量价格，用于估算成本
    pub fn new(
        proxy: Option<Arc<dyn HttpTransport>>,
        direct: Arc<dyn HttpTransport>,
        price_per_gb: f64,
    ) -> Self {
        Self {
            proxy,
            direct,
            price_per_gb,
            counters: Counters::default(),
        }
    }

    /// 只使用直连的路由器
    pub fn direct_only(direct: Arc<dyn HttpTransport>) -> Self {
        Self::new(None, direct, 0.0)
    }

    pub fn has_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// 发送请求
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 代理或直连的响应，`transport` 字段标明实际通道
    /// * `Err(TransportError)` - 代理不可回退的错误，或直连失败
    pub async fn request(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError> {
        self.counters.total_requests.fetch_add(1, Ordering::Relaxed);
        *self.counters.last_used.lock() = Some(Utc::now());

        if let Some(proxy) = &self.proxy {
            self.counters.proxied_requests.fetch_add(1, Ordering::Relaxed);
            counter!("proxy_requests_total", "transport" => "proxy").increment(1);

            match proxy.fetch(request).await {
                Ok(response) => return Ok(self.record_success(response)),
                Err(e) if e.should_fallback() => {
                    warn!(
                        transport = proxy.name(),
                        error = %e,
                        url = %request.url,
                        "Proxy request failed, falling back to direct"
                    );
                    self.counters.fallbacks.fetch_add(1, Ordering::Relaxed);
                    counter!("proxy_fallbacks_total").increment(1);
                }
                Err(e) => return Err(self.record_failure(e)),
            }
        }

        self.counters.direct_requests.fetch_add(1, Ordering::Relaxed);
        counter!("proxy_requests_total", "transport" => "direct").increment(1);

        match self.direct.fetch(request).await {
            Ok(response) => Ok(self.record_success(response)),
            Err(e) => Err(self.record_failure(e)),
        }
    }

    fn record_success(&self, response: FetchResponse) -> FetchResponse {
        let bytes = response.body.len() as u64;
        self.counters
            .bytes_transferred
            .fetch_add(bytes, Ordering::Relaxed);
        counter!("proxy_bytes_total", "transport" => response.transport.clone()).increment(bytes);
        debug!(transport = %response.transport, bytes, "Request succeeded");
        response
    }

    fn record_failure(&self, error: TransportError) -> TransportError {
        self.counters.failed_requests.fetch_add(1, Ordering::Relaxed);
        counter!("proxy_failures_total").increment(1);
        error
    }

    /// 获取统计快照
    pub fn stats(&self) -> ProxyStats {
        let total = self.counters.total_requests.load(Ordering::Relaxed);
        let failed = self.counters.failed_requests.load(Ordering::Relaxed);
        let success_rate = if total == 0 {
            1.0
        } else {
            total.saturating_sub(failed) as f64 / total as f64
        };

        ProxyStats {
            total_requests: total,
            failed_requests: failed,
            proxied_requests: self.counters.proxied_requests.load(Ordering::Relaxed),
            direct_requests: self.counters.direct_requests.load(Ordering::Relaxed),
            fallbacks: self.counters.fallbacks.load(Ordering::Relaxed),
            bytes_transferred: self.counters.bytes_transferred.load(Ordering::Relaxed),
            last_used: *self.counters.last_used.lock(),
            success_rate,
        }
    }

    /// 估算流量成本：字节数 / 1e9 × 每 GB 价格
    pub fn estimated_cost(&self) -> f64 {
        let bytes = self.counters.bytes_transferred.load(Ordering::Relaxed);
        bytes as f64 / BYTES_PER_GB * self.price_per_gb
    }

    /// 清零所有计数器
    pub fn reset_stats(&self) {
        self.counters.total_requests.store(0, Ordering::Relaxed);
        self.counters.failed_requests.store(0, Ordering::Relaxed);
        self.counters.proxied_requests.store(0, Ordering::Relaxed);
        self.counters.direct_requests.store(0, Ordering::Relaxed);
        self.counters.fallbacks.store(0, Ordering::Relaxed);
        self.counters.bytes_transferred.store(0, Ordering::Relaxed);
        *self.counters.last_used.lock() = None;
    }
}

#[cfg(test)]
#[path = "proxy_router_test.rs"]
mod tests;
