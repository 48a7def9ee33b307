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

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// 上游站点用于拦截抓取的非标准状态码
pub const STATUS_UPSTREAM_BLOCKED: u16 = 999;

/// 传输层错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    /// 非 2xx 响应
    #[error("Unexpected status: {status}")]
    Status { status: u16 },
    /// 代理认证失败 (407)
    #[error("Proxy authentication failed")]
    ProxyAuth,
    /// 连接失败
    #[error("Connection failed: {0}")]
    Connect(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 其他请求错误
    #[error("Request failed: {0}")]
    Request(String),
    /// 读取响应体失败
    #[error("Failed to read body: {0}")]
    Body(String),
    /// 传输配置无效（例如代理 URL 格式错误）
    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(String),
}

impl TransportError {
    /// 判断错误是否属于代理层错误，可以改走直连
    ///
    /// 代理认证失败、上游拦截状态（403 / 429 / 999）、连接失败与超时
    pub fn should_fallback(&self) -> bool {
        match self {
            TransportError::ProxyAuth | TransportError::Connect(_) | TransportError::Timeout => {
                true
            }
            TransportError::Status { status } => {
                matches!(*status, 403 | 407 | 429 | STATUS_UPSTREAM_BLOCKED)
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            TransportError::Body(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidConfig(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// 抓取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 额外请求头，覆盖传输层的默认请求头
    pub headers: HashMap<String, String>,
    /// 超时时间
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout,
        }
    }
}

/// 抓取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub body: String,
    /// 实际使用的传输通道
    pub transport: String,
}

/// HTTP 传输特质
///
/// 直连与代理是同一接口的两种实现
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 发送请求，非 2xx 响应返回 `TransportError::Status`
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError>;

    /// 传输通道标识
    fn name(&self) -> &str;
}
