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

use crate::engines::traits::{FetchRequest, FetchResponse, HttpTransport, TransportError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// 浏览器风格的静态请求头
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(reqwest::header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(reqwest::header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    headers
}

/// 基于reqwest实现的HTTP传输
///
/// 同一个类型提供直连与代理两种实现，客户端在构造时创建并复用
pub struct ReqwestTransport {
    client: reqwest::Client,
    name: String,
}

impl ReqwestTransport {
    /// 创建直连传输
    pub fn direct() -> Result<Self, TransportError> {
        let client = Self::builder().build()?;
        Ok(Self {
            client,
            name: "direct".to_string(),
        })
    }

    /// 创建经由代理的传输
    ///
    /// # 参数
    ///
    /// * `proxy_url` - 代理地址，可以包含认证信息
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestTransport)` - 代理传输
    /// * `Err(TransportError::InvalidConfig)` - 代理地址无效
    pub fn proxied(proxy_url: &str) -> Result<Self, TransportError> {
        let parsed = url::Url::parse(proxy_url)
            .map_err(|e| TransportError::InvalidConfig(format!("Invalid proxy: {}", e)))?;
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| TransportError::InvalidConfig(format!("Invalid proxy: {}", e)))?;

        let client = Self::builder().proxy(proxy).build()?;

        // 名称中不包含认证信息
        let name = match (parsed.host_str(), parsed.port_or_known_default()) {
            (Some(host), Some(port)) => format!("proxy:{}:{}", host, port),
            (Some(host), None) => format!("proxy:{}", host),
            _ => "proxy".to_string(),
        };

        Ok(Self { client, name })
    }

    fn builder() -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(browser_headers())
            .cookie_store(true)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError> {
        let mut headers = HeaderMap::new();
        for (k, v) in &request.headers {
            if let (Ok(k), Ok(v)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                headers.insert(k, v);
            }
        }

        let response = self
            .client
            .get(&request.url)
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await?;

        let status_code = response.status().as_u16();
        debug!(transport = %self.name, status = status_code, url = %request.url, "fetch finished");

        if status_code == 407 {
            return Err(TransportError::ProxyAuth);
        }
        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: status_code,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(FetchResponse {
            status_code,
            body,
            transport: self.name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
