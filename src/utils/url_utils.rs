// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 规范化职位详情页URL
///
/// 去掉查询串与片段（跟踪参数）、结尾的斜杠，主机名小写。
/// 只接受 http/https 链接。
pub fn normalize_detail_url(base_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut url = resolve_url(base_url, href).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    url.set_query(None);
    url.set_fragment(None);

    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);

    // Url 解析时已经将主机名转为小写
    let normalized = url.to_string();
    Some(normalized.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.linkedin.com/jobs/search").unwrap()
    }

    #[test]
    fn test_resolve_root_relative_url() {
        let base = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "/c").unwrap().as_str(),
            "http://example.com/c"
        );
    }

    #[test]
    fn test_normalize_strips_tracking_parameters() {
        let url = normalize_detail_url(
            &base(),
            "https://WWW.LinkedIn.com/jobs/view/rust-engineer-123/?refId=abc&trackingId=xyz#top",
        );
        assert_eq!(
            url.as_deref(),
            Some("https://www.linkedin.com/jobs/view/rust-engineer-123")
        );
    }

    #[test]
    fn test_normalize_resolves_relative_links() {
        let url = normalize_detail_url(&base(), "/jobs/view/42?position=1");
        assert_eq!(url.as_deref(), Some("https://www.linkedin.com/jobs/view/42"));
    }

    #[test]
    fn test_normalize_rejects_non_http_links() {
        assert!(normalize_detail_url(&base(), "javascript:void(0)").is_none());
        assert!(normalize_detail_url(&base(), "mailto:jobs@example.com").is_none());
        assert!(normalize_detail_url(&base(), "   ").is_none());
    }
}
