// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::listing::ScrapedListing;

/// 职位相关性过滤器
///
/// 标题白名单、标题黑名单与公司黑名单，均为不区分大小写的子串匹配。
/// 白名单为空时放行所有标题。
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    title_allow: Vec<String>,
    title_deny: Vec<String>,
    company_deny: Vec<String>,
}

impl ListingFilter {
    pub fn new(title_allow: Vec<String>, title_deny: Vec<String>, company_deny: Vec<String>) -> Self {
        Self {
            title_allow: normalize_terms(title_allow),
            title_deny: normalize_terms(title_deny),
            company_deny: normalize_terms(company_deny),
        }
    }

    /// 不做任何过滤
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn accepts(&self, listing: &ScrapedListing) -> bool {
        let title = listing.title.to_lowercase();
        let company = listing.company.to_lowercase();

        if !self.title_allow.is_empty() && !self.title_allow.iter().any(|t| title.contains(t)) {
            return false;
        }
        if self.title_deny.iter().any(|t| title.contains(t)) {
            return false;
        }
        !self.company_deny.iter().any(|c| company.contains(c))
    }

    /// 保留通过过滤的职位
    pub fn apply(&self, listings: Vec<ScrapedListing>) -> Vec<ScrapedListing> {
        listings.into_iter().filter(|l| self.accepts(l)).collect()
    }
}

fn normalize_terms(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, company: &str) -> ScrapedListing {
        ScrapedListing {
            title: title.to_string(),
            company: company.to_string(),
            location: None,
            url: "https://www.linkedin.com/jobs/view/1".to_string(),
            posted_date: None,
        }
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = ListingFilter::allow_all();
        assert!(filter.accepts(&listing("Anything", "Anyone")));
    }

    #[test]
    fn test_allow_and_deny_lists() {
        let filter = ListingFilter::new(
            vec!["Rust".into(), "backend".into()],
            vec!["Senior Staff".into()],
            vec!["  Acme Recruiting ".into(), "".into()],
        );

        assert!(filter.accepts(&listing("Rust Engineer", "Globex")));
        assert!(filter.accepts(&listing("Backend Developer", "Initech")));
        assert!(!filter.accepts(&listing("Frontend Developer", "Globex")));
        assert!(!filter.accepts(&listing("Senior Staff Rust Engineer", "Globex")));
        assert!(!filter.accepts(&listing("Rust Engineer", "ACME Recruiting Ltd")));
    }
}
