// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::models::task::SearchParams;

/// 订阅等级
///
/// 决定每日积分额度与定时任务槽位上限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
    Unlimited,
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Free, PlanTier::Pro, PlanTier::Unlimited];

    /// 每日积分额度，None 表示不限量
    pub fn daily_credits(&self) -> Option<i64> {
        match self {
            PlanTier::Free => Some(5),
            PlanTier::Pro => Some(50),
            PlanTier::Unlimited => None,
        }
    }

    /// 默认的定时任务槽位上限
    pub fn default_max_cron_jobs(&self) -> i32 {
        match self {
            PlanTier::Free => 1,
            PlanTier::Pro => 3,
            PlanTier::Unlimited => 10,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlanTier::Free => write!(f, "free"),
            PlanTier::Pro => write!(f, "pro"),
            PlanTier::Unlimited => write!(f, "unlimited"),
        }
    }
}

impl FromStr for PlanTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "unlimited" => Ok(PlanTier::Unlimited),
            _ => Err(()),
        }
    }
}

/// 积分余额
///
/// 不限量套餐使用显式的 Unlimited 变体，而不是一个很大的哨兵数值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "remaining", rename_all = "snake_case")]
pub enum CreditBalance {
    Limited(i64),
    Unlimited,
}

impl CreditBalance {
    /// 是否还能消耗一次积分
    pub fn has_remaining(&self) -> bool {
        match self {
            CreditBalance::Limited(n) => *n > 0,
            CreditBalance::Unlimited => true,
        }
    }
}

/// 用户/套餐信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerProfile {
    pub owner_id: Uuid,
    pub plan: PlanTier,
    pub credits: CreditBalance,
    pub max_cron_jobs: i32,
    /// 定时任务使用的保存搜索
    pub saved_search: Option<SearchParams>,
}

impl OwnerProfile {
    /// 按套餐默认值创建用户信息，积分为满额
    pub fn new(owner_id: Uuid, plan: PlanTier) -> Self {
        Self {
            owner_id,
            plan,
            credits: match plan.daily_credits() {
                Some(n) => CreditBalance::Limited(n),
                None => CreditBalance::Unlimited,
            },
            max_cron_jobs: plan.default_max_cron_jobs(),
            saved_search: None,
        }
    }

    pub fn with_credits(mut self, credits: i64) -> Self {
        if self.plan.daily_credits().is_some() {
            self.credits = CreditBalance::Limited(credits);
        }
        self
    }

    pub fn with_max_cron_jobs(mut self, max: i32) -> Self {
        self.max_cron_jobs = max;
        self
    }

    pub fn with_saved_search(mut self, params: SearchParams) -> Self {
        self.saved_search = Some(params);
        self
    }
}
