// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::models::task::{DomainError, ScrapeSummary};

/// 每日时间槽
///
/// 格式固定为 `HH:MM`，按 UTC 解释
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeSlot {
    hour: u32,
    minute: u32,
}

impl TimeSlot {
    pub fn new(hour: u32, minute: u32) -> Result<Self, DomainError> {
        if hour > 23 || minute > 59 {
            return Err(DomainError::ValidationError(format!(
                "invalid time slot {:02}:{:02}",
                hour, minute
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// 计算严格晚于 `now` 的下一次触发时间
    ///
    /// 今天的时间槽已经过去（或恰好等于当前时刻）时顺延一天
    pub fn next_occurrence_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN);
        let today = now.date_naive().and_time(time).and_utc();
        if today > now {
            today
        } else {
            today + Duration::days(1)
        }
    }

    /// tokio-cron-scheduler 使用的六段式 cron 表达式（秒 分 时 日 月 周）
    pub fn cron_expression(&self) -> String {
        format!("0 {} {} * * *", self.minute, self.hour)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || DomainError::ValidationError(format!("time slot must be HH:MM, got '{}'", s));

        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.chars().chain(m.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour = h.parse::<u32>().map_err(|_| invalid())?;
        let minute = m.parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 定时任务
///
/// 每个用户的一个每日执行时间槽
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronJob {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub time_slot: TimeSlot,
    pub is_active: bool,
    pub last_run: Option<DateTime<FixedOffset>>,
    pub next_run: Option<DateTime<FixedOffset>>,
    pub run_count: i32,
    pub error_count: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl CronJob {
    pub fn new(owner_id: Uuid, time_slot: TimeSlot, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            time_slot,
            is_active: true,
            last_run: None,
            next_run: Some(time_slot.next_occurrence_after(now).into()),
            run_count: 0,
            error_count: 0,
            last_error: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    /// 是否到期：处于激活状态且 next_run 已过（或从未计算过）
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self
                .next_run
                .map_or(true, |next| next.with_timezone(&Utc) <= now)
    }

    /// 记录一次成功执行并重新计算下一次触发时间
    pub fn record_success(&mut self, fired_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.run_count += 1;
        self.last_error = None;
        self.reschedule(fired_at, now);
    }

    /// 记录一次失败执行并重新计算下一次触发时间
    pub fn record_failure(&mut self, error: &str, fired_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.error_count += 1;
        self.last_error = Some(error.to_string());
        self.reschedule(fired_at, now);
    }

    fn reschedule(&mut self, fired_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.last_run = Some(fired_at.into());
        self.next_run = Some(self.time_slot.next_occurrence_after(now).into());
        self.updated_at = now.into();
    }
}

/// 定时任务执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionStatus::Pending => write!(f, "pending"),
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for ExecutionStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ExecutionStatus::Pending),
            "running" => Ok(ExecutionStatus::Running),
            "completed" => Ok(ExecutionStatus::Completed),
            "failed" => Ok(ExecutionStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 定时任务的一次执行记录，终态后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronExecution {
    pub id: Uuid,
    pub cron_job_id: Uuid,
    pub owner_id: Uuid,
    pub status: ExecutionStatus,
    /// 触发时间
    pub started_at: DateTime<FixedOffset>,
    pub finished_at: Option<DateTime<FixedOffset>>,
    pub jobs_found: i32,
    pub jobs_added: i32,
    pub duration_ms: Option<i64>,
    /// 实际使用的代理/直连标识
    pub proxy_used: Option<String>,
    pub error_message: Option<String>,
}

impl CronExecution {
    pub fn new(cron_job_id: Uuid, owner_id: Uuid, fired_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cron_job_id,
            owner_id,
            status: ExecutionStatus::Pending,
            started_at: fired_at.into(),
            finished_at: None,
            jobs_found: 0,
            jobs_added: 0,
            duration_ms: None,
            proxy_used: None,
            error_message: None,
        }
    }

    pub fn mark_running(&mut self) {
        if self.status == ExecutionStatus::Pending {
            self.status = ExecutionStatus::Running;
        }
    }

    pub fn complete(&mut self, summary: &ScrapeSummary, now: DateTime<Utc>) {
        if self.is_terminal() {
            return;
        }
        self.status = ExecutionStatus::Completed;
        self.jobs_found = summary.jobs_found as i32;
        self.jobs_added = summary.jobs_added as i32;
        self.proxy_used = summary.transport.clone();
        self.finish(now);
    }

    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        if self.is_terminal() {
            return;
        }
        self.status = ExecutionStatus::Failed;
        self.error_message = Some(message.into());
        self.finish(now);
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ExecutionStatus::Completed | ExecutionStatus::Failed
        )
    }

    fn finish(&mut self, now: DateTime<Utc>) {
        let started = self.started_at.with_timezone(&Utc);
        self.duration_ms = Some((now - started).num_milliseconds().max(0));
        self.finished_at = Some(now.into());
    }
}
