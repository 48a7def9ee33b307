// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 任务（task）：一次临时抓取请求及其搜索参数
/// - 定时任务（cron）：用户的每日时间槽及其执行记录
/// - 职位（listing）：规范化后的职位信息
/// - 用户（owner）：套餐等级与积分余额
pub mod cron;
pub mod listing;
pub mod owner;
pub mod task;
