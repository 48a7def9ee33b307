// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 任务仓库（task_repository）：临时抓取任务的持久化
/// - 定时任务仓库（cron_repository）：定时任务与执行记录
/// - 职位仓库（listing_repository）：职位的幂等写入
/// - 用户仓库（owner_repository）：套餐信息与原子积分扣减
pub mod cron_repository;
pub mod listing_repository;
pub mod owner_repository;
pub mod task_repository;
