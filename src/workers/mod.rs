// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 单个抓取工作器串行消费任务队列，由 WorkerManager 管理生命周期
pub mod manager;
pub mod scrape_worker;
pub mod worker;

pub use worker::Worker;
