// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 数据库、服务器、抓取、代理、队列、定时任务等配置
pub mod settings;
