// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 错误类型、重试策略、日志初始化与URL处理
pub mod errors;
pub mod retry_policy;
pub mod telemetry;
pub mod url_utils;
