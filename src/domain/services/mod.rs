// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 职位过滤（listing_filter）：解析后的相关性过滤规则
pub mod listing_filter;
