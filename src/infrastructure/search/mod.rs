// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 职位搜索实现
///
/// - linkedin：搜索URL构建与带重试的抓取
/// - parser：解析策略级联
/// - deduplicator：单次抓取内去重
pub mod deduplicator;
pub mod linkedin;
pub mod parser;
