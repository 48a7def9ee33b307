// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索领域模块
///
/// 定义职位搜索引擎接口、解析策略和搜索结果的领域表示
pub mod engine;
