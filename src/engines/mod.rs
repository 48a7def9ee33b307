// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 抓取传输层
///
/// - traits：传输特质与错误分类
/// - reqwest_engine：基于 reqwest 的直连/代理传输
/// - proxy_router：代理优先、直连回退的路由与用量计量
pub mod proxy_router;
pub mod reqwest_engine;
pub mod traits;
