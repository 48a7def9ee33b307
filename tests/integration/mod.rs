// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod api_tests;
pub mod helpers;
pub mod proxy_fallback_test;
pub mod queue_serialization_test;
pub mod repositories;
pub mod scheduler_test;
pub mod search_test;
