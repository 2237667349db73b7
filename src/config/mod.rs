// ABOUTME: Configuration module for the daily practice services
// ABOUTME: Environment-driven settings for recommendations, caching, and storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment variable parsing and typed settings
pub mod environment;
