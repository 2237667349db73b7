// ABOUTME: Defaults for the AI scoring call and recommendation sizing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Number of recommendations requested when the caller does not specify one
pub const DEFAULT_RECOMMENDATION_COUNT: usize = 3;

/// Upper bound accepted for a single generation request
pub const MAX_RECOMMENDATION_COUNT: usize = 25;

/// Default timeout for the AI scoring call in milliseconds
pub const DEFAULT_SCORING_TIMEOUT_MS: u64 = 8_000;

/// Service name used in scoring error messages and log fields
pub const SCORING_SERVICE_NAME: &str = "recommendation-scorer";
