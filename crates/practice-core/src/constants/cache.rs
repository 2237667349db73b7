// ABOUTME: Cache-related constants for the per-user recommendation cache
// ABOUTME: Bounds the number of user slots kept in memory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default maximum number of user slots held by the recommendation cache
pub const DEFAULT_CACHE_MAX_USERS: usize = 1_000;

/// Token value of a slot that has never issued a generation
pub const UNISSUED_TOKEN: u64 = 0;
