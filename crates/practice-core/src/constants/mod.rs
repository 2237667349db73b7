// ABOUTME: Application constants organized by domain
// ABOUTME: Time-of-day fallback lists, cache sizing, scoring defaults, and completion tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Cache sizing defaults
pub mod cache;

/// Completion-log table and field names
pub mod completion;

/// AI scoring defaults
pub mod scoring;

/// Exercise ids pre-selected for each hour-of-day bucket
pub mod time_buckets;
