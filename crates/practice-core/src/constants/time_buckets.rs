// ABOUTME: Exercise ids pre-selected for each hour-of-day bucket of the fallback pool
// ABOUTME: Lists are ordered; the fallback walk preserves this order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Morning bucket (06:00-11:59)
pub const MORNING: &[&str] = &["morning-intention", "box-breathing", "gratitude-reflection"];

/// Afternoon bucket (12:00-17:59)
pub const AFTERNOON: &[&str] = &["deep-work-sprint", "desk-stretch", "mindful-walk"];

/// Evening bucket (18:00-23:59)
pub const EVENING: &[&str] = &["evening-reflection", "body-scan", "digital-sunset"];

/// Night bucket (00:00-05:59)
///
/// `night-journal` lives in the journaling feature rather than the exercise
/// catalog, so it does not resolve against most catalogs.
pub const NIGHT: &[&str] = &["sleep-breathing", "night-journal", "body-scan"];
