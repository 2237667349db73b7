// ABOUTME: Completion-log source identifiers, table names, and field names
// ABOUTME: Used to build the default completion source configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Source id for guided mindfulness sessions
pub const SOURCE_MINDFULNESS: &str = "mindfulness";
/// Source id for daily tasks
pub const SOURCE_TASKS: &str = "tasks";
/// Source id for free-form journal entries
pub const SOURCE_JOURNAL: &str = "journal";
/// Source id for focused deep-work blocks
pub const SOURCE_DEEP_WORK: &str = "deep_work";

/// Table holding mindfulness session logs
pub const TABLE_MINDFULNESS_SESSIONS: &str = "mindfulness_sessions";
/// Table holding task rows
pub const TABLE_TASKS: &str = "tasks";
/// Table holding journal entries
pub const TABLE_JOURNAL_ENTRIES: &str = "journal_entries";
/// Table holding deep-work session logs
pub const TABLE_DEEP_WORK_SESSIONS: &str = "deep_work_sessions";

/// Default column identifying the owning user
pub const DEFAULT_USER_ID_FIELD: &str = "user_id";
