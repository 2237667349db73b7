// ABOUTME: Re-exports the unified error types from practice-core
// ABOUTME: Keeps `crate::errors::AppError` paths stable for the runtime modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use practice_core::errors::{AppError, AppResult, ErrorCode};
