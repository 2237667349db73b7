// ABOUTME: Core types and constants for the daily practice recommendation subsystem
// ABOUTME: Foundation crate with error handling, constants, and plain data models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Practice Core
//!
//! Foundation crate providing shared types and constants for daily practice
//! recommendations and completion tracking. It performs no I/O, so the runtime
//! crate can depend on it without pulling in storage or HTTP stacks.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, and the `AppResult` alias
//! - **constants**: time-of-day bucket lists, cache and scoring defaults
//! - **models**: exercises, calendar days, recommendations, completion sources

/// Unified error handling with degradation-oriented error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Plain data models shared by every component
pub mod models;
