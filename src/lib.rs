// ABOUTME: Main library entry point for the daily practice services
// ABOUTME: Recommendations with per-day caching, optimistic favorites, and completion aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Daily Practice
//!
//! Backend services for a personal-growth app's "today" screen.
//!
//! ## Components
//!
//! - **Catalog**: read-only exercise definitions loaded at startup
//! - **Favorites**: per-user favorites with optimistic local toggles
//! - **Recommendations**: AI-scored daily picks with a deterministic fallback,
//!   memoized per user per local calendar day
//! - **Completion**: "completed today" flags aggregated across activity logs
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use daily_practice::config::environment::PracticeConfig;
//! use daily_practice::context::PracticeContext;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let context = PracticeContext::open(PracticeConfig::from_env()?).await?;
//!     let user = Uuid::new_v4();
//!
//!     let today = context.daily_recommendations(user, None, false).await;
//!     for entry in &today.entries {
//!         println!("{} ({:?})", entry.exercise.name, entry.provenance);
//!     }
//!     Ok(())
//! }
//! ```

/// Read-only exercise catalog
pub mod catalog;

/// Wall clock abstraction in local time
pub mod clock;

/// Completed-today aggregation across activity logs
pub mod completion;

/// Environment-driven configuration
pub mod config;

/// Dependency injection context
pub mod context;

/// Error types
pub mod errors;

/// Favorites with optimistic toggles
pub mod favorites;

/// Structured logging setup
pub mod logging;

/// Recommendation generation and per-day caching
pub mod recommendations;

/// Shared helpers
pub mod utils;

/// Constants and plain data models from the core crate
pub use practice_core::{constants, models};
