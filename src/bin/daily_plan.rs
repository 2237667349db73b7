// ABOUTME: Command-line front end printing a user's daily plan as JSON
// ABOUTME: Optionally toggles a favorite and reports completed-today flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Daily plan inspector.
//!
//! Usage:
//! ```bash
//! # Today's plan (DATABASE_URL and PRACTICE_SCORING_URL from environment)
//! cargo run --bin daily-plan -- --user 3f0c8a1e-4d5b-4c1f-9a0e-2b7d6c5e4f3a
//!
//! # Five entries, bypassing the cache
//! cargo run --bin daily-plan -- --user <uuid> --count 5 --refresh
//!
//! # Toggle a favorite first, then report completion for two categories
//! cargo run --bin daily-plan -- --user <uuid> --toggle-favorite box-breathing --completion mindfulness,tasks
//! ```

use anyhow::Result;
use clap::Parser;
use daily_practice::config::environment::PracticeConfig;
use daily_practice::context::PracticeContext;
use daily_practice::logging;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "daily-plan",
    about = "Print today's practice plan for a user",
    long_about = "Generate (or read from the per-day cache) a user's recommended exercises and report which categories were completed today"
)]
struct PlanArgs {
    /// User to plan for
    #[arg(long)]
    user: Uuid,

    /// Number of recommendations (defaults to PRACTICE_DEFAULT_COUNT)
    #[arg(long)]
    count: Option<usize>,

    /// Regenerate even if today's plan is cached
    #[arg(long)]
    refresh: bool,

    /// Exercise id whose favorite flag to flip before planning
    #[arg(long)]
    toggle_favorite: Option<String>,

    /// Categories to report completion for, comma separated
    #[arg(long, value_delimiter = ',')]
    completion: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = PlanArgs::parse();
    logging::init_from_env()?;

    let context = PracticeContext::open(PracticeConfig::from_env()?).await?;
    let mut output = serde_json::Map::new();

    if let Some(exercise_id) = &args.toggle_favorite {
        let favorite = match context.toggle_favorite(args.user, exercise_id).await {
            Ok(is_favorite) => json!({ "exercise_id": exercise_id, "is_favorite": is_favorite }),
            Err(e) => {
                warn!(exercise_id = %exercise_id, error = %e, "Favorite toggle failed");
                json!({ "exercise_id": exercise_id, "error": e.to_string() })
            }
        };
        output.insert("favorite".into(), favorite);
    }

    let plan = context
        .daily_recommendations(args.user, args.count, args.refresh)
        .await;
    output.insert("plan".into(), serde_json::to_value(&plan)?);

    if !args.completion.is_empty() {
        let report = context.completion_status(args.user, &args.completion).await;
        output.insert("completion".into(), serde_json::to_value(&report)?);
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
    Ok(())
}
