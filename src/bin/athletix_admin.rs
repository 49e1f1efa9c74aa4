// ABOUTME: Operator utility for the Athletix engine database and macro derivation
// ABOUTME: Creates the schema at DATABASE_URL and prints derived macro targets as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

//! Operator tool for the Athletix engine.
//!
//! Usage:
//! ```bash
//! # Create or upgrade the schema (uses DATABASE_URL from environment)
//! cargo run --bin athletix-admin -- migrate
//!
//! # Override database URL
//! cargo run --bin athletix-admin -- migrate --database-url sqlite:./data/athletix.db
//!
//! # Print macro targets for a calorie goal
//! cargo run --bin athletix-admin -- macros --calories 2000 --goal muscle_gain
//! ```

use anyhow::{bail, Result};
use athletix_engine::config::{DatabaseUrl, EngineConfig};
use athletix_engine::database::Database;
use athletix_engine::intelligence::{derive_macros, MacroSplit};
use athletix_engine::logging::{LogFormat, LoggingConfig};
use athletix_engine::models::FitnessGoal;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "athletix-admin",
    about = "Athletix engine operator tool",
    long_about = "Create the Athletix engine schema and inspect macro target derivation"
)]
struct AdminArgs {
    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database schema
    Migrate {
        /// Database URL override
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Print protein, carbohydrate, and fat targets for a calorie goal
    Macros {
        /// Daily calorie target in kcal
        #[arg(long)]
        calories: i64,

        /// Fitness goal (`weight_loss`, `muscle_gain`, `endurance`, ...)
        #[arg(long, default_value = "general_fitness")]
        goal: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminArgs::parse();

    let logging = LoggingConfig {
        level: if args.verbose { "debug" } else { "warn" }.into(),
        format: LogFormat::Compact,
        ..LoggingConfig::from_env()
    };
    logging.init()?;

    match args.command {
        Command::Migrate { database_url } => migrate(database_url).await,
        Command::Macros { calories, goal } => print_macros(calories, &goal),
    }
}

async fn migrate(database_url: Option<String>) -> Result<()> {
    let mut config = EngineConfig::from_env()?;
    if let Some(url) = database_url {
        config.database.url = DatabaseUrl::parse_url(&url)?;
    }

    info!("Connecting to database: {}", config.database.url);
    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    info!("Schema ready at {}", config.database.url);
    Ok(())
}

fn print_macros(calories: i64, goal: &str) -> Result<()> {
    let Ok(calories) = u32::try_from(calories) else {
        bail!("--calories must be between 0 and {}", u32::MAX);
    };
    if calories == 0 {
        bail!("--calories must be positive");
    }

    let goal = FitnessGoal::parse(goal);
    let split = MacroSplit::for_goal(goal);
    let targets = derive_macros(calories, goal);

    let output = json!({
        "calories": calories,
        "goal": goal.as_str(),
        "split": split,
        "targets": targets,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
