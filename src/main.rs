//! aockit - live development loop for Advent of Code solutions.

mod actor;
mod aoc;
mod cli;
mod config;
mod core;
mod logger;
mod runner;
mod store;
mod tasks;
mod utils;
mod worker;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::KitConfig;
use utils::date::current_year;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = KitConfig::load(&cli)?;

    match cli.command {
        Commands::Start { day, year, .. } => {
            cli::start::start_dev(config, year.unwrap_or_else(current_year), day)
        }
        Commands::Readme { year } => {
            cli::readme::update_readme(&config, year.unwrap_or_else(current_year))
        }
    }
}
