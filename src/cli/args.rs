//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Builder;

/// Advent of Code live development loop
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: aockit.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "aockit.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the live development loop for a puzzle day
    #[command(visible_alias = "s")]
    Start {
        /// The Advent of Code calendar day
        #[arg(value_parser = clap::value_parser!(u8).range(1..=25))]
        day: u8,

        /// The Advent of Code calendar year (default: current year)
        #[arg(short, long)]
        year: Option<u16>,

        /// Builder used to turn the solution into a runnable program
        #[arg(short, long, value_enum)]
        builder: Option<Builder>,
    },

    /// Regenerate the solution badges and timings in a year's README
    #[command(visible_alias = "r")]
    Readme {
        /// The Advent of Code calendar year (default: current year)
        #[arg(short, long)]
        year: Option<u16>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start() {
        let cli = Cli::parse_from(["aockit", "start", "3", "-y", "2023", "-b", "release"]);
        match cli.command {
            Commands::Start { day, year, builder } => {
                assert_eq!(day, 3);
                assert_eq!(year, Some(2023));
                assert_eq!(builder, Some(Builder::Release));
            }
            Commands::Readme { .. } => panic!("expected start"),
        }
    }

    #[test]
    fn test_day_out_of_range() {
        assert!(Cli::try_parse_from(["aockit", "start", "26"]).is_err());
        assert!(Cli::try_parse_from(["aockit", "start", "0"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["aockit", "readme", "-V", "-C", "other.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
