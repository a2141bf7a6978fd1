//! Command-line argument parsing for the `mentions` tool
//!
//! Supports:
//! - Analyzing a buffer and caret position
//! - Live searches and link lookups against the API (or a fixture file)
//! - Replaying scripted editing sessions
//! - Rendering a markdown file and listing its mention links

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::trigger::{Category, TriggerTable};

/// Mention-aware text editing core
#[derive(Parser, Debug)]
#[command(name = "mentions", version, about = "Mention-aware text editing core")]
pub struct CliArgs {
    /// Config file to use instead of ~/.config/mention-editor/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the focused token, mention and focused lines as JSON
    Analyze {
        text: String,
        /// Caret offset in characters (defaults to the end of TEXT)
        #[arg(long, value_name = "N")]
        caret: Option<usize>,
        /// Selection start (defaults to the caret)
        #[arg(long, value_name = "N")]
        selection_start: Option<usize>,
    },
    /// Search for entities, printing the normalized results as JSON
    Search {
        /// Trigger character (`@`) or category name (`user`)
        category: String,
        query: String,
        /// Serve results from a JSON fixture file instead of the API
        #[arg(long, value_name = "FILE")]
        fixtures: Option<PathBuf>,
    },
    /// Resolve a link path such as /ann or /block/12
    Lookup {
        path: String,
        #[arg(long, value_name = "FILE")]
        fixtures: Option<PathBuf>,
    },
    /// Drive the editor through a YAML script, printing snapshots as JSON lines
    Replay {
        script: PathBuf,
        #[arg(long, value_name = "FILE")]
        fixtures: Option<PathBuf>,
    },
    /// Render a markdown file to HTML and list its mention links
    Preview {
        file: PathBuf,
        /// Print only the links
        #[arg(long)]
        links: bool,
    },
}

/// Accept either a trigger character from the table or a category name
pub fn parse_category(arg: &str, triggers: &TriggerTable) -> Result<Category, String> {
    let mut chars = arg.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(category) = triggers.get(c) {
            return Ok(category);
        }
    }
    Category::parse(arg).ok_or_else(|| {
        let known: String = triggers.triggers().collect();
        format!(
            "'{}' is neither a trigger ({}) nor a category (user, channel, block)",
            arg, known
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        let table = TriggerTable::default();
        assert_eq!(parse_category("@", &table), Ok(Category::User));
        assert_eq!(parse_category("#", &table), Ok(Category::Channel));
        assert_eq!(parse_category("block", &table), Ok(Category::Block));
        assert!(parse_category("!", &table).is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = CliArgs::parse_from(["mentions", "analyze", "hello @fra", "--caret", "10"]);
        match args.command {
            Command::Analyze { text, caret, .. } => {
                assert_eq!(text, "hello @fra");
                assert_eq!(caret, Some(10));
            }
            other => panic!("unexpected {other:?}"),
        }

        let args = CliArgs::parse_from(["mentions", "--config", "c.yaml", "lookup", "/ann"]);
        assert_eq!(args.config, Some(PathBuf::from("c.yaml")));
    }
}
