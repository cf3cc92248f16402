use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskpad", version, about = "Terminal task list with progress tracking")]
pub struct Cli {
    /// Use this data directory instead of searching for .taskpad/
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Less log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project task list in the current directory
    Init,
    /// Add a task
    Add {
        /// Task text
        text: String,
        /// Category label (defaults to the configured default)
        #[arg(long, short = 'c')]
        category: Option<String>,
    },
    /// List tasks, newest first
    List {
        /// "All", "Completed" or a category name
        #[arg(long, short = 'f', default_value = "All")]
        filter: String,
    },
    /// Flip a task between open and completed
    Toggle {
        /// Task id
        id: String,
    },
    /// Replace a task's text
    Edit {
        /// Task id
        id: String,
        /// New text
        text: String,
    },
    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },
    /// Remove all completed tasks
    ClearCompleted,
    /// Switch dark mode on or off
    Dark {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Print progress counts
    Stats,
    /// Launch the interactive TUI
    Tui,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        self == Switch::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["taskpad"]).expect("parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_add_with_category_and_global_flags() {
        let cli = Cli::try_parse_from([
            "taskpad", "add", "Buy milk", "-c", "Errands", "-vv", "--data-dir", "/tmp/tp",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/tp")));
        match cli.command {
            Some(Command::Add { text, category }) => {
                assert_eq!(text, "Buy milk");
                assert_eq!(category.as_deref(), Some("Errands"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_dark_switch() {
        let cli = Cli::try_parse_from(["taskpad", "dark", "on"]).expect("parse");
        match cli.command {
            Some(Command::Dark { state }) => assert!(state.enabled()),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["taskpad", "dark", "maybe"]).is_err());
    }
}
