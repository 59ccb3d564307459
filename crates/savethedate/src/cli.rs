use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::site::Layout;

#[derive(Parser)]
#[command(name = "savethedate")]
#[command(author, version, about)]
#[command(long_about = "A scroll and swipe driven save-the-date page.\n\n\
    Describe the event and its photos in a YAML site file and open it as a\n\
    full-screen slide deck or photo gallery with a live countdown.\n\n\
    Examples:\n  \
    savethedate party.yaml                  Open the page (fullscreen)\n  \
    savethedate party.yaml --windowed       Open in a window\n  \
    savethedate party.yaml --slide 3        Start on the third slide\n  \
    savethedate check party.yaml            Validate a site file")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Site file to open
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Override the layout from the site file
    #[arg(long, value_enum, global = false)]
    pub layout: Option<LayoutArg>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Validate a site file and print a summary
    Check {
        /// Site file to validate
        file: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.layout, defaults.start_slide)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    Deck,
    Gallery,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Deck => Layout::Deck,
            LayoutArg::Gallery => Layout::Gallery,
        }
    }
}

impl Cli {
    /// `tracing` filter for the requested verbosity. `RUST_LOG` wins when set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "savethedate=error";
        }
        match self.verbose {
            0 => "savethedate=warn",
            1 => "savethedate=debug",
            _ => "savethedate=trace",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        if self.no_color {
            colored::control::set_override(false);
        }
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Check { file }) => {
                if !file.exists() {
                    anyhow::bail!("File not found: {}", file.display());
                }
                crate::commands::check::run(&file)
            }
            Some(Commands::Version) => {
                crate::commands::print_version();
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::app::run(file, self.windowed, self.slide, self.layout.map(Layout::from))
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_launch_flags() {
        let cli = Cli::try_parse_from([
            "savethedate",
            "party.yaml",
            "--windowed",
            "--slide",
            "2",
            "--layout",
            "gallery",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("party.yaml")));
        assert!(cli.windowed);
        assert_eq!(cli.slide, Some(2));
        assert_eq!(cli.layout.map(Layout::from), Some(Layout::Gallery));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_verbosity_filter() {
        let cli = Cli::try_parse_from(["savethedate", "-vv", "version"]).unwrap();
        assert_eq!(cli.log_filter(), "savethedate=trace");
        let cli = Cli::try_parse_from(["savethedate", "-q", "version"]).unwrap();
        assert_eq!(cli.log_filter(), "savethedate=error");
        let cli = Cli::try_parse_from(["savethedate", "version"]).unwrap();
        assert_eq!(cli.log_filter(), "savethedate=warn");
    }

    #[test]
    fn test_parse_config_set() {
        let args = ["savethedate", "config", "set", "defaults.theme", "dark"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Some(Commands::Config {
                command: ConfigCommands::Set { key, value },
            }) => {
                assert_eq!(key, "defaults.theme");
                assert_eq!(value, "dark");
            }
            _ => panic!("expected config set"),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
