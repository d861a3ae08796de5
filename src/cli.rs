use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::{entry::EntryKind, search::SearchParams};

#[derive(Debug, Parser)]
#[command(
    name = "stddict",
    about = "Search and maintain a standard term, word and domain dictionary"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Read default entries from this directory instead of <data-dir>/defaults
    #[arg(long, global = true)]
    pub defaults_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the dictionary
    Search(SearchArgs),
    /// Merge a JSON batch of entries into the user entries
    Import(ImportArgs),
    /// Discard all user entries and return to the defaults
    Reset,
    /// Show entry counts, settings and the last import
    Status(StatusArgs),
    /// Print identifier spellings for the best match of a query
    Names(NamesArgs),
    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Number of results to return (defaults to the configured limit)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Only return entries of this kind (term, word, domain)
    #[arg(short = 'k', long)]
    pub kind: Option<EntryKind>,

    /// Only return entries in this domain group
    #[arg(long)]
    pub group: Option<String>,

    /// Only return entries in this domain category
    #[arg(long)]
    pub category: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    pub fn params(&self) -> SearchParams {
        SearchParams {
            query: self.query.clone(),
            count: self.count,
            kind: self.kind,
            domain_group: self.group.clone(),
            domain_category: self.category.clone(),
        }
    }
}

// -- Import --

#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// JSON file holding an array of entries, or `-` for stdin
    pub path: PathBuf,

    /// Print the import summary as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Names --

#[derive(Debug, Parser)]
pub struct NamesArgs {
    /// The search query
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Config --

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Present only user entries (true) or defaults overlaid by them (false)
    SetOverrideOnly {
        /// true/false, yes/no, on/off or 1/0
        value: String,
    },
    /// Set the default number of search results
    SetLimit {
        /// A positive integer
        value: String,
    },
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "stddict",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_search_defaults() {
        let cli = Cli::parse_from(["stddict", "search", "고객"]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "고객");
                assert_eq!(args.count, None);
                assert_eq!(args.kind, None);
                assert!(!args.json);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn parse_search_filters() {
        let cli = Cli::parse_from([
            "stddict", "search", "번호", "-n", "5", "--kind", "DOMAIN",
            "--group", "번호",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        let params = args.params();
        assert_eq!(params.count, Some(5));
        assert_eq!(params.kind, Some(EntryKind::Domain));
        assert_eq!(params.domain_group.as_deref(), Some("번호"));
        assert_eq!(params.domain_category, None);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(
            Cli::try_parse_from(["stddict", "search", "x", "--kind", "sheet"])
                .is_err()
        );
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "stddict",
            "status",
            "--data-dir",
            "/tmp/d",
            "-vv",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
