use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deckpane")]
#[command(author, version, about)]
#[command(long_about = "Live slide-deck preview for Markdown documents.\n\n\
    Write Marp-style Markdown in your editor and watch the deck update.\n\n\
    Examples:\n  \
    deckpane slides.md                 Preview, writing slides.preview.html\n  \
    deckpane export slides.md --pdf    Write a print-ready document\n  \
    deckpane count slides.md           Print the number of slides\n  \
    deckpane route my-deck --token t   Print the host route for a deck")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown file to preview
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Where to write the live preview page
    #[arg(long, global = false)]
    pub out: Option<PathBuf>,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

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
    /// Preview a deck, re-rendering whenever the file changes
    Preview {
        /// Markdown file to preview
        file: PathBuf,

        /// Where to write the live preview page
        #[arg(long)]
        out: Option<PathBuf>,

        /// Start on a specific slide (1-indexed)
        #[arg(long)]
        slide: Option<usize>,
    },

    /// Export a deck as a standalone HTML document
    Export {
        /// Markdown file to export
        file: PathBuf,

        /// Output file (defaults to the input with an .html extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Add print page setup and open the print dialog on load
        #[arg(long)]
        pdf: bool,
    },

    /// Print the number of slides in a deck
    Count {
        /// Markdown file to count
        file: PathBuf,
    },

    /// Print the host route for a document
    Route {
        /// Document id
        doc_id: String,

        /// Access token to append
        #[arg(long)]
        token: Option<String>,
    },

    /// Run the create-deck action and print its result
    Create {
        /// Title of the new deck
        #[arg(long)]
        title: Option<String>,
    },

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

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. preview.save_delay_ms, preview.theme, store.dir)
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

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Preview { file, out, slide }) => {
                crate::commands::preview::run(file, out, slide, self.quiet)
            }
            Some(Commands::Export { file, output, pdf }) => {
                crate::commands::export::run(file, output, pdf, self.quiet)
            }
            Some(Commands::Count { file }) => crate::commands::deck::count(&file),
            Some(Commands::Route { doc_id, token }) => {
                crate::commands::deck::route(&doc_id, token.as_deref());
                Ok(())
            }
            Some(Commands::Create { title }) => crate::commands::deck::create(title),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::version::run();
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    crate::commands::preview::run(file, self.out, self.slide, self.quiet)
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
