use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use courtwatch_cli::OutputFormat;
use courtwatch_cli::commands;
use courtwatch_cli::commands::search::SearchOptions;
use courtwatch_cli::notify::MailSettings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "courtwatch")]
#[command(author, version, long_about = None)]
#[command(
    about = "Find open badminton court slots on an online booking calendar",
    long_about = "Courtwatch walks every appointment type and court calendar of the booking \
                  site in a headless browser, collects the start times that match your \
                  criteria, and mails them to you."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the booking site for open court slots
    Search {
        /// Minimum booking duration in minutes, e.g. `240` for 4 hours
        #[arg(short, long, value_name = "MINUTES", default_value_t = 0)]
        min: u32,

        /// Start of the search window as `YYYY-MM-DD HH:MM` (defaults to now)
        #[arg(short, long, value_name = "DATETIME")]
        start: Option<String>,

        /// End of the search window as `YYYY-MM-DD HH:MM` (defaults to now + 2 days)
        #[arg(short, long, value_name = "DATETIME")]
        end: Option<String>,

        /// Courts to exclude, separated by commas, e.g. `7,1`
        #[arg(short, long, value_name = "COURTS", value_delimiter = ',')]
        courts: Vec<u32>,

        /// Keep searching until at least one slot is found
        #[arg(short, long)]
        repeat: bool,

        /// Minutes between searches when repeating
        #[arg(long, value_name = "MINUTES", default_value_t = 5)]
        interval: u64,

        /// Path to the Chrome executable
        #[arg(long, value_name = "PATH")]
        chrome_path: Option<PathBuf>,

        /// Seconds to wait for each page element before giving up
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,

        /// Booking page to search
        #[arg(long, env = "BADMINTON_URL", hide_env_values = true)]
        url: Option<String>,

        /// SendGrid API key for mailing results
        #[arg(long, env = "BADMINTON_SENDGRID_APIKEY", hide_env_values = true)]
        sendgrid_api_key: Option<String>,

        /// Sender address for result mails
        #[arg(long, env = "BADMINTON_FROM_EMAIL")]
        from_email: Option<String>,

        /// Recipients of result mails, separated by commas
        #[arg(long, env = "BADMINTON_TO_EMAILS")]
        to_emails: Option<String>,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts for courtwatch.

SUPPORTED SHELLS:
    bash, zsh, fish, powershell, elvish

INSTALLATION:
    Bash:
        courtwatch completion --shell bash > ~/.local/share/bash-completion/completions/courtwatch
        # or add to ~/.bashrc:
        source <(courtwatch completion --shell bash)

    Zsh:
        courtwatch completion --shell zsh > ~/.zfunc/_courtwatch
        # then in ~/.zshrc, before compinit:
        fpath=(~/.zfunc $fpath)

    Fish:
        courtwatch completion --shell fish > ~/.config/fish/completions/courtwatch.fish

    PowerShell:
        courtwatch completion --shell powershell >> $PROFILE")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Search {
            min,
            start,
            end,
            courts,
            repeat,
            interval,
            chrome_path,
            timeout,
            url,
            sendgrid_api_key,
            from_email,
            to_emails,
        } => {
            let options = SearchOptions {
                min_minutes: min,
                start,
                end,
                excluded_courts: courts,
                repeat,
                interval_minutes: interval,
                chrome_path,
                timeout_secs: timeout,
                url,
                mail: MailSettings::new(sendgrid_api_key, from_email, to_emails),
            };
            commands::search::execute(options, cli.format)
        }
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("courtwatch=debug,courtwatch_cli=debug,courtwatch_core=debug,courtwatch_browser=debug")
    } else {
        EnvFilter::new("courtwatch=info,courtwatch_cli=info,courtwatch_core=info,courtwatch_browser=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
