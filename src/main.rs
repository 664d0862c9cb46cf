use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use contextual_roster::api::{HttpTenantClient, RetryPolicy};
use contextual_roster::config::Settings;
use contextual_roster::execute::MAX_BATCH_SIZE;
use contextual_roster::model::OperationReport;
use contextual_roster::prompt::TerminalPrompt;
use contextual_roster::sync::{self, InviteOptions, RemovalTarget, RemoveOptions, RosterSource};
use contextual_roster::{Result, ToolError, report};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_logging() {
        eprintln!("error: {error}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(outcome) => {
            report::print(&outcome);
            outcome.exit_code()
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<OperationReport> {
    let _ = dotenvy::dotenv();
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Invite(args) => execute_invite(args, &settings),
        Command::Remove(args) => execute_remove(args, &settings),
    }
}

fn execute_invite(args: InviteArgs, settings: &Settings) -> Result<OperationReport> {
    if !args.csv.exists() {
        return Err(ToolError::MissingInput(args.csv));
    }

    let client = HttpTenantClient::new(settings)?;
    let options = InviteOptions {
        roster: RosterSource {
            path: args.csv,
            column: args.email_column,
        },
        tenant: args.tenant,
        admin: args.admin,
        dry_run: args.dry_run,
        batch_size: args.batch_size,
        retry: RetryPolicy::default(),
    };
    sync::invite(&client, &options)
}

fn execute_remove(args: RemoveArgs, settings: &Settings) -> Result<OperationReport> {
    let target = match args.csv {
        Some(path) if !path.exists() => return Err(ToolError::MissingInput(path)),
        Some(path) => RemovalTarget::Roster(RosterSource {
            path,
            column: args.email_column,
        }),
        None => RemovalTarget::AllUsers,
    };

    let client = HttpTenantClient::new(settings)?;
    let options = RemoveOptions {
        tenant: args.tenant,
        include_admins: args.include_admins,
        dry_run: args.dry_run,
        assume_yes: args.yes,
        batch_size: args.batch_size,
        ..RemoveOptions::new(target)
    };
    sync::remove(&client, &options, &mut TerminalPrompt)
}

fn parse_batch_size(value: &str) -> std::result::Result<usize, String> {
    let size: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if (1..=MAX_BATCH_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(format!("batch size must be between 1 and {MAX_BATCH_SIZE}"))
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reconcile a spreadsheet roster with the users of a Contextual AI tenant.",
    after_help = "The API key is read from CONTEXTUAL_API_KEY (a local .env file is honoured)."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Invite every roster address that is not yet a tenant member.
    Invite(InviteArgs),
    /// Remove roster addresses, or all users, from the tenant.
    Remove(RemoveArgs),
}

#[derive(clap::Args)]
struct InviteArgs {
    /// CSV or Excel file containing email addresses.
    #[arg(short, long)]
    csv: PathBuf,

    /// Tenant short name.
    #[arg(short, long)]
    tenant: String,

    /// Column holding the email addresses (auto-detected if omitted).
    #[arg(short, long)]
    email_column: Option<String>,

    /// Grant admin privileges to invited users.
    #[arg(short, long)]
    admin: bool,

    /// Show what would happen without inviting anyone.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Users per request.
    #[arg(long, default_value_t = MAX_BATCH_SIZE, value_parser = parse_batch_size)]
    batch_size: usize,
}

#[derive(clap::Args)]
struct RemoveArgs {
    /// CSV or Excel file containing the email addresses to remove.
    #[arg(short, long, required_unless_present = "all_users", conflicts_with = "all_users")]
    csv: Option<PathBuf>,

    /// Tenant short name (display only; the API key determines the tenant).
    #[arg(short, long)]
    tenant: Option<String>,

    /// Column holding the email addresses (auto-detected if omitted).
    #[arg(short, long, requires = "csv")]
    email_column: Option<String>,

    /// Remove ALL non-admin users (requires confirmation).
    #[arg(short, long)]
    all_users: bool,

    /// Also remove admin users.
    #[arg(long)]
    include_admins: bool,

    /// Show what would be removed without removing anyone.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Skip confirmation prompts.
    #[arg(short, long)]
    yes: bool,

    /// Users per request.
    #[arg(long, default_value_t = MAX_BATCH_SIZE, value_parser = parse_batch_size)]
    batch_size: usize,
}
