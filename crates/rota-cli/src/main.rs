#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use rota_core::ScheduleStore;
use rota_core::config::resolve_config;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "rota: browse and edit shift schedules",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format. Overrides --json and FORMAT.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Server base URL. Overrides ROTA_BASE_URL and config files.
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "Show a schedule",
        long_about = "Show a schedule with its members and shift types.",
        after_help = "EXAMPLES:\n    # Show schedule 1\n    rota show 1\n\n    # Emit machine-readable output\n    rota show 1 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "List assigned members per slot",
        long_about = "Fetch shifts for a date range and list who works each slot.",
        after_help = "EXAMPLES:\n    # One day\n    rota shifts 1 --from 2024-01-01\n\n    # A week, using a single range query\n    rota shifts 1 --from 2024-01-01 --to 2024-01-07 --range"
    )]
    Shifts(cmd::shifts::ShiftsArgs),

    #[command(
        next_help_heading = "Write",
        about = "Add a member to a schedule",
        long_about = "Create a member on the server and attach it to a schedule.",
        after_help = "EXAMPLES:\n    # Add Ann to schedule 1\n    rota add-member 1 Ann\n\n    # Emit machine-readable output\n    rota add-member 1 Ann --json"
    )]
    AddMember(cmd::add_member::AddMemberArgs),

    #[command(
        next_help_heading = "Write",
        about = "Edit who works a slot",
        long_about = "Assign or unassign members on one (date, shift type) slot and submit the change.",
        after_help = "EXAMPLES:\n    # Put member 10 on the morning shift\n    rota edit 1 --date 2024-01-01 --shift-type 5 --add 10\n\n    # Swap two members without submitting\n    rota edit 1 --date 2024-01-01 --shift-type 5 --remove 10 --add 11 --dry-run"
    )]
    Edit(cmd::edit::EditArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ROTA_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "rota_cli=debug,rota_core=debug,info"
        } else {
            "rota_cli=info,rota_core=info,warn"
        })
    });

    let format = env::var("ROTA_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let cfg = match resolve_config(&project_root, cli.json, cli.base_url.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            let output = output::resolve_output_mode(cli.format, cli.json, "text");
            output::render_error(output, &output::CliError::config(&err))?;
            return Err(err);
        }
    };
    let output = output::resolve_output_mode(cli.format, cli.json, &cfg.resolved_output);
    info!(base_url = %cfg.server.base_url, "using server");

    let mut store = ScheduleStore::from_config(&cfg.server);

    match cli.command {
        Commands::Show(ref args) => cmd::show::run_show(args, &mut store, output),
        Commands::Shifts(ref args) => cmd::shifts::run_shifts(args, &mut store, output),
        Commands::AddMember(ref args) => {
            cmd::add_member::run_add_member(args, &mut store, output)
        }
        Commands::Edit(ref args) => cmd::edit::run_edit(args, &mut store, output),
    }
}
