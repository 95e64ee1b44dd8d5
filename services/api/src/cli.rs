use crate::demo::{run_scan, ScanArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rent_ledger::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Rent Ledger Notification Service",
    about = "Track monthly rent obligations on the Ethiopian calendar and notify landlords",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one notification pass over the demo ledger and print the outcome
    Scan(ScanArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scan(args) => run_scan(args),
    }
}
