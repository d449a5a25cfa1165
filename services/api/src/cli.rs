use crate::demo::{run_dashboard_report, run_demo, DashboardReportArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use leadlens::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "LeadLens",
    about = "Run the CRM analytics dashboard engine from the command line",
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
    /// Compute dashboard metrics from CRM exports
    Dashboard {
        #[command(subcommand)]
        command: DashboardCommand,
    },
    /// Run the full engine against a synthetic dataset
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum DashboardCommand {
    /// Generate a terminal dashboard report from CSV exports
    Report(DashboardReportArgs),
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
        Command::Dashboard {
            command: DashboardCommand::Report(args),
        } => run_dashboard_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
