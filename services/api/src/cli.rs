use crate::demo::{run_demo, run_score, run_week, DemoArgs, ScoreArgs, WeekArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kt_tracker::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "KT Tracker",
    about = "Score and track weekly knowledge-transfer health from the command line",
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
    /// Score one set of sub-scores with the configured weights
    Score(ScoreArgs),
    /// Print the reporting Friday for a date
    Week(WeekArgs),
    /// Seed a sample portfolio and print its dashboard
    Demo(DemoArgs),
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
        Command::Score(args) => run_score(args),
        Command::Week(args) => run_week(args),
        Command::Demo(args) => run_demo(args),
    }
}
