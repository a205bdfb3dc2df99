use crate::demo::{run_adjust, run_demo, AdjustArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use valuation_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Comparable Valuation Engine",
    about = "Adjust comparable sales against a subject property and serve the engine over HTTP",
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
    /// Adjust one comparable against a subject from a JSON request file
    Adjust(AdjustArgs),
    /// Print a worked adjustment grid for a sample comparable
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
        Command::Adjust(args) => run_adjust(args),
        Command::Demo(args) => run_demo(args),
    }
}
