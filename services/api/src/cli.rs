use crate::demo::{run_demo, run_listing, DemoArgs, ListingArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use schoolhub::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "SchoolHub",
    about = "Browse and administer the SchoolHub school directory from the command line",
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
    /// Print one listing page from a school CSV export
    Listing(ListingArgs),
    /// Walk through the listing and admin flows against bundled sample data
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
        Command::Listing(args) => run_listing(args),
        Command::Demo(args) => run_demo(args),
    }
}
