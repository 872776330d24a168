use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;
mod commands;

#[derive(Parser)]
#[command(name = "cinzagro")]
#[command(about = "A CLI tool for requesting and offering agro-industrial ash")]
#[command(version)]
struct Cli {
    /// Directory holding the local record store
    #[arg(long, global = true, env = "CINZAGRO_DATA_DIR", default_value = ".cinzagro")]
    data_dir: PathBuf,

    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    subcommand: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in as an industry or public user
    Login(commands::login::Args),
    /// End the current session
    Logout(commands::logout::Args),
    /// Show the logged in user's profile
    Profile(commands::profile::Args),
    /// Show counters and the list of records for the current role
    Dashboard(commands::dashboard::Args),
    /// Offer ash for collection (industry users)
    NewCollection(commands::new_collection::Args),
    /// Request ash for public use (public users)
    RequestWaste(commands::request_waste::Args),
    /// Show the details of a record
    Show(commands::show::Args),
    /// Cancel a pending record
    Cancel(commands::cancel::Args),
    /// Split records saved by older releases into one entry per record
    Migrate(commands::migrate::Args),
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<commands::ExitCode> {
    let cli = Cli::parse();

    env_logger::builder()
        .filter_level(level_for(cli.verbose))
        .parse_default_env()
        .init();

    let ctx = commands::Context::open(cli.data_dir).await?;

    Ok(match cli.subcommand {
        Commands::Login(args) => commands::login::main(&ctx, args).await?,
        Commands::Logout(args) => commands::logout::main(&ctx, args).await?,
        Commands::Profile(args) => commands::profile::main(&ctx, args).await?,
        Commands::Dashboard(args) => commands::dashboard::main(&ctx, args).await?,
        Commands::NewCollection(args) => commands::new_collection::main(&ctx, args).await?,
        Commands::RequestWaste(args) => commands::request_waste::main(&ctx, args).await?,
        Commands::Show(args) => commands::show::main(&ctx, args).await?,
        Commands::Cancel(args) => commands::cancel::main(&ctx, args).await?,
        Commands::Migrate(args) => commands::migrate::main(&ctx, args).await?,
    })
}
