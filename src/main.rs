// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, create an API client and hand it
//   to the command flows.
// - Returns a process exit code of 1 whenever any part of a run failed.

use anyhow::Result;
use clap::{Parser, Subcommand};
use revolori_seed::api::{ApiClient, DEFAULT_BASE_URL};
use revolori_seed::commands;

#[derive(Parser)]
#[command(name = "revolori-seed")]
#[command(about = "Seed test accounts in a Revolori SSO instance and fetch login tokens")]
struct Cli {
    /// Base URL of the Revolori server
    #[arg(long, env = "REVOLORI_ADDRESS", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Log HTTP requests and responses
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a batch of deterministic test users
    CreateUsers {
        /// How many users to create
        #[arg(long, default_value_t = 2)]
        count: u32,
    },
    /// Log a test user in and print the login token
    GetToken {
        /// Index of the seeded user (user{ID}@example.com)
        user_id: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let api = ApiClient::new(&cli.base_url)?;

    let ok = match cli.command {
        Command::CreateUsers { count } => commands::create_users(&api, count)?,
        Command::GetToken { user_id } => {
            commands::get_token(&api, user_id)?;
            true
        }
    };

    std::process::exit(if ok { 0 } else { 1 });
}
