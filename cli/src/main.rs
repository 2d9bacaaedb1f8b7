mod cli;
mod commands;
mod config;
mod context;
mod output;
mod timing;

use anyhow::Result;
use cabinet_business::BusinessConfig;
use clap::Parser as _;

use crate::cli::{Cli, Commands};
use crate::config::SessionStore;
use crate::context::CliContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    timing::init_tracing(cli.verbose, cli.timing);

    let ctx = CliContext::new(
        BusinessConfig::new(cli.api_url),
        SessionStore::default_location()?,
    )?;

    match cli.command {
        Commands::Signup => commands::run_signup(&ctx).await,
        Commands::Signin => commands::run_signin(&ctx).await,
        Commands::Signout => commands::run_signout(&ctx).await,
        Commands::ResetPassword { email } => commands::run_reset_password(&ctx, &email).await,
        Commands::Whoami => commands::run_whoami(&ctx).await,
        Commands::Ls { flat } => commands::run_list(&ctx, flat).await,
        Commands::Upload { paths } => commands::run_upload(&ctx, &paths).await,
        Commands::Rm { id, yes } => commands::run_remove(&ctx, &id, yes).await,
    }
}
