//! vmtap CLI - TAP device provisioning for VM network namespaces.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    let filter = if cli.debug {
        "vmtap=debug,vmtap_net=debug"
    } else {
        "vmtap=info,vmtap_net=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::CreateTap(args) => commands::create_tap::execute(args),
        Commands::Version => commands::version::execute(),
    }
}
