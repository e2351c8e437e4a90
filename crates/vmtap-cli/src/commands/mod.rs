//! CLI command implementations.
//!
//! This module contains the command handlers for the vmtap CLI:
//!
//! - Device operations (create-tap)
//! - System operations (version)

use clap::{Parser, Subcommand};

pub mod create_tap;
pub mod version;

/// vmtap - TAP device provisioning for VM network namespaces
#[derive(Parser)]
#[command(name = "vmtap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a tap device in the current network namespace
    CreateTap(create_tap::CreateTapArgs),

    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_tap() {
        let cli = Cli::try_parse_from([
            "vmtap",
            "create-tap",
            "--tap-name",
            "tap0",
            "--uid",
            "107",
            "--gid",
            "107",
            "--queue-number",
            "2",
            "--mtu",
            "1480",
        ])
        .unwrap();

        let Commands::CreateTap(args) = cli.command else {
            panic!("expected create-tap command");
        };
        assert_eq!(args.tap_name, "tap0");
        assert_eq!(args.uid, "107");
        assert_eq!(args.gid, "107");
        assert_eq!(args.queue_number, 2);
        assert_eq!(args.mtu, 1480);
    }

    #[test]
    fn test_parse_create_tap_missing_flag() {
        let result = Cli::try_parse_from(["vmtap", "create-tap", "--tap-name", "tap0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_non_numeric_queue_number() {
        let result = Cli::try_parse_from([
            "vmtap",
            "create-tap",
            "--tap-name",
            "tap0",
            "--uid",
            "107",
            "--gid",
            "107",
            "--queue-number",
            "two",
            "--mtu",
            "1480",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_debug_flag() {
        let cli = Cli::try_parse_from(["vmtap", "--debug", "version"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Version));
    }
}
