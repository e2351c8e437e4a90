//! Create-tap command implementation.

use anyhow::{Context, Result};
use clap::Args;
use vmtap_net::linux::{create_tap, TapConfig};

/// Arguments for the create-tap command.
#[derive(Args)]
pub struct CreateTapArgs {
    /// Name of the tap device to create
    #[arg(long)]
    pub tap_name: String,

    /// Uid of the tap device owner
    #[arg(long)]
    pub uid: String,

    /// Gid of the tap device group
    #[arg(long)]
    pub gid: String,

    /// Number of queues to request
    #[arg(long)]
    pub queue_number: u32,

    /// MTU to set on the device
    #[arg(long)]
    pub mtu: u32,
}

/// Executes the create-tap command.
pub fn execute(args: CreateTapArgs) -> Result<()> {
    // Uid and gid arrive as strings; reject malformed values before any
    // kernel call.
    let uid: u32 = args
        .uid
        .parse()
        .context("could not parse tap device owner")?;
    let gid: u32 = args
        .gid
        .parse()
        .context("could not parse tap device group")?;

    tracing::debug!(
        "Creating tap device {} (uid: {uid}, gid: {gid}, queues: {}, mtu: {})",
        args.tap_name,
        args.queue_number,
        args.mtu
    );

    let config = TapConfig::new(&args.tap_name)
        .with_owner(uid)
        .with_group(gid)
        .with_queues(args.queue_number)
        .with_mtu(args.mtu);

    create_tap(&config)
        .with_context(|| format!("failed to create tap device named {}", args.tap_name))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(uid: &str, gid: &str) -> CreateTapArgs {
        CreateTapArgs {
            tap_name: "vmtap-cli0".to_string(),
            uid: uid.to_string(),
            gid: gid.to_string(),
            queue_number: 1,
            mtu: 1500,
        }
    }

    #[test]
    fn test_malformed_uid_rejected_before_kernel_call() {
        let err = execute(args("not-a-uid", "107")).unwrap_err();
        assert!(err.to_string().contains("could not parse tap device owner"));
    }

    #[test]
    fn test_malformed_gid_rejected_before_kernel_call() {
        let err = execute(args("107", "-1")).unwrap_err();
        assert!(err.to_string().contains("could not parse tap device group"));
    }

    #[test]
    fn test_out_of_range_uid_rejected() {
        let err = execute(args("4294967296", "107")).unwrap_err();
        assert!(err.to_string().contains("could not parse tap device owner"));
    }
}
