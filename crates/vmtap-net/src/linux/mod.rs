//! Linux-specific network infrastructure.
//!
//! This module provides the Linux implementations for:
//!
//! - **TAP**: persistent TAP device creation with owner/group assignment
//! - **Netlink**: netlink socket operations for link configuration
//!
//! All types in this module require `target_os = "linux"`.

pub mod netlink;
pub mod tap;

pub use netlink::NetlinkHandle;
pub use tap::{create_tap, TapConfig};
