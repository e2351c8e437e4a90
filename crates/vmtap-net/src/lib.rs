//! # vmtap-net
//!
//! TAP device provisioning for VM network plumbing.
//!
//! This crate creates persistent TAP devices inside the network namespace of
//! the calling process and prepares them for consumption by an unprivileged
//! hypervisor process:
//!
//! - **TAP creation**: via the standard tun/tap interface (`/dev/net/tun`
//!   and the `TUNSETIFF` ioctl), one queue fd per requested queue
//! - **Ownership**: device owner uid and group gid, so the hypervisor can
//!   reopen the device without privileges
//! - **Persistence**: the device outlives the provisioning process
//! - **Link configuration**: MTU, applied through rtnetlink
//!
//! The provisioning operation is one-shot and synchronous; the created
//! device stays behind until something external tears it down.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;

#[cfg(target_os = "linux")]
pub mod linux;

pub use error::{NetError, Result};
