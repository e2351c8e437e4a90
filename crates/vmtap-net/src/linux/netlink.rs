//! Netlink socket operations for link configuration.
//!
//! This module provides a low-level interface to the Linux rtnetlink
//! subsystem for configuring network interfaces. Messages are built by hand
//! and sent over a raw `AF_NETLINK` socket; each request waits for the
//! kernel acknowledgement before returning.

use std::ffi::CString;
use std::io;
use std::mem;
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd};

use crate::error::{NetError, Result};

// Netlink constants
const NETLINK_ROUTE: i32 = 0;

// Netlink message types
const RTM_NEWLINK: u16 = 16;

// Netlink flags
const NLM_F_REQUEST: u16 = 0x0001;
const NLM_F_ACK: u16 = 0x0004;

// Attribute types for RTM_NEWLINK
const IFLA_MTU: u16 = 4;

/// Netlink message header.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct NlMsgHdr {
    nlmsg_len: u32,
    nlmsg_type: u16,
    nlmsg_flags: u16,
    nlmsg_seq: u32,
    nlmsg_pid: u32,
}

/// Interface info message.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct IfInfoMsg {
    ifi_family: u8,
    _pad: u8,
    ifi_type: u16,
    ifi_index: i32,
    ifi_flags: u32,
    ifi_change: u32,
}

/// Netlink attribute header.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct NlAttr {
    nla_len: u16,
    nla_type: u16,
}

/// Netlink socket handle for link configuration.
///
/// Provides methods for configuring network interfaces using the rtnetlink
/// protocol.
pub struct NetlinkHandle {
    /// Netlink socket file descriptor.
    fd: OwnedFd,
    /// Sequence number for netlink messages.
    seq: u32,
}

impl NetlinkHandle {
    /// Creates a new netlink socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be created.
    pub fn new() -> Result<Self> {
        let fd = unsafe {
            libc::socket(
                libc::AF_NETLINK,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                NETLINK_ROUTE,
            )
        };

        if fd < 0 {
            return Err(NetError::Netlink(format!(
                "failed to create netlink socket: {}",
                io::Error::last_os_error()
            )));
        }

        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        // Bind with nl_pid 0, the kernel assigns an address.
        let mut addr: libc::sockaddr_nl = unsafe { mem::zeroed() };
        addr.nl_family = libc::AF_NETLINK as u16;

        let ret = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                std::ptr::from_ref(&addr).cast::<libc::sockaddr>(),
                mem::size_of::<libc::sockaddr_nl>() as u32,
            )
        };

        if ret < 0 {
            return Err(NetError::Netlink(format!(
                "failed to bind netlink socket: {}",
                io::Error::last_os_error()
            )));
        }

        Ok(Self { fd, seq: 0 })
    }

    /// Gets the next sequence number.
    fn next_seq(&mut self) -> u32 {
        self.seq = self.seq.wrapping_add(1);
        self.seq
    }

    /// Sends a netlink message and waits for the acknowledgement.
    fn send_and_ack(&mut self, msg: &[u8]) -> Result<()> {
        let ret = unsafe {
            libc::send(
                self.fd.as_raw_fd(),
                msg.as_ptr().cast::<libc::c_void>(),
                msg.len(),
                0,
            )
        };

        if ret < 0 {
            return Err(NetError::Netlink(format!(
                "failed to send netlink message: {}",
                io::Error::last_os_error()
            )));
        }

        let mut buf = [0u8; 4096];
        let len = unsafe {
            libc::recv(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
                0,
            )
        };

        if len < 0 {
            return Err(NetError::Netlink(format!(
                "failed to receive netlink response: {}",
                io::Error::last_os_error()
            )));
        }

        // The ack arrives as an NLMSG_ERROR message with code 0; a nonzero
        // code is a negated errno.
        if len >= mem::size_of::<NlMsgHdr>() as isize {
            let hdr = unsafe { &*buf.as_ptr().cast::<NlMsgHdr>() };
            if hdr.nlmsg_type == libc::NLMSG_ERROR as u16
                && len >= (mem::size_of::<NlMsgHdr>() + 4) as isize
            {
                let error_code =
                    unsafe { *buf.as_ptr().add(mem::size_of::<NlMsgHdr>()).cast::<i32>() };
                if error_code != 0 {
                    return Err(NetError::Netlink(format!(
                        "netlink request rejected: {}",
                        io::Error::from_raw_os_error(-error_code)
                    )));
                }
            }
        }

        Ok(())
    }

    /// Sets the MTU of an interface.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the request.
    pub fn set_link_mtu(&mut self, ifindex: u32, mtu: u32) -> Result<()> {
        let seq = self.next_seq();

        let mut msg = Vec::with_capacity(64);

        // Reserve space for the header, filled in once the length is known.
        msg.extend_from_slice(&[0u8; mem::size_of::<NlMsgHdr>()]);

        let ifinfo = IfInfoMsg {
            ifi_family: libc::AF_UNSPEC as u8,
            _pad: 0,
            ifi_type: 0,
            ifi_index: ifindex as i32,
            ifi_flags: 0,
            ifi_change: 0,
        };
        msg.extend_from_slice(unsafe {
            std::slice::from_raw_parts(
                std::ptr::from_ref(&ifinfo).cast::<u8>(),
                mem::size_of::<IfInfoMsg>(),
            )
        });

        put_attr_u32(&mut msg, IFLA_MTU, mtu);

        let hdr = NlMsgHdr {
            nlmsg_len: msg.len() as u32,
            nlmsg_type: RTM_NEWLINK,
            nlmsg_flags: NLM_F_REQUEST | NLM_F_ACK,
            nlmsg_seq: seq,
            nlmsg_pid: 0,
        };
        msg[..mem::size_of::<NlMsgHdr>()].copy_from_slice(unsafe {
            std::slice::from_raw_parts(
                std::ptr::from_ref(&hdr).cast::<u8>(),
                mem::size_of::<NlMsgHdr>(),
            )
        });

        self.send_and_ack(&msg)
    }

    /// Gets an interface index by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface is not found.
    pub fn get_ifindex(&self, name: &str) -> Result<u32> {
        let c_name = CString::new(name).map_err(|e| NetError::Netlink(e.to_string()))?;
        let ifindex = unsafe { libc::if_nametoindex(c_name.as_ptr()) };
        if ifindex == 0 {
            return Err(NetError::Netlink(format!("interface not found: {name}")));
        }
        Ok(ifindex)
    }
}

/// Appends a u32 attribute to the message.
fn put_attr_u32(msg: &mut Vec<u8>, attr_type: u16, value: u32) {
    let attr = NlAttr {
        nla_len: (mem::size_of::<NlAttr>() + mem::size_of::<u32>()) as u16,
        nla_type: attr_type,
    };
    msg.extend_from_slice(unsafe {
        std::slice::from_raw_parts(
            std::ptr::from_ref(&attr).cast::<u8>(),
            mem::size_of::<NlAttr>(),
        )
    });
    msg.extend_from_slice(&value.to_ne_bytes());
}
