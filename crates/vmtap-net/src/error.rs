//! Error types for TAP device provisioning.

use thiserror::Error;

/// Result type alias for network operations.
pub type Result<T> = std::result::Result<T, NetError>;

/// Errors that can occur while provisioning a TAP device.
#[derive(Debug, Error)]
pub enum NetError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TAP device error (Linux only).
    #[error("TAP error: {0}")]
    Tap(String),

    /// Netlink error (Linux only).
    #[error("netlink error: {0}")]
    Netlink(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: NetError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_tap_error_display() {
        let err = NetError::Tap("TUNSETIFF failed for tap0: Operation not permitted".into());
        assert_eq!(
            err.to_string(),
            "TAP error: TUNSETIFF failed for tap0: Operation not permitted"
        );
    }

    #[test]
    fn test_netlink_error_display() {
        let err = NetError::Netlink("interface not found: tap0".into());
        assert_eq!(err.to_string(), "netlink error: interface not found: tap0");
    }
}
