//! Error types for netlink and decode operations.

use std::io;

/// Result type for netlink and decode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while dumping or decoding conntrack entries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Kernel returned an error code.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// A read or skip would run past the end of the buffer.
    #[error("truncated input: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes the operation needed.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// A matched attribute's payload does not have the width its type
    /// requires (an address that is neither 4 nor 16 bytes, an empty
    /// protocol number).
    #[error("unsupported attribute encoding: type {kind} with {len}-byte payload")]
    UnsupportedEncoding {
        /// Attribute type (nested flag masked off).
        kind: u16,
        /// Payload length found on the wire.
        len: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl Error {
    /// Create a kernel error from an errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, 1 | 13), // EPERM=1, EACCES=13
            _ => false,
        }
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errno() {
        let err = Error::from_errno(-1); // EPERM
        assert!(err.is_permission_denied());
        assert_eq!(err.errno(), Some(1));
    }

    #[test]
    fn test_truncated_message() {
        let err = Error::Truncated {
            expected: 4,
            actual: 2,
        };
        assert_eq!(err.to_string(), "truncated input: expected 4 bytes, got 2");
        assert_eq!(err.errno(), None);
    }

    #[test]
    fn test_unsupported_encoding_message() {
        let err = Error::UnsupportedEncoding { kind: 1, len: 5 };
        assert_eq!(
            err.to_string(),
            "unsupported attribute encoding: type 1 with 5-byte payload"
        );
    }
}
