//! Physics error types
//!
//! Invalid handles and static-geometry persistence failures are reported to
//! the caller instead of aborting, so interactive tools can recover.

use std::fmt;
use std::io;

/// Error type for body store operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// Dynamic body index out of range
    InvalidBody { index: usize, len: usize },
    /// Static body index out of range
    InvalidStaticBody { index: usize, len: usize },
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::InvalidBody { index, len } => {
                write!(f, "Invalid body index {} (store holds {})", index, len)
            }
            PhysicsError::InvalidStaticBody { index, len } => {
                write!(f, "Invalid static body index {} (store holds {})", index, len)
            }
        }
    }
}

impl std::error::Error for PhysicsError {}

/// Error type for static geometry dump/load
#[derive(Debug)]
pub enum PersistError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// File does not start with the static geometry magic bytes
    BadMagic([u8; 8]),
    /// File was written by an unknown format version
    UnsupportedVersion(u32),
    /// Record stride in the header does not match this format version
    StrideMismatch { expected: u32, actual: u32 },
    /// File length disagrees with the record count in the header
    Truncated { expected: usize, actual: usize },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Io(err) => write!(f, "Static geometry IO error: {}", err),
            PersistError::BadMagic(magic) => {
                write!(f, "Not a static geometry file (magic {:?})", magic)
            }
            PersistError::UnsupportedVersion(version) => {
                write!(f, "Unsupported static geometry version {}", version)
            }
            PersistError::StrideMismatch { expected, actual } => write!(
                f,
                "Static geometry record stride mismatch: expected {}, got {}",
                expected, actual
            ),
            PersistError::Truncated { expected, actual } => write!(
                f,
                "Static geometry file has {} bytes, expected {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PersistError {
    fn from(err: io::Error) -> Self {
        PersistError::Io(err)
    }
}
