//! Core utilities for the M17 protocol stack
//!
//! This crate provides the fundamental types shared across the stack:
//! addresses, CRC, the TYPE field, bit packing and the common error type.

/// Git version string, set at compile time
pub const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");
/// Stack version followed by git version string, e.g., "0.1.0-aabbccdd"
pub const STACK_VERSION: &str = const_format::formatcp!("{}-{}", env!("CARGO_PKG_VERSION"), GIT_VERSION);

pub mod address;
pub mod bits;
pub mod consts;
pub mod crc16;
pub mod debug;
pub mod frame_error;
pub mod type_field;

// Re-export commonly used items
pub use address::{Address, AddressError};
pub use bits::SoftBit;
pub use consts::*;
pub use frame_error::FrameError;
pub use type_field::M17Version;
