//! Error model for the CDC host core.
//!
//! Mirrors the role the teacher kernel's `DriverError` plays for its HAL
//! `Driver` trait: a small, `Copy`, exhaustively-matchable enum rather than
//! string slices or panics, since this crate is meant to run embedded inside
//! someone else's host stack where a panic is not an acceptable failure mode.

/// Errors returned by the CDC host core's entry points and callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Descriptor block did not match the expected class/sub_class/protocol,
    /// had the wrong endpoint transfer type, or was truncated.
    DescriptorInvalid,
    /// No free slot in the interface table.
    ResourceExhausted,
    /// A control or bulk transfer completed with a non-success result.
    TransferFailed,
    /// The requested operation is not wired up for this interface's protocol.
    Unsupported,
    /// Public API called with an unmounted or out-of-range interface index.
    InvalidIndex,
    /// Host-stack misuse: a completion callback referenced an endpoint or
    /// device address this driver never opened.
    Internal,
}

pub type Result<T> = core::result::Result<T, Error>;
