//! The external host-stack boundary.
//!
//! Everything in §6 of the spec that the distilled source treats as
//! "external collaborators" — control/bulk transfer submission, endpoint
//! open, vid/pid lookup, the shared enumeration scratch buffer, and
//! handing configuration completion back to the host stack — is gathered
//! here into a single trait, `HostBus`, that a concrete host controller
//! implements. This is the Rust-safe analogue of the distilled spec's
//! free-function host-stack API (`control_xfer`, `edpt_open`, ...), shaped
//! the way `nilclass-usbh`'s `HostBus` trait and `cotton-usb-host`'s
//! `HostController` trait split "the controller" out from "the class
//! driver logic riding on top of it".
use crate::descriptor::{EndpointDescriptor, SetupPacket};
use crate::error::{Error, Result};
use crate::protocol::EnumState;

/// What to do once a submitted control transfer completes: continue an
/// enumeration state machine, or hand the result to an application-supplied
/// callback. Threaded through [`ControlXfer`] and returned unchanged by the
/// host stack in [`ControlCompletion`], the same way the distilled spec's
/// `user_data` field carries a continuation through a transfer's lifetime —
/// translated here into a typed enum instead of an opaque integer.
#[derive(Clone, Copy)]
pub enum ControlTag {
    /// Continue the named enumeration state machine step.
    Enumeration(EnumState),
    /// Deliver the result to an application-registered completion callback.
    User {
        cb: Option<CompletionCb>,
        user_data: u32,
    },
}

/// `fn(slot_index, result, user_data)`. A plain function pointer rather
/// than a boxed closure: this crate has no allocator.
pub type CompletionCb = fn(usize, Result<()>, u32);

/// A control transfer submission.
#[derive(Clone, Copy)]
pub struct ControlXfer {
    pub device_address: u8,
    pub setup: SetupPacket,
    pub tag: ControlTag,
}

/// A completed control transfer, handed back to
/// [`crate::CdcHost::control_xfer_complete`] by the host stack.
pub struct ControlCompletion<'a> {
    pub device_address: u8,
    pub setup: SetupPacket,
    pub tag: ControlTag,
    pub result: Result<()>,
    /// For an IN data phase, the bytes received (length `setup.w_length` or
    /// less); empty for OUT/no-data transfers.
    pub buf: &'a [u8],
}

/// The host-controller-specific operations this crate needs to drive
/// enumeration and byte-stream I/O. Implemented once per concrete USB host
/// stack; a `FakeBus` implementation backs this crate's test suite.
pub trait HostBus {
    /// Submit a control transfer. Completion is reported later via
    /// [`crate::CdcHost::control_xfer_complete`], carrying the same `tag`.
    fn control_xfer(&mut self, xfer: ControlXfer) -> Result<()>;

    /// Open a bulk or interrupt endpoint.
    fn edpt_open(&mut self, device_address: u8, ep: &EndpointDescriptor) -> Result<()>;

    /// Vendor/product ID of an already-addressed device, for vendor-specific
    /// open dispatch.
    fn vid_pid(&self, device_address: u8) -> Option<(u16, u16)>;

    /// The shared process-wide scratch buffer used to stage SET_LINE_CODING
    /// and CP210x SET_BAUDRATE payloads (§5's "enumeration buffer").
    fn enum_buf(&mut self) -> &mut [u8];

    /// Submit up to `data.len()` bytes on a bulk OUT endpoint. Completion is
    /// reported later via [`crate::CdcHost::xfer_cb`].
    fn submit_bulk_out(&mut self, device_address: u8, ep_addr: u8, data: &[u8]) -> Result<()>;

    /// Arm a bulk IN endpoint to receive up to `max_len` bytes. Completion is
    /// reported later via [`crate::CdcHost::xfer_cb`].
    fn submit_bulk_in(&mut self, device_address: u8, ep_addr: u8, max_len: usize) -> Result<()>;

    /// The bytes delivered by the most recently completed bulk IN transfer
    /// on `ep_addr`. Valid only while handling the matching `xfer_cb` call.
    fn received_data(&self, device_address: u8, ep_addr: u8) -> &[u8];

    /// Hand configuration back to the host stack once enumeration finishes.
    fn set_config_complete(&mut self, device_address: u8, interface_number: u8);
}
